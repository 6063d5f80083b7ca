//! Tunables for the canvas core, loadable from JSON.
//!
//! Every field has a default so partial documents are accepted:
//!
//! ```json
//! { "min_widget_width": 240, "log_path": "/tmp/canvas.jsonl" }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::ComputationCache;
use crate::error::Result;
use crate::interaction::{DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH, InteractionConfig};
use crate::layout::{CollisionDetector, LayoutResult};
use crate::logging::{FileSink, LogLevel, Logger};
use crate::metrics::InteractionMetrics;

const DEFAULT_CACHE_TTL_MS: u64 = 60_000;
const DEFAULT_LOG_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Resize floor for widget types without a registered minimum.
    pub min_widget_width: f64,
    pub min_widget_height: f64,
    pub collision_cache_ttl_ms: u64,
    pub layout_cache_ttl_ms: u64,
    /// JSON-lines log file. No file logging when unset.
    pub log_path: Option<PathBuf>,
    /// Truncate the log once it would grow past this size. Zero disables.
    pub log_max_bytes: u64,
    pub log_level: LogLevel,
    pub metrics_enabled: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_widget_width: DEFAULT_MIN_WIDTH,
            min_widget_height: DEFAULT_MIN_HEIGHT,
            collision_cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            layout_cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            log_path: None,
            log_max_bytes: DEFAULT_LOG_MAX_BYTES,
            log_level: LogLevel::Info,
            metrics_enabled: true,
        }
    }
}

impl CanvasConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn collision_ttl(&self) -> Duration {
        Duration::from_millis(self.collision_cache_ttl_ms)
    }

    pub fn layout_ttl(&self) -> Duration {
        Duration::from_millis(self.layout_cache_ttl_ms)
    }

    pub fn interaction_config(&self) -> InteractionConfig {
        InteractionConfig {
            min_width: self.min_widget_width,
            min_height: self.min_widget_height,
        }
    }

    /// File logger for `log_path`, or `None` when file logging is off.
    pub fn build_logger(&self) -> Result<Option<Logger>> {
        let Some(path) = &self.log_path else {
            return Ok(None);
        };
        let sink = FileSink::new(path, self.log_max_bytes)?;
        Ok(Some(Logger::new(sink).with_min_level(self.log_level)))
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<InteractionMetrics>>> {
        self.metrics_enabled
            .then(|| Arc::new(Mutex::new(InteractionMetrics::new())))
    }

    pub fn collision_detector(&self) -> CollisionDetector {
        CollisionDetector::new(self.collision_ttl())
    }

    pub fn layout_cache(&self) -> ComputationCache<LayoutResult> {
        ComputationCache::new(self.layout_ttl())
    }
}
