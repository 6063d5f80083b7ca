use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

use crate::cache::{CacheStats, ComputationCache};
use crate::geometry::GridPlacement;

use super::analyzer::GridWidget;

/// Widget id → ids of every widget whose footprint overlaps it. Symmetric.
pub type CollisionMap = HashMap<String, Vec<String>>;

pub const COLLISION_CACHE_TTL: Duration = Duration::from_secs(60);

/// Pairwise overlap test in grid-cell space.
///
/// Every widget gets an entry, empty when it collides with nothing. Both
/// directions of each colliding pair are recorded in input order.
pub fn detect_collisions(widgets: &[GridWidget]) -> CollisionMap {
    let mut map: CollisionMap = widgets
        .iter()
        .map(|widget| (widget.id.clone(), Vec::new()))
        .collect();

    for (i, a) in widgets.iter().enumerate() {
        for b in &widgets[i + 1..] {
            if overlaps(&a.placement, &b.placement) {
                map.entry(a.id.clone()).or_default().push(b.id.clone());
                map.entry(b.id.clone()).or_default().push(a.id.clone());
            }
        }
    }

    map
}

fn overlaps(a: &GridPlacement, b: &GridPlacement) -> bool {
    !(a.right() <= i64::from(b.col)
        || b.right() <= i64::from(a.col)
        || a.bottom() <= i64::from(b.row)
        || b.bottom() <= i64::from(a.row))
}

/// Cache key: `id:row:col:rowSpan:colSpan` for each widget, `|`-joined.
pub fn collision_key(widgets: &[GridWidget]) -> String {
    let mut key = String::new();
    for (idx, widget) in widgets.iter().enumerate() {
        if idx > 0 {
            key.push('|');
        }
        let p = widget.placement;
        let _ = write!(
            key,
            "{}:{}:{}:{}:{}",
            widget.id, p.row, p.col, p.row_span, p.col_span
        );
    }
    key
}

/// [`detect_collisions`] behind a TTL cache.
///
/// Cached answers may lag a committed move by up to the TTL for a caller
/// that reuses an identical key; use [`CollisionDetector::detect_fresh`] when
/// the answer gates a correctness decision.
pub struct CollisionDetector {
    ttl: Duration,
    cache: ComputationCache<CollisionMap>,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(COLLISION_CACHE_TTL)
    }
}

impl CollisionDetector {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: ComputationCache::new(ttl),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn detect(&self, widgets: &[GridWidget]) -> CollisionMap {
        self.cache
            .get_or_compute(&collision_key(widgets), self.ttl, || {
                detect_collisions(widgets)
            })
    }

    /// Recomputes and replaces the cached entry for this widget set.
    pub fn detect_fresh(&self, widgets: &[GridWidget]) -> CollisionMap {
        let key = collision_key(widgets);
        self.cache.invalidate(&key);
        self.cache
            .get_or_compute(&key, self.ttl, || detect_collisions(widgets))
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
