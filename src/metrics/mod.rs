use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters for drag/resize gestures handled by the interaction controller.
#[derive(Debug, Default, Clone)]
pub struct InteractionMetrics {
    gestures_started: u64,
    starts_ignored: u64,
    moves: u64,
    commits: u64,
    commit_failures: u64,
    cancellations: u64,
}

impl InteractionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_gesture_started(&mut self) {
        self.gestures_started = self.gestures_started.saturating_add(1);
    }

    pub fn record_start_ignored(&mut self) {
        self.starts_ignored = self.starts_ignored.saturating_add(1);
    }

    pub fn record_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }

    pub fn record_commit(&mut self, succeeded: bool) {
        if succeeded {
            self.commits = self.commits.saturating_add(1);
        } else {
            self.commit_failures = self.commit_failures.saturating_add(1);
        }
    }

    pub fn record_cancellation(&mut self) {
        self.cancellations = self.cancellations.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            gestures_started: self.gestures_started,
            starts_ignored: self.starts_ignored,
            moves: self.moves,
            commits: self.commits,
            commit_failures: self.commit_failures,
            cancellations: self.cancellations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub gestures_started: u64,
    pub starts_ignored: u64,
    pub moves: u64,
    pub commits: u64,
    pub commit_failures: u64,
    pub cancellations: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target,
            "interaction_metrics",
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("gestures_started".to_string(), json!(self.gestures_started));
        map.insert("starts_ignored".to_string(), json!(self.starts_ignored));
        map.insert("moves".to_string(), json!(self.moves));
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("commit_failures".to_string(), json!(self.commit_failures));
        map.insert("cancellations".to_string(), json!(self.cancellations));
        map
    }
}
