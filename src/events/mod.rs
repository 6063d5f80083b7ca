//! Canvas notifications for hosts that decouple UI updates from direct calls.
//!
//! The interaction controller reports what happened to each gesture through
//! a [`CanvasEventSink`]. Hosts forward these onto whatever event bus they
//! use; the core never requires one and defaults to [`NullEventSink`].

use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use serde_json::Value;

/// What happened to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEventKind {
    /// A drag or resize gesture became active.
    GestureStarted,
    /// A start was rejected because another gesture is active.
    GestureIgnored,
    /// The transient (pre-snapped) position changed during a gesture.
    PositionPreviewed,
    /// The final position was handed to the commit collaborator and accepted.
    PositionCommitted,
    /// The commit collaborator rejected the final position.
    CommitFailed,
    /// The gesture ended without committing.
    GestureCancelled,
}

#[derive(Debug, Clone)]
pub struct CanvasEvent {
    pub timestamp: SystemTime,
    pub kind: CanvasEventKind,
    pub widget_id: String,
    pub details: Vec<(String, Value)>,
}

impl CanvasEvent {
    fn new(kind: CanvasEventKind, widget_id: String) -> Self {
        Self {
            timestamp: SystemTime::now(),
            kind,
            widget_id,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

pub struct CanvasEventBuilder {
    event: CanvasEvent,
}

impl CanvasEventBuilder {
    pub fn new(kind: CanvasEventKind, widget_id: impl Into<String>) -> Self {
        Self {
            event: CanvasEvent::new(kind, widget_id.into()),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> CanvasEvent {
        self.event
    }
}

pub trait CanvasEventSink: Send + Sync {
    fn emit(&self, event: CanvasEvent);
}

#[derive(Debug, Default)]
pub struct NullEventSink;

impl CanvasEventSink for NullEventSink {
    fn emit(&self, _event: CanvasEvent) {}
}

/// Buffers events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<CanvasEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<CanvasEventKind> {
        self.lock().iter().map(|e| e.kind).collect()
    }

    pub fn take(&self) -> Vec<CanvasEvent> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CanvasEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CanvasEventSink for RecordingEventSink {
    fn emit(&self, event: CanvasEvent) {
        self.lock().push(event);
    }
}
