use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossterm::event::Event;
use serde_json::json;

use super::pointer::{PointerEvent, PointerPhase, classify_mouse, is_cancel_key};
use crate::error::CommitError;
use crate::events::{CanvasEventBuilder, CanvasEventKind, CanvasEventSink, NullEventSink};
use crate::geometry::{Size, WidgetPosition};
use crate::grid::snap_to_grid_with_margins;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv, json_str};
use crate::metrics::InteractionMetrics;
use crate::model::{Page, WidgetInstance};
use crate::registry::WidgetRegistry;

const LOG_TARGET: &str = "canvas::interaction";
const METRICS_TARGET: &str = "canvas::metrics";

pub const DEFAULT_MIN_WIDTH: f64 = 300.0;
pub const DEFAULT_MIN_HEIGHT: f64 = 200.0;

/// Generic resize floors, used when the registry has no minimum for a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
        }
    }
}

/// Persists the final position of a gesture.
///
/// Called once per completed gesture with the full rectangle. Implementors
/// that hand off to background I/O can return `Ok(())` immediately.
pub trait PositionCommit {
    fn commit_position(
        &mut self,
        widget_id: &str,
        position: WidgetPosition,
    ) -> Result<(), CommitError>;
}

impl<F> PositionCommit for F
where
    F: FnMut(&str, WidgetPosition) -> Result<(), CommitError>,
{
    fn commit_position(
        &mut self,
        widget_id: &str,
        position: WidgetPosition,
    ) -> Result<(), CommitError> {
        self(widget_id, position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

impl GestureKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::Resize => "resize",
        }
    }
}

/// Outcome of `start_drag`/`start_resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStart {
    Started,
    /// The widget already has a gesture of kind `active`; the start was a
    /// no-op.
    Ignored { active: GestureKind },
    /// The pointer carried no usable coordinates (multi-touch).
    Unsupported,
}

/// Per-widget gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging,
    Resizing,
}

/// Propagation hint for terminal events fed through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Consumed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommittedPosition {
    pub widget_id: String,
    pub position: WidgetPosition,
}

#[derive(Debug, Clone)]
enum Motion {
    Drag {
        offset_x: f64,
        offset_y: f64,
    },
    Resize {
        start_x: f64,
        start_y: f64,
        start_width: f64,
        start_height: f64,
        min: Size,
    },
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    page: Page,
    container: Size,
    motion: Motion,
}

impl ActiveGesture {
    fn kind(&self) -> GestureKind {
        match self.motion {
            Motion::Drag { .. } => GestureKind::Drag,
            Motion::Resize { .. } => GestureKind::Resize,
        }
    }
}

/// Drives drag and resize gestures, at most one per widget.
///
/// Positions produced during a gesture live in a transient map keyed by
/// widget id and are only handed to a [`PositionCommit`] when the gesture
/// ends. Several widgets can be in flight at once; the `*_gesture` methods
/// address one by id, while `on_pointer_move`, `on_pointer_end` and `cancel`
/// act on the sole active gesture and do nothing when zero or several are
/// running.
pub struct InteractionController {
    config: InteractionConfig,
    registry: Option<Arc<WidgetRegistry>>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<InteractionMetrics>>>,
    events: Arc<dyn CanvasEventSink>,
    active: HashMap<String, ActiveGesture>,
    transient: HashMap<String, WidgetPosition>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            registry: None,
            logger: None,
            metrics: None,
            events: Arc::new(NullEventSink),
            active: HashMap::new(),
            transient: HashMap::new(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<WidgetRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Mutex<InteractionMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn CanvasEventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn config(&self) -> InteractionConfig {
        self.config
    }

    pub fn state(&self, widget_id: &str) -> InteractionState {
        match self.active.get(widget_id).map(ActiveGesture::kind) {
            None => InteractionState::Idle,
            Some(GestureKind::Drag) => InteractionState::Dragging,
            Some(GestureKind::Resize) => InteractionState::Resizing,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Ids of widgets with a gesture in flight, sorted.
    pub fn active_widgets(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.active.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Uncommitted position of a widget while it is being moved or resized.
    pub fn transient_position(&self, widget_id: &str) -> Option<WidgetPosition> {
        self.transient.get(widget_id).copied()
    }

    pub fn start_drag(
        &mut self,
        pointer: &PointerEvent,
        widget: &WidgetInstance,
        page: &Page,
        position: WidgetPosition,
        container: Size,
    ) -> GestureStart {
        self.start(pointer, widget, page, position, container, GestureKind::Drag)
    }

    pub fn start_resize(
        &mut self,
        pointer: &PointerEvent,
        widget: &WidgetInstance,
        page: &Page,
        position: WidgetPosition,
        container: Size,
    ) -> GestureStart {
        self.start(pointer, widget, page, position, container, GestureKind::Resize)
    }

    fn start(
        &mut self,
        pointer: &PointerEvent,
        widget: &WidgetInstance,
        page: &Page,
        position: WidgetPosition,
        container: Size,
        kind: GestureKind,
    ) -> GestureStart {
        if let Some(active) = self.active.get(&widget.id).map(ActiveGesture::kind) {
            self.with_metrics_mut(InteractionMetrics::record_start_ignored);
            self.emit(
                CanvasEventBuilder::new(CanvasEventKind::GestureIgnored, &widget.id)
                    .detail("gesture", json!(kind.as_str()))
                    .detail("active_gesture", json!(active.as_str())),
            );
            self.log(
                LogLevel::Debug,
                "gesture.ignored",
                [
                    json_str("widget", widget.id.as_str()),
                    json_str("gesture", kind.as_str()),
                    json_str("active_gesture", active.as_str()),
                ],
            );
            return GestureStart::Ignored { active };
        }

        let Some((pointer_x, pointer_y)) = pointer.coordinates() else {
            return GestureStart::Unsupported;
        };

        let motion = match kind {
            GestureKind::Drag => Motion::Drag {
                offset_x: pointer_x - position.x,
                offset_y: pointer_y - position.y,
            },
            GestureKind::Resize => Motion::Resize {
                start_x: pointer_x,
                start_y: pointer_y,
                start_width: position.width,
                start_height: position.height,
                min: self.min_size_for(&widget.widget_type),
            },
        };

        self.active.insert(
            widget.id.clone(),
            ActiveGesture {
                page: page.clone(),
                container,
                motion,
            },
        );
        self.transient.insert(widget.id.clone(), position);

        self.with_metrics_mut(InteractionMetrics::record_gesture_started);
        self.emit(
            CanvasEventBuilder::new(CanvasEventKind::GestureStarted, &widget.id)
                .detail("gesture", json!(kind.as_str())),
        );
        self.log(
            LogLevel::Debug,
            "gesture.started",
            [
                json_str("widget", widget.id.as_str()),
                json_str("gesture", kind.as_str()),
            ],
        );
        GestureStart::Started
    }

    fn min_size_for(&self, widget_type: &str) -> Size {
        self.registry
            .as_deref()
            .and_then(|registry| registry.min_size(widget_type))
            .unwrap_or(Size::new(self.config.min_width, self.config.min_height))
    }

    fn sole_gesture(&self) -> Option<String> {
        let mut ids = self.active.keys();
        match (ids.next(), ids.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        }
    }

    /// [`Self::move_gesture`] on the sole active gesture.
    pub fn on_pointer_move(&mut self, pointer: &PointerEvent) -> Option<WidgetPosition> {
        let widget_id = self.sole_gesture()?;
        self.move_gesture(&widget_id, pointer)
    }

    /// Applies a pointer move to `widget_id`'s gesture and returns the
    /// snapped transient position. `None` when the widget has no gesture or
    /// the pointer is unusable.
    pub fn move_gesture(
        &mut self,
        widget_id: &str,
        pointer: &PointerEvent,
    ) -> Option<WidgetPosition> {
        let active = self.active.get(widget_id)?;
        let (pointer_x, pointer_y) = pointer.coordinates()?;
        let current = self.transient.get(widget_id).copied()?;

        let candidate = match active.motion {
            Motion::Drag { offset_x, offset_y } => WidgetPosition {
                x: pointer_x - offset_x,
                y: pointer_y - offset_y,
                ..current
            },
            Motion::Resize {
                start_x,
                start_y,
                start_width,
                start_height,
                min,
            } => WidgetPosition {
                width: min.width.max(start_width + (pointer_x - start_x)),
                height: min.height.max(start_height + (pointer_y - start_y)),
                ..current
            },
        };

        let snapped = snap_to_grid_with_margins(candidate, &active.page, active.container);
        self.transient.insert(widget_id.to_string(), snapped);

        self.with_metrics_mut(InteractionMetrics::record_move);
        self.emit(
            CanvasEventBuilder::new(CanvasEventKind::PositionPreviewed, widget_id)
                .detail("x", json!(snapped.x))
                .detail("y", json!(snapped.y))
                .detail("width", json!(snapped.width))
                .detail("height", json!(snapped.height)),
        );
        Some(snapped)
    }

    /// [`Self::end_gesture`] on the sole active gesture.
    pub fn on_pointer_end<C>(
        &mut self,
        commit: &mut C,
    ) -> Result<Option<CommittedPosition>, CommitError>
    where
        C: PositionCommit + ?Sized,
    {
        match self.sole_gesture() {
            Some(widget_id) => self.end_gesture(&widget_id, commit),
            None => Ok(None),
        }
    }

    /// Ends `widget_id`'s gesture, handing its last transient position to
    /// `commit`. The widget returns to idle and its transient entry is
    /// cleared whether or not the commit succeeds.
    pub fn end_gesture<C>(
        &mut self,
        widget_id: &str,
        commit: &mut C,
    ) -> Result<Option<CommittedPosition>, CommitError>
    where
        C: PositionCommit + ?Sized,
    {
        let Some(active) = self.active.remove(widget_id) else {
            return Ok(None);
        };
        let Some(position) = self.transient.get(widget_id).copied() else {
            return Ok(None);
        };

        let outcome = commit.commit_position(widget_id, position);
        self.transient.remove(widget_id);
        self.with_metrics_mut(|metrics| metrics.record_commit(outcome.is_ok()));

        match outcome {
            Ok(()) => {
                self.emit(
                    CanvasEventBuilder::new(CanvasEventKind::PositionCommitted, widget_id)
                        .detail("gesture", json!(active.kind().as_str()))
                        .detail("x", json!(position.x))
                        .detail("y", json!(position.y))
                        .detail("width", json!(position.width))
                        .detail("height", json!(position.height)),
                );
                self.log(
                    LogLevel::Info,
                    "position.committed",
                    [
                        json_str("widget", widget_id),
                        json_kv("x", position.x),
                        json_kv("y", position.y),
                        json_kv("width", position.width),
                        json_kv("height", position.height),
                    ],
                );
                Ok(Some(CommittedPosition {
                    widget_id: widget_id.to_string(),
                    position,
                }))
            }
            Err(err) => {
                self.emit(
                    CanvasEventBuilder::new(CanvasEventKind::CommitFailed, widget_id)
                        .detail("reason", json!(err.reason)),
                );
                self.log(
                    LogLevel::Warn,
                    "position.commit_failed",
                    [
                        json_str("widget", widget_id),
                        json_str("reason", err.reason.as_str()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// [`Self::cancel_gesture`] on the sole active gesture. Returns the
    /// widget id that was being manipulated.
    pub fn cancel(&mut self) -> Option<String> {
        let widget_id = self.sole_gesture()?;
        self.cancel_gesture(&widget_id).then_some(widget_id)
    }

    /// Abandons `widget_id`'s gesture without committing.
    pub fn cancel_gesture(&mut self, widget_id: &str) -> bool {
        let Some(active) = self.active.remove(widget_id) else {
            return false;
        };
        self.transient.remove(widget_id);

        self.with_metrics_mut(InteractionMetrics::record_cancellation);
        self.emit(
            CanvasEventBuilder::new(CanvasEventKind::GestureCancelled, widget_id)
                .detail("gesture", json!(active.kind().as_str())),
        );
        self.log(
            LogLevel::Debug,
            "gesture.cancelled",
            [json_str("widget", widget_id)],
        );
        true
    }

    /// Abandons every gesture in flight; returns the affected ids, sorted.
    pub fn cancel_all(&mut self) -> Vec<String> {
        let ids: Vec<String> = self
            .active_widgets()
            .into_iter()
            .map(str::to_string)
            .collect();
        for id in &ids {
            self.cancel_gesture(id);
        }
        ids
    }

    /// Routes crossterm input into the active gesture.
    ///
    /// A terminal has one pointer, so moves and releases go to the sole
    /// active gesture; Escape cancels everything in flight. Button presses
    /// are left to the host, which hit-tests widgets and calls
    /// `start_drag`/`start_resize`.
    pub fn handle_terminal_event<C>(
        &mut self,
        event: &Event,
        commit: &mut C,
    ) -> Result<EventFlow, CommitError>
    where
        C: PositionCommit + ?Sized,
    {
        if !self.is_active() {
            return Ok(EventFlow::Continue);
        }
        match event {
            Event::Mouse(mouse) => {
                let Some(widget_id) = self.sole_gesture() else {
                    return Ok(EventFlow::Continue);
                };
                match classify_mouse(mouse) {
                    Some(PointerPhase::Move) => {
                        self.move_gesture(&widget_id, &PointerEvent::from(mouse));
                        Ok(EventFlow::Consumed)
                    }
                    Some(PointerPhase::Up) => {
                        self.end_gesture(&widget_id, commit)?;
                        Ok(EventFlow::Consumed)
                    }
                    Some(PointerPhase::Down) | None => Ok(EventFlow::Continue),
                }
            }
            Event::Key(key) if is_cancel_key(key) => {
                self.cancel_all();
                Ok(EventFlow::Consumed)
            }
            _ => Ok(EventFlow::Continue),
        }
    }

    /// Writes the current metrics snapshot to the logger under
    /// `canvas::metrics`. No-op without both a logger and metrics.
    pub fn log_metrics(&self, uptime: Duration) {
        let (Some(logger), Some(metrics)) = (&self.logger, &self.metrics) else {
            return;
        };
        let snapshot = metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot(uptime);
        let _ = logger.log_event(snapshot.to_log_event(METRICS_TARGET));
    }

    fn with_metrics_mut(&self, update: impl FnOnce(&mut InteractionMetrics)) {
        if let Some(metrics) = &self.metrics {
            update(&mut metrics.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }

    fn emit(&self, builder: CanvasEventBuilder) {
        self.events.emit(builder.finish());
    }

    fn log<const N: usize>(
        &self,
        level: LogLevel,
        message: &str,
        fields: [(String, serde_json::Value); N],
    ) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }
}
