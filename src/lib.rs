//! Core of a grid-based widget dashboard canvas.
//!
//! Pixel geometry is snapped and clamped onto a page's logical grid, widget
//! layouts are analysed for occupancy, gaps and overlaps, drag/resize
//! gestures run through a small state machine, and widget option trees are
//! described, defaulted and validated by a constructed registry. Rendering,
//! persistence and transport stay with the host.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod registry;

pub use cache::{CacheStats, ComputationCache, MemoOptions, Memoized, memoize};
pub use config::CanvasConfig;
pub use error::{CanvasError, CommitError, FieldError, Result};
pub use events::{
    CanvasEvent, CanvasEventBuilder, CanvasEventKind, CanvasEventSink, NullEventSink,
    RecordingEventSink,
};
pub use geometry::{Cell, GridPlacement, Size, Space, WidgetPosition};
pub use grid::{
    available_space, constrain_to_margins, grid_config, snap_to_grid_with_margins, to_placement,
    to_position,
};
pub use interaction::{
    CommittedPosition, EventFlow, GestureKind, GestureStart, InteractionConfig,
    InteractionController, InteractionState, PointerEvent, PositionCommit,
};
pub use layout::{
    CollisionDetector, CollisionMap, GridWidget, LayoutResult, compute_layout, compute_page_layout,
    detect_collisions,
};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{InteractionMetrics, MetricSnapshot};
pub use model::{GridConfig, Page, WidgetInstance, WidgetOptions};
pub use registry::{
    EnhancedWidgetConfig, ValidationReport, Visibility, WidgetDefinition, WidgetOptionDefinition,
    WidgetRegistry,
};
