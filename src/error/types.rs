use serde::Serialize;
use thiserror::Error;

/// Unified result type for the canvas crate.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors surfaced by the canvas core.
///
/// Geometry and layout never produce these; they clamp instead.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("widget type `{0}` is not registered")]
    UnknownWidgetType(String),
    #[error("widget type `{0}` is already registered")]
    DuplicateWidgetType(String),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Logging(#[from] crate::logging::LoggingError),
}

/// Raised by a position-commit collaborator when persisting a gesture fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to commit position for widget `{widget_id}`: {reason}")]
pub struct CommitError {
    pub widget_id: String,
    pub reason: String,
}

impl CommitError {
    pub fn new(widget_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            reason: reason.into(),
        }
    }
}

/// Field-level validation failure. Reported as data, never as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
