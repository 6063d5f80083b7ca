//! Error types shared across the canvas core.

mod types;

pub use types::{CanvasError, CommitError, FieldError, Result};
