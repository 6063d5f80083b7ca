//! Widget configuration registry.
//!
//! Maps a widget type to its defaults, validation schema and declarative
//! settings UI. Registries are constructed and injected; there is no global.

pub mod builtins;
mod core;
mod definition;
mod options;
mod schema;

pub use core::WidgetRegistry;
pub use definition::{WidgetDefinition, WidgetDefinitionBuilder};
pub use options::{
    Choice, EnhancedWidgetConfig, OptionControl, Visibility, WidgetOptionDefinition,
    WidgetOptionGroup, loose_eq,
};
pub use schema::{FieldKind, FieldRule, ValidationReport, WidgetSchema};
