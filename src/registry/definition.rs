use serde_json::Value;

use crate::geometry::Size;
use crate::model::WidgetOptions;

use super::options::{EnhancedWidgetConfig, WidgetOptionGroup};
use super::schema::{FieldKind, WidgetSchema};

/// Everything a widget type contributes to the registry.
#[derive(Debug, Clone)]
pub struct WidgetDefinition {
    pub widget_type: String,
    pub label: String,
    /// Resize floor for this type; `None` uses the controller's fallback.
    pub min_size: Option<Size>,
    pub defaults: WidgetOptions,
    pub schema: WidgetSchema,
    pub config: EnhancedWidgetConfig,
}

impl WidgetDefinition {
    pub fn builder(widget_type: &str, label: &str) -> WidgetDefinitionBuilder {
        WidgetDefinitionBuilder {
            widget_type: widget_type.to_string(),
            label: label.to_string(),
            min_size: None,
            groups: Vec::new(),
            hidden: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

/// Assembles a definition so defaults, schema and UI tree stay in step:
/// every option contributes its default and a rule derived from its control.
pub struct WidgetDefinitionBuilder {
    widget_type: String,
    label: String,
    min_size: Option<Size>,
    groups: Vec<WidgetOptionGroup>,
    hidden: Vec<(String, FieldKind, Value)>,
    overrides: Vec<(String, FieldKind)>,
}

impl WidgetDefinitionBuilder {
    pub fn min_size(mut self, width: f64, height: f64) -> Self {
        self.min_size = Some(Size::new(width, height));
        self
    }

    pub fn group(mut self, group: WidgetOptionGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// A persisted value with no settings control (e.g. note content).
    pub fn hidden(mut self, key: &str, kind: FieldKind, default: impl Into<Value>) -> Self {
        self.hidden.push((key.to_string(), kind, default.into()));
        self
    }

    /// Replaces the rule derived from an option's control.
    pub fn constrain(mut self, key: &str, kind: FieldKind) -> Self {
        self.overrides.push((key.to_string(), kind));
        self
    }

    pub fn build(self) -> WidgetDefinition {
        let mut defaults = WidgetOptions::new();
        let mut schema = WidgetSchema::new();

        for option in self.groups.iter().flat_map(|g| g.options.iter()) {
            defaults.insert(option.key.clone(), option.default.clone());
            schema.derive_from(option);
        }
        for (key, kind, default) in self.hidden {
            schema.set(&key, kind);
            defaults.insert(key, default);
        }
        for (key, kind) in self.overrides {
            schema.set(&key, kind);
        }

        WidgetDefinition {
            config: EnhancedWidgetConfig {
                widget_type: self.widget_type.clone(),
                groups: self.groups,
            },
            widget_type: self.widget_type,
            label: self.label,
            min_size: self.min_size,
            defaults,
            schema,
        }
    }
}
