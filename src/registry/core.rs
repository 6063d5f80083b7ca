use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde_json::json;

use crate::error::{CanvasError, FieldError, Result};
use crate::geometry::Size;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv, json_str};
use crate::model::WidgetOptions;

use super::builtins::builtin_definitions;
use super::definition::WidgetDefinition;
use super::options::{EnhancedWidgetConfig, WidgetOptionDefinition};
use super::schema::ValidationReport;

const LOG_TARGET: &str = "canvas::registry";

/// Lookup table from widget type to its definition.
#[derive(Default)]
pub struct WidgetRegistry {
    definitions: HashMap<String, WidgetDefinition>,
    logger: Option<Logger>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the shipped widget types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            registry
                .definitions
                .insert(definition.widget_type.clone(), definition);
        }
        registry
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn register(&mut self, definition: WidgetDefinition) -> Result<()> {
        match self.definitions.entry(definition.widget_type.clone()) {
            Entry::Occupied(entry) => Err(CanvasError::DuplicateWidgetType(entry.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(definition);
                Ok(())
            }
        }
    }

    pub fn definition(&self, widget_type: &str) -> Option<&WidgetDefinition> {
        self.definitions.get(widget_type)
    }

    /// Registered type names, sorted.
    pub fn widget_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn has_config(&self, widget_type: &str) -> bool {
        self.definitions.contains_key(widget_type)
    }

    pub fn get_config(&self, widget_type: &str) -> Option<&EnhancedWidgetConfig> {
        self.definition(widget_type).map(|d| &d.config)
    }

    /// Defaults for `widget_type`; empty for unknown types.
    pub fn get_defaults(&self, widget_type: &str) -> WidgetOptions {
        self.definition(widget_type)
            .map(|d| d.defaults.clone())
            .unwrap_or_default()
    }

    pub fn min_size(&self, widget_type: &str) -> Option<Size> {
        self.definition(widget_type).and_then(|d| d.min_size)
    }

    /// Defaults overlaid with `overrides`.
    pub fn resolve_options(
        &self,
        widget_type: &str,
        overrides: &WidgetOptions,
    ) -> Result<WidgetOptions> {
        let definition = self
            .definition(widget_type)
            .ok_or_else(|| CanvasError::UnknownWidgetType(widget_type.to_string()))?;
        let mut resolved = definition.defaults.clone();
        for (key, value) in overrides {
            resolved.insert(key.clone(), value.clone());
        }
        Ok(resolved)
    }

    /// Field-level validation of `candidate`. The caller decides whether to
    /// reject the save or keep the valid subset.
    pub fn validate(&self, widget_type: &str, candidate: &WidgetOptions) -> ValidationReport {
        let report = match self.definition(widget_type) {
            Some(definition) => definition.schema.validate(candidate),
            None => ValidationReport::from_errors(vec![FieldError::new(
                "type",
                format!("unknown widget type `{widget_type}`"),
            )]),
        };
        if !report.valid {
            self.log_rejection(widget_type, &report);
        }
        report
    }

    /// Options visible for the in-progress `current` values, with defaults
    /// filling any key the editor has not touched yet.
    pub fn visible_options(
        &self,
        widget_type: &str,
        current: &WidgetOptions,
    ) -> Vec<&WidgetOptionDefinition> {
        let Some(definition) = self.definition(widget_type) else {
            return Vec::new();
        };
        let mut effective = definition.defaults.clone();
        for (key, value) in current {
            effective.insert(key.clone(), value.clone());
        }
        definition
            .config
            .options()
            .filter(|option| option.visibility.is_visible(&effective))
            .collect()
    }

    fn log_rejection(&self, widget_type: &str, report: &ValidationReport) {
        if let Some(logger) = &self.logger {
            let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
            let event = event_with_fields(
                LogLevel::Warn,
                LOG_TARGET,
                "registry.validation_failed",
                [
                    json_str("widget_type", widget_type),
                    json_kv("fields", json!(fields)),
                ],
            );
            let _ = logger.log_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::registry::options::WidgetOptionGroup;
    use serde_json::{Value, json};

    fn options(value: Value) -> WidgetOptions {
        value.as_object().cloned().unwrap_or_default()
    }

    fn keys(options: &[&WidgetOptionDefinition]) -> Vec<String> {
        options.iter().map(|o| o.key.clone()).collect()
    }

    #[test]
    fn builtins_are_registered() {
        let registry = WidgetRegistry::with_builtins();
        assert_eq!(
            registry.widget_types(),
            vec![
                "calendar",
                "clock",
                "homeassistant",
                "notes",
                "timer",
                "todo",
                "weather"
            ]
        );
        assert!(registry.has_config("calendar"));
        assert!(!registry.has_config("stocks"));
        assert!(registry.get_config("stocks").is_none());
        assert!(registry.get_defaults("stocks").is_empty());
    }

    #[test]
    fn calendar_today_color_follows_highlight_today() {
        let registry = WidgetRegistry::with_builtins();
        assert_eq!(registry.get_defaults("calendar")["highlightToday"], json!(true));

        let visible = registry.visible_options("calendar", &WidgetOptions::new());
        assert!(keys(&visible).contains(&"todayColor".to_string()));

        let edited = options(json!({"highlightToday": false}));
        let visible = registry.visible_options("calendar", &edited);
        assert!(!keys(&visible).contains(&"todayColor".to_string()));

        let config = registry.get_config("calendar").unwrap();
        let today_color = config.option("todayColor").unwrap();
        assert!(!today_color.visibility.is_visible(&edited));
    }

    #[test]
    fn timer_mode_switches_option_sets() {
        let registry = WidgetRegistry::with_builtins();
        let pomodoro = options(json!({"mode": "pomodoro"}));
        let visible = keys(&registry.visible_options("timer", &pomodoro));
        assert!(visible.contains(&"workMinutes".to_string()));
        assert!(!visible.contains(&"duration".to_string()));
    }

    #[test]
    fn validation_reports_fields_and_logs() {
        let sink = MemorySink::new();
        let registry = WidgetRegistry::with_builtins().with_logger(Logger::new(sink.clone()));

        let report = registry.validate(
            "weather",
            &options(json!({"units": "kelvin", "forecastDays": 9, "showWind": false})),
        );
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.field("units").is_some());
        assert!(report.field("forecastDays").is_some());
        assert_eq!(sink.messages(), vec!["registry.validation_failed"]);

        assert!(registry.validate("weather", &options(json!({"units": "imperial"}))).valid);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn unknown_type_fails_validation_on_type_field() {
        let registry = WidgetRegistry::with_builtins();
        let report = registry.validate("stocks", &WidgetOptions::new());
        assert_eq!(report.errors[0].field, "type");
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = WidgetRegistry::with_builtins();
        let custom = WidgetDefinition::builder("clock", "Clock again")
            .group(WidgetOptionGroup::new("g", "G"))
            .build();
        assert!(matches!(
            registry.register(custom),
            Err(CanvasError::DuplicateWidgetType(t)) if t == "clock"
        ));

        let stocks = WidgetDefinition::builder("stocks", "Stocks")
            .min_size(180.0, 90.0)
            .build();
        registry.register(stocks).unwrap();
        assert_eq!(registry.min_size("stocks"), Some(Size::new(180.0, 90.0)));
    }

    #[test]
    fn resolve_overlays_overrides_on_defaults() {
        let registry = WidgetRegistry::with_builtins();
        let resolved = registry
            .resolve_options("clock", &options(json!({"showSeconds": false})))
            .unwrap();
        assert_eq!(resolved["showSeconds"], json!(false));
        assert_eq!(resolved["style"], json!("digital"));
        assert!(matches!(
            registry.resolve_options("stocks", &WidgetOptions::new()),
            Err(CanvasError::UnknownWidgetType(_))
        ));
    }

    #[test]
    fn registries_are_independent() {
        let mut first = WidgetRegistry::new();
        let second = WidgetRegistry::new();
        first
            .register(WidgetDefinition::builder("solo", "Solo").build())
            .unwrap();
        assert!(first.has_config("solo"));
        assert!(!second.has_config("solo"));
    }
}
