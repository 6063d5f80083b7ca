use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::FieldError;
use crate::model::WidgetOptions;

use super::options::{OptionControl, WidgetOptionDefinition};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color pattern compiles")
});

/// Constraint applied to one option value.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    Enum(Vec<String>),
    Text {
        pattern: Option<Regex>,
        max_length: Option<usize>,
    },
    Color,
    StringList,
    Any,
}

impl FieldKind {
    /// Constraint implied by the control that edits the value.
    pub fn for_control(control: &OptionControl) -> Self {
        match control {
            OptionControl::Toggle | OptionControl::Checkbox => Self::Bool,
            OptionControl::Slider { min, max, step } => Self::Number {
                min: Some(*min),
                max: Some(*max),
                integer: step.fract() == 0.0 && min.fract() == 0.0,
            },
            OptionControl::Select { options } | OptionControl::Radio { options } => {
                Self::Enum(options.iter().map(|c| c.value.clone()).collect())
            }
            OptionControl::Text { max_length, .. } => Self::Text {
                pattern: None,
                max_length: *max_length,
            },
            OptionControl::Color => Self::Color,
            OptionControl::Tags => Self::StringList,
            OptionControl::Custom { .. } => Self::Any,
        }
    }

    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Bool => (!value.is_boolean()).then(|| "expected a boolean".to_string()),
            Self::Number { min, max, integer } => {
                let Some(number) = value.as_f64() else {
                    return Some("expected a number".to_string());
                };
                if *integer && number.fract() != 0.0 {
                    return Some("expected a whole number".to_string());
                }
                match (min, max) {
                    (Some(lo), Some(hi)) if number < *lo || number > *hi => {
                        Some(format!("must be between {lo} and {hi}"))
                    }
                    (Some(lo), None) if number < *lo => Some(format!("must be at least {lo}")),
                    (None, Some(hi)) if number > *hi => Some(format!("must be at most {hi}")),
                    _ => None,
                }
            }
            Self::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => None,
                _ => Some(format!("must be one of: {}", allowed.join(", "))),
            },
            Self::Text {
                pattern,
                max_length,
            } => {
                let Some(text) = value.as_str() else {
                    return Some("expected a string".to_string());
                };
                if let Some(limit) = max_length {
                    if text.chars().count() > *limit {
                        return Some(format!("must be at most {limit} characters"));
                    }
                }
                match pattern {
                    Some(re) if !text.is_empty() && !re.is_match(text) => {
                        Some(format!("does not match pattern {}", re.as_str()))
                    }
                    _ => None,
                }
            }
            Self::Color => match value.as_str() {
                Some(s) if HEX_COLOR.is_match(s) => None,
                _ => Some("expected a hex color like #1e293b".to_string()),
            },
            Self::StringList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => None,
                _ => Some("expected a list of strings".to_string()),
            },
            Self::Any => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub key: String,
    pub kind: FieldKind,
}

/// Outcome of validating a candidate option map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == key)
    }
}

/// Field-by-field constraints of one widget type.
#[derive(Debug, Clone, Default)]
pub struct WidgetSchema {
    rules: Vec<FieldRule>,
}

impl WidgetSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rule for `key`.
    pub fn set(&mut self, key: &str, kind: FieldKind) {
        match self.rules.iter_mut().find(|rule| rule.key == key) {
            Some(rule) => rule.kind = kind,
            None => self.rules.push(FieldRule {
                key: key.to_string(),
                kind,
            }),
        }
    }

    pub fn derive_from(&mut self, option: &WidgetOptionDefinition) {
        self.set(&option.key, FieldKind::for_control(&option.control));
    }

    pub fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.key == key)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Checks every key present in `candidate`. Absent keys are not errors:
    /// they fall back to defaults. Keys the schema does not know are.
    pub fn validate(&self, candidate: &WidgetOptions) -> ValidationReport {
        let mut errors = Vec::new();
        for (key, value) in candidate {
            match self.rule(key) {
                Some(rule) => {
                    if let Some(message) = rule.kind.check(value) {
                        errors.push(FieldError::new(key.clone(), message));
                    }
                }
                None => errors.push(FieldError::new(key.clone(), "unknown option")),
            }
        }
        ValidationReport::from_errors(errors)
    }
}
