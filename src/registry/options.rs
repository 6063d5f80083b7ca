use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::WidgetOptions;

/// A labelled value offered by select and radio controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Form control used to edit an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionControl {
    Select {
        options: Vec<Choice>,
    },
    Color,
    Slider {
        min: f64,
        max: f64,
        step: f64,
    },
    Toggle,
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Tags,
    Checkbox,
    Radio {
        options: Vec<Choice>,
    },
    /// Rendered by a host-provided component named `component`.
    Custom {
        component: String,
    },
}

/// Visibility predicate for an option: every listed key must currently hold
/// the required value. An empty predicate is always visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Visibility {
    requires: Map<String, Value>,
}

impl Visibility {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn when(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::always().and(key, value)
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.requires.insert(key.into(), value.into());
        self
    }

    pub fn requirements(&self) -> &Map<String, Value> {
        &self.requires
    }

    pub fn is_unconditional(&self) -> bool {
        self.requires.is_empty()
    }

    /// Evaluates against the in-progress (possibly unsaved) option values.
    /// A governing key missing from `current` fails the predicate.
    pub fn is_visible(&self, current: &WidgetOptions) -> bool {
        self.requires.iter().all(|(key, required)| {
            current
                .get(key)
                .is_some_and(|actual| loose_eq(actual, required))
        })
    }
}

/// Value equality that tolerates the representations option values take in
/// transit: numbers compare numerically, and a bool or number also matches
/// its string spelling (`true` == `"true"`, `3` == `"3"`).
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Bool(x), Value::String(s)) | (Value::String(s), Value::Bool(x)) => {
            s.parse::<bool>().is_ok_and(|parsed| parsed == *x)
        }
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => s
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| n.as_f64() == Some(parsed)),
        _ => a == b,
    }
}

/// One editable option of a widget type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetOptionDefinition {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub control: OptionControl,
    pub default: Value,
    #[serde(rename = "dependencies", skip_serializing_if = "Visibility::is_unconditional")]
    pub visibility: Visibility,
}

impl WidgetOptionDefinition {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        control: OptionControl,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            control,
            default: default.into(),
            visibility: Visibility::always(),
        }
    }

    pub fn toggle(key: &str, label: &str, default: bool) -> Self {
        Self::new(key, label, OptionControl::Toggle, default)
    }

    pub fn checkbox(key: &str, label: &str, default: bool) -> Self {
        Self::new(key, label, OptionControl::Checkbox, default)
    }

    pub fn slider(key: &str, label: &str, range: (f64, f64, f64), default: f64) -> Self {
        let (min, max, step) = range;
        Self::new(key, label, OptionControl::Slider { min, max, step }, default)
    }

    pub fn select(key: &str, label: &str, choices: &[(&str, &str)], default: &str) -> Self {
        Self::new(
            key,
            label,
            OptionControl::Select {
                options: to_choices(choices),
            },
            default,
        )
    }

    pub fn radio(key: &str, label: &str, choices: &[(&str, &str)], default: &str) -> Self {
        Self::new(
            key,
            label,
            OptionControl::Radio {
                options: to_choices(choices),
            },
            default,
        )
    }

    pub fn text(key: &str, label: &str, default: &str) -> Self {
        Self::new(
            key,
            label,
            OptionControl::Text {
                placeholder: None,
                max_length: None,
            },
            default,
        )
    }

    pub fn color(key: &str, label: &str, default: &str) -> Self {
        Self::new(key, label, OptionControl::Color, default)
    }

    pub fn tags(key: &str, label: &str, default: &[&str]) -> Self {
        Self::new(key, label, OptionControl::Tags, default.to_vec())
    }

    pub fn custom(key: &str, label: &str, component: &str, default: Value) -> Self {
        Self::new(
            key,
            label,
            OptionControl::Custom {
                component: component.to_string(),
            },
            default,
        )
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        if let OptionControl::Text { placeholder, .. } = &mut self.control {
            *placeholder = Some(text.to_string());
        }
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        if let OptionControl::Text { max_length, .. } = &mut self.control {
            *max_length = Some(limit);
        }
        self
    }

    /// Shown only while `key` holds `value`. Chain for multiple conditions.
    pub fn depends_on(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.visibility = self.visibility.and(key, value);
        self
    }
}

fn to_choices(choices: &[(&str, &str)]) -> Vec<Choice> {
    choices
        .iter()
        .map(|(value, label)| Choice::new(*value, *label))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptionGroup {
    pub id: String,
    pub label: String,
    pub collapsible: bool,
    pub default_open: bool,
    pub options: Vec<WidgetOptionDefinition>,
}

impl WidgetOptionGroup {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            collapsible: false,
            default_open: true,
            options: Vec::new(),
        }
    }

    /// Collapsible group, initially open or closed.
    pub fn collapsed(mut self, default_open: bool) -> Self {
        self.collapsible = true;
        self.default_open = default_open;
        self
    }

    pub fn option(mut self, option: WidgetOptionDefinition) -> Self {
        self.options.push(option);
        self
    }
}

/// Full declarative settings UI of a widget type: ordered groups of options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedWidgetConfig {
    pub widget_type: String,
    pub groups: Vec<WidgetOptionGroup>,
}

impl EnhancedWidgetConfig {
    pub fn options(&self) -> impl Iterator<Item = &WidgetOptionDefinition> {
        self.groups.iter().flat_map(|group| group.options.iter())
    }

    pub fn option(&self, key: &str) -> Option<&WidgetOptionDefinition> {
        self.options().find(|option| option.key == key)
    }

    /// Options whose visibility predicate holds for `current`, in UI order.
    pub fn visible_options<'a>(
        &'a self,
        current: &'a WidgetOptions,
    ) -> impl Iterator<Item = &'a WidgetOptionDefinition> + 'a {
        self.options()
            .filter(move |option| option.visibility.is_visible(current))
    }
}
