//! Persisted dashboard entities as the core reads them.
//!
//! Pages and widget instances are owned by an external persistence layer;
//! the geometry engine and the interaction controller only read them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::geometry::WidgetPosition;

pub const DEFAULT_GRID_ROWS: u32 = 6;
pub const DEFAULT_GRID_COLS: u32 = 6;
pub const MAX_MARGIN: u32 = 200;
/// Upper bound on rows and columns; larger values are clamped.
pub const MAX_GRID_DIMENSION: u32 = 100;

/// Widget option payload, stored server-side as an opaque JSON object.
pub type WidgetOptions = Map<String, Value>;

/// Logical canvas holding widgets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub grid_rows: Option<u32>,
    pub grid_cols: Option<u32>,
    pub snapping: Option<bool>,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, rows: u32, cols: u32) -> Self {
        self.grid_rows = Some(rows);
        self.grid_cols = Some(cols);
        self
    }

    pub fn with_snapping(mut self, snapping: bool) -> Self {
        self.snapping = Some(snapping);
        self
    }

    /// Margins in top, right, bottom, left order.
    pub fn with_margins(mut self, top: u32, right: u32, bottom: u32, left: u32) -> Self {
        self.margin_top = top;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self.margin_left = left;
        self
    }

    /// Field-level checks applied before a page is handed to persistence.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let dimensions = [("gridRows", self.grid_rows), ("gridCols", self.grid_cols)];
        for (field, value) in dimensions {
            match value {
                Some(0) => errors.push(FieldError::new(field, "must be at least 1")),
                Some(n) if n > MAX_GRID_DIMENSION => errors.push(FieldError::new(
                    field,
                    format!("must be at most {MAX_GRID_DIMENSION}, got {n}"),
                )),
                _ => {}
            }
        }
        let margins = [
            ("marginTop", self.margin_top),
            ("marginRight", self.margin_right),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
        ];
        for (field, value) in margins {
            if value > MAX_MARGIN {
                errors.push(FieldError::new(
                    field,
                    format!("must be at most {MAX_MARGIN}, got {value}"),
                ));
            }
        }
        errors
    }
}

/// Grid view over a page; derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub snapping: bool,
}

/// A placed, configured widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub position: WidgetPosition,
    #[serde(default)]
    pub options: WidgetOptions,
    #[serde(default)]
    pub page_id: Option<String>,
}

impl WidgetInstance {
    pub fn new(
        id: impl Into<String>,
        widget_type: impl Into<String>,
        position: WidgetPosition,
    ) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            position,
            options: WidgetOptions::new(),
            page_id: None,
        }
    }

    pub fn on_page(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }
}
