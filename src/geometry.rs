use serde::{Deserialize, Serialize};

/// Pixel dimensions of a container or a minimum widget footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Area left for widget placement once page margins are removed.
///
/// `width`/`height` go negative when margins exceed the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Space {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Space {
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Absolute pixel rectangle of a widget within its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WidgetPosition {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Widget footprint expressed in grid cells.
///
/// Signed so malformed geometry survives deserialisation and gets clipped
/// by the analyzer instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPlacement {
    pub row: i32,
    pub col: i32,
    pub row_span: i32,
    pub col_span: i32,
}

impl GridPlacement {
    pub const fn new(row: i32, col: i32, row_span: i32, col_span: i32) -> Self {
        Self {
            row,
            col,
            row_span,
            col_span,
        }
    }

    /// Occupied cell count; negative spans count as empty.
    pub fn area(&self) -> i64 {
        i64::from(self.row_span.max(0)) * i64::from(self.col_span.max(0))
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.row) + i64::from(self.row_span)
    }

    pub fn right(&self) -> i64 {
        i64::from(self.col) + i64::from(self.col_span)
    }
}

/// Top-left cell of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_spans_have_no_area() {
        assert_eq!(GridPlacement::new(0, 0, -2, 3).area(), 0);
        assert_eq!(GridPlacement::new(0, 0, 2, 3).area(), 6);
    }

    #[test]
    fn space_with_negative_extent_is_degenerate() {
        let space = Space {
            x: 10.0,
            y: 10.0,
            width: -5.0,
            height: 20.0,
        };
        assert!(space.is_degenerate());
    }
}
