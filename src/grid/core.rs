use crate::geometry::{GridPlacement, Size, Space, WidgetPosition};
use crate::model::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, GridConfig, MAX_GRID_DIMENSION, Page};

/// Grid view of a page. Unset or zero dimensions fall back to 6×6.
pub fn grid_config(page: &Page) -> GridConfig {
    GridConfig {
        rows: page
            .grid_rows
            .filter(|rows| *rows > 0)
            .map_or(DEFAULT_GRID_ROWS, |rows| rows.min(MAX_GRID_DIMENSION)),
        cols: page
            .grid_cols
            .filter(|cols| *cols > 0)
            .map_or(DEFAULT_GRID_COLS, |cols| cols.min(MAX_GRID_DIMENSION)),
        snapping: page.snapping.unwrap_or(false),
    }
}

/// Container rectangle minus the four page margins. May be negative.
pub fn available_space(page: &Page, container: Size) -> Space {
    let left = f64::from(page.margin_left);
    let top = f64::from(page.margin_top);
    Space {
        x: left,
        y: top,
        width: container.width - left - f64::from(page.margin_right),
        height: container.height - top - f64::from(page.margin_bottom),
    }
}

/// Shrinks the rectangle to the available space, then clamps its origin so
/// it stays inside the margins.
///
/// The clamp is `min(max_x, max(min_x, x))` in that order: when the range is
/// inverted the upper bound wins, which keeps the result finite and inside
/// the intended region whenever that is geometrically possible.
pub fn constrain_to_margins(position: WidgetPosition, page: &Page, container: Size) -> WidgetPosition {
    let space = available_space(page, container);

    let width = position.width.min(space.width);
    let height = position.height.min(space.height);

    let min_x = space.x;
    let max_x = space.x + space.width - width;
    let min_y = space.y;
    let max_y = space.y + space.height - height;

    WidgetPosition {
        x: max_x.min(min_x.max(position.x)),
        y: max_y.min(min_y.max(position.y)),
        width,
        height,
    }
}

/// Constrain, snap to the nearest cell boundary, then constrain again.
///
/// The second constrain pass guarantees a snapped widget whose size was
/// rounded up never crosses a margin. Snapping is skipped when disabled on
/// the page or when the cell size is not a positive finite number.
pub fn snap_to_grid_with_margins(
    position: WidgetPosition,
    page: &Page,
    container: Size,
) -> WidgetPosition {
    let constrained = constrain_to_margins(position, page, container);
    let grid = grid_config(page);
    if !grid.snapping {
        return constrained;
    }

    let space = available_space(page, container);
    let Some((cell_width, cell_height)) = cell_size(&space, &grid) else {
        return constrained;
    };

    let rel_x = constrained.x - space.x;
    let rel_y = constrained.y - space.y;

    let snapped = WidgetPosition {
        x: round_half_up(rel_x / cell_width) * cell_width + space.x,
        y: round_half_up(rel_y / cell_height) * cell_height + space.y,
        width: cell_width.max(round_half_up(constrained.width / cell_width) * cell_width),
        height: cell_height.max(round_half_up(constrained.height / cell_height) * cell_height),
    };

    constrain_to_margins(snapped, page, container)
}

/// Converts a pixel rectangle to grid cells relative to the available space.
pub fn to_placement(position: WidgetPosition, page: &Page, container: Size) -> GridPlacement {
    let space = available_space(page, container);
    let grid = grid_config(page);
    let Some((cell_width, cell_height)) = cell_size(&space, &grid) else {
        return GridPlacement::new(0, 0, 1, 1);
    };

    // `as` saturates on overflow and maps NaN to zero.
    GridPlacement {
        row: round_half_up((position.y - space.y) / cell_height) as i32,
        col: round_half_up((position.x - space.x) / cell_width) as i32,
        row_span: (round_half_up(position.height / cell_height) as i32).max(1),
        col_span: (round_half_up(position.width / cell_width) as i32).max(1),
    }
}

/// Converts grid cells back to an absolute pixel rectangle.
pub fn to_position(placement: GridPlacement, page: &Page, container: Size) -> WidgetPosition {
    let space = available_space(page, container);
    let grid = grid_config(page);
    let Some((cell_width, cell_height)) = cell_size(&space, &grid) else {
        return WidgetPosition::new(space.x, space.y, 0.0, 0.0);
    };

    WidgetPosition {
        x: space.x + f64::from(placement.col) * cell_width,
        y: space.y + f64::from(placement.row) * cell_height,
        width: f64::from(placement.col_span.max(0)) * cell_width,
        height: f64::from(placement.row_span.max(0)) * cell_height,
    }
}

fn cell_size(space: &Space, grid: &GridConfig) -> Option<(f64, f64)> {
    let cell_width = space.width / f64::from(grid.cols);
    let cell_height = space.height / f64::from(grid.rows);
    let usable = |v: f64| v.is_finite() && v > 0.0;
    (usable(cell_width) && usable(cell_height)).then_some((cell_width, cell_height))
}

/// Half-up rounding; `f64::round` rounds half away from zero.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new("home", "Home").with_grid(6, 6).with_snapping(true)
    }

    fn container() -> Size {
        Size::new(600.0, 600.0)
    }

    #[test]
    fn grid_config_defaults_unset_and_zero_dimensions() {
        let mut page = Page::new("p", "P");
        assert_eq!(
            grid_config(&page),
            GridConfig {
                rows: 6,
                cols: 6,
                snapping: false
            }
        );
        page.grid_rows = Some(0);
        page.grid_cols = Some(3);
        let grid = grid_config(&page);
        assert_eq!((grid.rows, grid.cols), (6, 3));
    }

    #[test]
    fn grid_config_clamps_huge_dimensions() {
        let page = Page::new("p", "P").with_grid(u32::MAX, 12);
        let grid = grid_config(&page);
        assert_eq!((grid.rows, grid.cols), (MAX_GRID_DIMENSION, 12));
    }

    #[test]
    fn available_space_subtracts_margins() {
        let page = page().with_margins(10, 20, 30, 40);
        let space = available_space(&page, container());
        assert_eq!(
            space,
            Space {
                x: 40.0,
                y: 10.0,
                width: 540.0,
                height: 560.0
            }
        );
    }

    #[test]
    fn available_space_goes_negative_when_margins_exceed_container() {
        let page = page().with_margins(200, 200, 200, 200);
        let space = available_space(&page, Size::new(300.0, 300.0));
        assert_eq!(space.width, -100.0);
        assert!(space.is_degenerate());
    }

    #[test]
    fn snaps_to_nearest_cell() {
        let snapped = snap_to_grid_with_margins(
            WidgetPosition::new(95.0, 5.0, 110.0, 95.0),
            &page(),
            container(),
        );
        assert_eq!(snapped, WidgetPosition::new(100.0, 0.0, 100.0, 100.0));
        let cell = to_placement(snapped, &page(), container());
        assert_eq!((cell.row, cell.col), (0, 1));
    }

    #[test]
    fn snapping_disabled_only_constrains() {
        let page = page().with_snapping(false).with_margins(10, 10, 10, 10);
        let result = snap_to_grid_with_margins(
            WidgetPosition::new(3.0, 47.0, 123.0, 77.0),
            &page,
            container(),
        );
        assert_eq!(result, WidgetPosition::new(10.0, 47.0, 123.0, 77.0));
    }

    #[test]
    fn oversized_widget_is_shrunk_to_available_space() {
        let page = page().with_margins(50, 50, 50, 50);
        let result = constrain_to_margins(
            WidgetPosition::new(-30.0, 900.0, 1000.0, 1000.0),
            &page,
            container(),
        );
        assert_eq!(result, WidgetPosition::new(50.0, 50.0, 500.0, 500.0));
    }

    #[test]
    fn snapped_size_never_crosses_far_margin() {
        let page = page().with_margins(0, 0, 0, 0);
        let result = snap_to_grid_with_margins(
            WidgetPosition::new(540.0, 540.0, 160.0, 160.0),
            &page,
            container(),
        );
        assert!(result.right() <= 600.0);
        assert!(result.bottom() <= 600.0);
        assert_eq!(result, WidgetPosition::new(400.0, 400.0, 200.0, 200.0));
    }

    #[test]
    fn zero_area_space_degrades_without_nan() {
        let page = page().with_margins(0, 300, 0, 300);
        let result = snap_to_grid_with_margins(
            WidgetPosition::new(10.0, 10.0, 100.0, 100.0),
            &page,
            container(),
        );
        assert_eq!(result.width, 0.0);
        assert_eq!(result.x, 300.0);
        assert!(result.y.is_finite());
        assert_eq!(
            to_placement(result, &page, container()),
            GridPlacement::new(0, 0, 1, 1)
        );
    }

    #[test]
    fn inverted_clamp_prefers_upper_bound() {
        let page = page().with_snapping(false).with_margins(0, 200, 0, 200);
        let result = constrain_to_margins(
            WidgetPosition::new(50.0, 0.0, 100.0, 100.0),
            &page,
            Size::new(300.0, 600.0),
        );
        // Available width is -100; the width follows it and x lands on max_x.
        assert_eq!(result.width, -100.0);
        assert_eq!(result.x, 200.0);
    }

    #[test]
    fn single_cell_grid_fills_available_space() {
        let page = page().with_grid(1, 1).with_margins(20, 20, 20, 20);
        let result = snap_to_grid_with_margins(
            WidgetPosition::new(100.0, 100.0, 50.0, 50.0),
            &page,
            container(),
        );
        assert_eq!(result, WidgetPosition::new(20.0, 20.0, 560.0, 560.0));
    }

    #[test]
    fn placement_round_trips_through_pixels() {
        let page = page().with_margins(10, 10, 10, 10);
        let placement = GridPlacement::new(2, 3, 2, 1);
        let position = to_position(placement, &page, Size::new(620.0, 620.0));
        assert_eq!(position, WidgetPosition::new(310.0, 210.0, 100.0, 200.0));
        assert_eq!(
            to_placement(position, &page, Size::new(620.0, 620.0)),
            placement
        );
    }
}
