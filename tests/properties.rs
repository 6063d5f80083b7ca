use std::collections::HashSet;

use proptest::prelude::*;
use widget_canvas::{
    Cell, GridPlacement, GridWidget, Page, Size, WidgetPosition, compute_layout,
    constrain_to_margins, detect_collisions, snap_to_grid_with_margins,
};

const EPSILON: f64 = 1e-9;

/// A page plus a container whose available space divides evenly into cells.
#[derive(Debug, Clone)]
struct Board {
    page: Page,
    container: Size,
    cell: (f64, f64),
}

impl Board {
    fn space(&self) -> (f64, f64, f64, f64) {
        let left = f64::from(self.page.margin_left);
        let top = f64::from(self.page.margin_top);
        let right = self.container.width - f64::from(self.page.margin_right);
        let bottom = self.container.height - f64::from(self.page.margin_bottom);
        (left, top, right, bottom)
    }
}

fn arb_board(snapping: bool) -> impl Strategy<Value = Board> {
    (
        1u32..=12,
        1u32..=12,
        8u32..=80,
        8u32..=80,
        prop::array::uniform4(0u32..=120),
    )
        .prop_map(move |(rows, cols, cell_w, cell_h, [top, right, bottom, left])| {
            let width = f64::from(left + right + cols * cell_w);
            let height = f64::from(top + bottom + rows * cell_h);
            Board {
                page: Page::new("p", "prop")
                    .with_grid(rows, cols)
                    .with_snapping(snapping)
                    .with_margins(top, right, bottom, left),
                container: Size::new(width, height),
                cell: (f64::from(cell_w), f64::from(cell_h)),
            }
        })
}

/// A board and a widget that fits inside its available space, placed
/// anywhere (including outside the margins).
fn arb_board_and_widget(snapping: bool) -> impl Strategy<Value = (Board, WidgetPosition)> {
    arb_board(snapping).prop_flat_map(|board| {
        let (left, top, right, bottom) = board.space();
        let max_w = right - left;
        let max_h = bottom - top;
        let span_x = board.container.width;
        let span_y = board.container.height;
        (
            Just(board),
            -span_x..span_x * 2.0,
            -span_y..span_y * 2.0,
            1.0..=max_w,
            1.0..=max_h,
        )
            .prop_map(|(board, x, y, w, h)| (board, WidgetPosition::new(x, y, w, h)))
    })
}

fn arb_widgets(rows: u32, cols: u32) -> impl Strategy<Value = Vec<GridWidget>> {
    let rows = rows as i32;
    let cols = cols as i32;
    prop::collection::vec(
        (-2..rows + 2, -2..cols + 2, -1..=rows, -1..=cols),
        0..10,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (row, col, rs, cs))| {
                GridWidget::new(format!("w{i}"), GridPlacement::new(row, col, rs, cs))
            })
            .collect()
    })
}

fn covers(widget: &GridWidget, cell: Cell) -> bool {
    let p = widget.placement;
    cell.row >= p.row
        && i64::from(cell.row) < p.bottom()
        && cell.col >= p.col
        && i64::from(cell.col) < p.right()
}

fn assert_contained(board: &Board, pos: WidgetPosition) -> Result<(), TestCaseError> {
    let (left, top, right, bottom) = board.space();
    prop_assert!(pos.x >= left - EPSILON, "x {} < left {}", pos.x, left);
    prop_assert!(pos.y >= top - EPSILON, "y {} < top {}", pos.y, top);
    prop_assert!(pos.right() <= right + EPSILON, "right {} > {}", pos.right(), right);
    prop_assert!(pos.bottom() <= bottom + EPSILON, "bottom {} > {}", pos.bottom(), bottom);
    Ok(())
}

proptest! {
    #[test]
    fn snapping_twice_changes_nothing((board, pos) in arb_board_and_widget(true)) {
        let once = snap_to_grid_with_margins(pos, &board.page, board.container);
        let twice = snap_to_grid_with_margins(once, &board.page, board.container);
        prop_assert!((once.x - twice.x).abs() < EPSILON);
        prop_assert!((once.y - twice.y).abs() < EPSILON);
        prop_assert!((once.width - twice.width).abs() < EPSILON);
        prop_assert!((once.height - twice.height).abs() < EPSILON);
    }

    #[test]
    fn snapped_sizes_are_whole_cells((board, pos) in arb_board_and_widget(true)) {
        let snapped = snap_to_grid_with_margins(pos, &board.page, board.container);
        let cols = snapped.width / board.cell.0;
        let rows = snapped.height / board.cell.1;
        prop_assert!((cols - cols.round()).abs() < EPSILON);
        prop_assert!((rows - rows.round()).abs() < EPSILON);
        prop_assert!(cols.round() >= 1.0 && rows.round() >= 1.0);
    }

    #[test]
    fn results_stay_inside_margins(
        (board, pos) in arb_board_and_widget(false),
        snapping in any::<bool>(),
    ) {
        let page = board.page.clone().with_snapping(snapping);
        assert_contained(&board, constrain_to_margins(pos, &page, board.container))?;
        assert_contained(&board, snap_to_grid_with_margins(pos, &page, board.container))?;
    }

    #[test]
    fn collisions_are_symmetric(widgets in arb_widgets(6, 6)) {
        let map = detect_collisions(&widgets);
        prop_assert_eq!(map.len(), widgets.len());
        for (id, others) in &map {
            prop_assert!(!others.contains(id));
            for other in others {
                prop_assert!(
                    map[other].contains(id),
                    "{} lists {} but not the reverse", id, other
                );
            }
        }
    }

    #[test]
    fn gaps_partition_the_grid(
        (rows, cols, widgets) in (1u32..=8, 1u32..=8)
            .prop_flat_map(|(rows, cols)| (Just(rows), Just(cols), arb_widgets(rows, cols)))
    ) {
        let result = compute_layout(&widgets, rows, cols);
        let gaps: HashSet<Cell> = result.gaps.iter().copied().collect();
        prop_assert_eq!(gaps.len(), result.gaps.len(), "a gap is listed twice");

        for row in 0..rows as i32 {
            for col in 0..cols as i32 {
                let cell = Cell::new(row, col);
                let occupied = widgets.iter().any(|w| covers(w, cell));
                prop_assert_eq!(occupied, !gaps.contains(&cell), "cell {:?}", cell);
            }
        }
        prop_assert!(gaps.iter().all(|c| c.row < rows as i32 && c.col < cols as i32));
        prop_assert_eq!(result.positions.len(), widgets.len());
    }
}
