use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::ComputationCache;
use crate::geometry::{Cell, GridPlacement, Size};
use crate::grid;
use crate::model::{MAX_GRID_DIMENSION, Page, WidgetInstance};

/// A widget reduced to its id and grid footprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridWidget {
    pub id: String,
    #[serde(flatten)]
    pub placement: GridPlacement,
}

impl GridWidget {
    pub fn new(id: impl Into<String>, placement: GridPlacement) -> Self {
        Self {
            id: id.into(),
            placement,
        }
    }

    /// Projects a pixel-positioned instance onto the page grid.
    pub fn from_instance(widget: &WidgetInstance, page: &Page, container: Size) -> Self {
        Self::new(
            widget.id.clone(),
            grid::to_placement(widget.position, page, container),
        )
    }
}

/// Ephemeral analysis of a page; recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    /// Top-left cell of every widget, conflicting or not.
    pub positions: HashMap<String, Cell>,
    /// Widgets that landed on a cell already claimed by a larger (or earlier
    /// equal-area) widget. The first occupant is never listed.
    pub conflicts: Vec<String>,
    /// Unoccupied cells in row-major order.
    pub gaps: Vec<Cell>,
}

/// Builds an occupancy grid and reports conflicts and gaps.
///
/// Widgets are processed largest area first; the sort is stable so ties keep
/// input order. Footprint cells outside `rows × cols` are ignored. Both
/// dimensions are clamped to [`MAX_GRID_DIMENSION`].
pub fn compute_layout(widgets: &[GridWidget], rows: u32, cols: u32) -> LayoutResult {
    let rows = rows.min(MAX_GRID_DIMENSION);
    let cols = cols.min(MAX_GRID_DIMENSION);
    let mut ordered: Vec<&GridWidget> = widgets.iter().collect();
    ordered.sort_by_key(|widget| Reverse(widget.placement.area()));

    let rows_i = i64::from(rows);
    let cols_i = i64::from(cols);
    let mut occupied = vec![vec![false; cols as usize]; rows as usize];
    let mut result = LayoutResult::default();

    for widget in ordered {
        let p = widget.placement;
        let row_range = i64::from(p.row).max(0)..p.bottom().min(rows_i);
        let col_range = i64::from(p.col).max(0)..p.right().min(cols_i);

        let mut conflicted = false;
        for r in row_range {
            for c in col_range.clone() {
                let cell = &mut occupied[r as usize][c as usize];
                if *cell {
                    conflicted = true;
                } else {
                    *cell = true;
                }
            }
        }

        if conflicted {
            result.conflicts.push(widget.id.clone());
        }
        result
            .positions
            .insert(widget.id.clone(), Cell::new(p.row, p.col));
    }

    for (r, row) in occupied.iter().enumerate() {
        for (c, taken) in row.iter().enumerate() {
            if !taken {
                result.gaps.push(Cell::new(r as i32, c as i32));
            }
        }
    }

    result
}

/// [`compute_layout`] memoised under the page's layout key.
///
/// The key does not cover widget geometry: call
/// [`ComputationCache::invalidate_page_layouts`] after any committed move.
pub fn compute_page_layout(
    cache: &ComputationCache<LayoutResult>,
    page: &Page,
    widgets: &[GridWidget],
) -> LayoutResult {
    let config = grid::grid_config(page);
    cache.cache_grid_layout(&page.id, config.rows, config.cols, || {
        compute_layout(widgets, config.rows, config.cols)
    })
}
