//! Grid geometry engine.
//!
//! Pure functions converting absolute pixel rectangles to and from a page's
//! logical grid, clamping them inside the page margins and optionally
//! snapping them to cell boundaries. Every function is total: degenerate
//! inputs clamp instead of failing.

mod core;

pub use core::{
    available_space, constrain_to_margins, grid_config, snap_to_grid_with_margins, to_placement,
    to_position,
};
