//! Layout analyzer.
//!
//! Works purely in grid-cell space: occupancy, overlap conflicts and free
//! gaps for a page, plus pairwise collision sets. Malformed geometry is
//! clipped to the grid, never rejected.

mod analyzer;
mod collisions;

pub use analyzer::{GridWidget, LayoutResult, compute_layout, compute_page_layout};
pub use collisions::{
    COLLISION_CACHE_TTL, CollisionDetector, CollisionMap, collision_key, detect_collisions,
};
