//! Time-stamped memoisation for expensive layout and collision work.
//!
//! Entries expire after a TTL; expiry is a performance knob only and must
//! not be relied on for freshness after a committed move. Invalidate the
//! affected widget or page instead.

mod core;
mod memo;

pub use core::{CacheStats, ComputationCache, layout_key, widget_key};
pub use memo::{KeyGenerator, MemoOptions, Memoized, memoize};
