//! Viewport virtualization for very long lists
//!
//! This crate maps a scroll position onto the range of absolute item indices
//! that are visible (plus an overscan margin), so that only those rows need
//! rendering. The sync engine consumes the resulting `VisibleRange` and tells
//! the virtualizer the collection's total count whenever it changes.

mod config;
mod virtualizer;

pub use config::*;
pub use virtualizer::*;
