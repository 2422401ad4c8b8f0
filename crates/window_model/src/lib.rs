//! Window Model - Core types for windowed synchronization of a remote list
//!
//! This crate provides the data model shared by the remote source, the
//! viewport virtualizer and the sync engine: item identity, visible index
//! ranges, fetch results and the cached window that maps absolute indices
//! of the remote collection onto a locally held slice.

mod error;
mod item;
mod range;
mod shared;
mod window;

pub use error::*;
pub use item::*;
pub use range::*;
pub use shared::*;
pub use window::*;
