//! Error types for window model operations

use crate::ItemId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("Slice exceeds collection: offset {offset} + {len} items > total {total}")]
    ExceedsTotal {
        offset: usize,
        len: usize,
        total: usize,
    },

    #[error("Duplicate item id in slice: {0}")]
    DuplicateId(ItemId),
}

pub type WindowResult<T> = std::result::Result<T, WindowError>;
