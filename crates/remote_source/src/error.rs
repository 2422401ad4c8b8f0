//! Error types for remote collection queries.

use thiserror::Error;
use window_model::ItemId;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors a remote collection can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote is switched offline.
    #[error("Remote is offline")]
    Offline,

    /// A failure injected by a test harness.
    #[error("Injected failure on query {query}")]
    Injected { query: u64 },

    /// A mutation addressed an index outside the collection.
    #[error("Index {index} out of bounds for collection of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A mutation would give two items the same id.
    #[error("Item {0} already exists in the collection")]
    DuplicateId(ItemId),
}
