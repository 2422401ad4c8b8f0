//! Error types for the sync engine.

use remote_source::RemoteError;
use std::time::Duration;
use thiserror::Error;
use window_model::WindowError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing the window.
///
/// None of these is fatal: a failed fetch leaves the window unchanged and the
/// next re-evaluation retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The remote query failed.
    #[error("Remote query failed: {0}")]
    Remote(#[from] RemoteError),

    /// The remote query did not resolve in time.
    #[error("Remote query timed out after {0:?}")]
    Timeout(Duration),

    /// The remote returned a slice violating the window invariants.
    #[error("Invalid fetch result: {0}")]
    InvalidResult(#[from] WindowError),

    /// The task running the query stopped before producing a result.
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),

    /// Diagnostic export could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::Remote(RemoteError::Offline);
        assert_eq!(err.to_string(), "Remote query failed: Remote is offline");

        let err = SyncError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "Remote query timed out after 500ms");
    }

    #[test]
    fn test_window_error_conversion() {
        let err: SyncError = WindowError::ExceedsTotal {
            offset: 1,
            len: 2,
            total: 2,
        }
        .into();
        assert!(matches!(err, SyncError::InvalidResult(_)));
    }
}
