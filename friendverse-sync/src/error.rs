//! Error types for the sync layer.

use friendverse_merge::MergeError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The remote document could not be merged.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,
}
