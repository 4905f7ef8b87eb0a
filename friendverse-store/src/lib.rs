//! Local persistence and device identity for FriendVerse.
//!
//! This crate owns the canonical local copy of the shared data. A flat
//! string key/value [`StorageBackend`] (file-per-key on disk, or an
//! in-memory map) holds one record per collection, and [`LocalStore`]
//! layers typed JSON access, snapshot assembly and the device identity on
//! top of it.
//!
//! Failure posture follows the durable-browser-storage model this layer
//! stands in for: reads treat corrupt records as absent, writes are
//! best-effort and log instead of failing the caller. The rest of the
//! engine keeps working off whatever local state is readable.

mod backend;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use store::LocalStore;

/// Result type alias using the crate's error type.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur at the storage backend boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}
