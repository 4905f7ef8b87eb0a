//! Last-writer-wins merge engine for FriendVerse collections.
//!
//! This crate decides, given two copies of the shared data, what the
//! combined copy looks like. It is pure: no I/O, no clocks, no storage.
//!
//! - [`merge_by_id`] — identity-keyed union of two entity lists, the
//!   strictly newer revision winning per entity
//! - [`merge_maps`] — key union of two maps, remote value winning per key
//! - [`merge_snapshots`] — per-collection composition over whole documents
//!
//! For any two inputs the result is deterministic, and merging is
//! idempotent: merging a document into itself changes nothing. The unit of
//! resolution is the entity; nested lists (wishes, likes, comments) travel
//! with their parent and are replaced wholesale by the winning revision.

mod engine;
mod snapshot;

pub use engine::{Keyed, MergeSummary, Merged, merge_by_id, merge_maps};
pub use snapshot::{SnapshotMerge, merge_snapshots};

/// Result type alias using the crate's error type.
pub type MergeResult<T> = std::result::Result<T, MergeError>;

/// Errors that can occur while merging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// An input carried the same entity id more than once. Such a
    /// collection has no well-defined by-id union; the caller should treat
    /// the document as malformed and keep its current state.
    #[error("duplicate id in collection: {id}")]
    DuplicateId { id: String },
}
