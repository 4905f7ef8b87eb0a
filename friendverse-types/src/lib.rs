//! Core type definitions for the FriendVerse sync engine.
//!
//! This crate defines the plain data types shared by every layer of the
//! sync core:
//! - Device and entity identifiers
//! - Hybrid update stamps (wall-clock millis + logical counter)
//! - Domain entities (users, events, posts) with their nested collections
//! - The `Snapshot` / `SnapshotPatch` exchange documents
//! - The `Collection` keys naming the synced top-level fields
//!
//! Everything here is pure data: no I/O, no merge policy, no transport.
//! Those live in `friendverse-merge`, `friendverse-store` and
//! `friendverse-sync`.

mod collection;
mod event;
mod ids;
mod post;
mod snapshot;
mod stamp;
mod user;

pub use collection::Collection;
pub use event::{Event, EventType, Wish};
pub use ids::{DeviceId, EventId, PostId, UserId};
pub use post::{AttachmentKind, Post, PostAttachment, PostComment, PostLike};
pub use snapshot::{Snapshot, SnapshotPatch};
pub use stamp::Stamp;
pub use user::{User, UserRole};
