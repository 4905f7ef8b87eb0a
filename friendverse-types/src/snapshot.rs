//! The exchange documents moved between local storage and remote stores.

use crate::{Collection, DeviceId, Event, Post, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full shared document: every synced collection plus write metadata.
///
/// `last_updated` and `origin_device_id` describe the most recent write to
/// the remote copy; readers use them to skip documents they produced
/// themselves and documents they have already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    /// Opaque credential blobs keyed by user id. Never inspected here;
    /// hashing and verification belong to the auth layer.
    #[serde(default)]
    pub passwords: BTreeMap<UserId, String>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub posts: Vec<Post>,
    /// Avatar URLs or data URIs keyed by user id.
    #[serde(default)]
    pub user_avatars: BTreeMap<UserId, String>,
    /// When the remote copy was last written.
    pub last_updated: DateTime<Utc>,
    /// Which device performed that write.
    pub origin_device_id: DeviceId,
}

impl Snapshot {
    /// Creates an empty document originating from the given device.
    #[must_use]
    pub fn empty(origin: DeviceId) -> Self {
        Self {
            users: Vec::new(),
            passwords: BTreeMap::new(),
            events: Vec::new(),
            posts: Vec::new(),
            user_avatars: BTreeMap::new(),
            last_updated: Utc::now(),
            origin_device_id: origin,
        }
    }

    /// Returns true if every collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.passwords.is_empty()
            && self.events.is_empty()
            && self.posts.is_empty()
            && self.user_avatars.is_empty()
    }

    /// Replaces the collections the patch carries, leaving the rest alone.
    ///
    /// Replacement is shallow: a present field overwrites the whole
    /// collection. Metadata is untouched; the writer stamps it separately.
    pub fn apply_patch(&mut self, patch: SnapshotPatch) {
        if let Some(users) = patch.users {
            self.users = users;
        }
        if let Some(passwords) = patch.passwords {
            self.passwords = passwords;
        }
        if let Some(events) = patch.events {
            self.events = events;
        }
        if let Some(posts) = patch.posts {
            self.posts = posts;
        }
        if let Some(user_avatars) = patch.user_avatars {
            self.user_avatars = user_avatars;
        }
    }

    /// Marks this document as written now by the given device.
    pub fn stamp(&mut self, origin: DeviceId) {
        self.last_updated = Utc::now();
        self.origin_device_id = origin;
    }
}

/// A partial document: only the collections a writer wants to replace.
///
/// Absent fields mean "leave the remote value alone", so pushing a patch
/// for one collection cannot clobber the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passwords: Option<BTreeMap<UserId, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatars: Option<BTreeMap<UserId, String>>,
}

impl SnapshotPatch {
    /// Returns true if no collection is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_none()
            && self.passwords.is_none()
            && self.events.is_none()
            && self.posts.is_none()
            && self.user_avatars.is_none()
    }

    /// The collections this patch carries, in document field order.
    #[must_use]
    pub fn collections(&self) -> Vec<Collection> {
        let mut out = Vec::new();
        if self.users.is_some() {
            out.push(Collection::Users);
        }
        if self.passwords.is_some() {
            out.push(Collection::Passwords);
        }
        if self.events.is_some() {
            out.push(Collection::Events);
        }
        if self.posts.is_some() {
            out.push(Collection::Posts);
        }
        if self.user_avatars.is_some() {
            out.push(Collection::UserAvatars);
        }
        out
    }
}

impl From<Snapshot> for SnapshotPatch {
    /// A patch carrying every collection of the snapshot. Applying it
    /// replaces the whole remote document body.
    fn from(snapshot: Snapshot) -> Self {
        Self {
            users: Some(snapshot.users),
            passwords: Some(snapshot.passwords),
            events: Some(snapshot.events),
            posts: Some(snapshot.posts),
            user_avatars: Some(snapshot.user_avatars),
        }
    }
}
