//! Whole-document merge over every synced collection.

use crate::{MergeResult, MergeSummary, merge_by_id, merge_maps};
use friendverse_types::{Collection, Snapshot};
use std::collections::BTreeMap;
use tracing::debug;

/// The result of merging two documents.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMerge {
    /// The combined document.
    pub snapshot: Snapshot,
    /// Collections whose merged contents differ from the local input, in
    /// document field order. These are the ones worth writing back and
    /// announcing.
    pub changed: Vec<Collection>,
    /// Per-collection outcome counters for the entity collections.
    pub summaries: BTreeMap<Collection, MergeSummary>,
}

impl SnapshotMerge {
    /// Total equal-stamp collisions across all collections.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.summaries.values().map(|s| s.conflicts).sum()
    }
}

/// Merges two documents collection by collection.
///
/// Entity collections merge by id, keyed maps by key union with the remote
/// value winning. The merged metadata carries the newer of the two
/// `last_updated` marks and the local origin; the caller stamps fresh
/// metadata if it writes the result anywhere.
pub fn merge_snapshots(local: &Snapshot, remote: &Snapshot) -> MergeResult<SnapshotMerge> {
    let users = merge_by_id(local.users.clone(), remote.users.clone())?;
    let events = merge_by_id(local.events.clone(), remote.events.clone())?;
    let posts = merge_by_id(local.posts.clone(), remote.posts.clone())?;
    let passwords = merge_maps(local.passwords.clone(), remote.passwords.clone());
    let user_avatars = merge_maps(local.user_avatars.clone(), remote.user_avatars.clone());

    let mut changed = Vec::new();
    if users.items != local.users {
        changed.push(Collection::Users);
    }
    if passwords != local.passwords {
        changed.push(Collection::Passwords);
    }
    if events.items != local.events {
        changed.push(Collection::Events);
    }
    if posts.items != local.posts {
        changed.push(Collection::Posts);
    }
    if user_avatars != local.user_avatars {
        changed.push(Collection::UserAvatars);
    }

    let mut summaries = BTreeMap::new();
    for (collection, summary) in [
        (Collection::Users, users.summary),
        (Collection::Events, events.summary),
        (Collection::Posts, posts.summary),
    ] {
        debug!(
            %collection,
            added = summary.added,
            replaced = summary.replaced,
            kept = summary.kept,
            conflicts = summary.conflicts,
            "merged collection"
        );
        summaries.insert(collection, summary);
    }

    let snapshot = Snapshot {
        users: users.items,
        passwords,
        events: events.items,
        posts: posts.items,
        user_avatars,
        last_updated: local.last_updated.max(remote.last_updated),
        origin_device_id: local.origin_device_id,
    };

    Ok(SnapshotMerge {
        snapshot,
        changed,
        summaries,
    })
}
