//! Identity-keyed last-writer-wins merge.

use crate::{MergeError, MergeResult};
use friendverse_types::{Event, Post, Stamp, User};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// An entity that can take part in a by-id merge.
///
/// Every synced entity exposes a stable identity and the stamp of its
/// latest revision. The merge never looks inside the payload beyond
/// equality; resolution is by stamp alone.
pub trait Keyed {
    /// Stable identity of this entity.
    fn id(&self) -> &str;

    /// Stamp of the latest revision.
    fn updated_at(&self) -> Stamp;
}

impl Keyed for User {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn updated_at(&self) -> Stamp {
        self.updated_at
    }
}

impl Keyed for Event {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn updated_at(&self) -> Stamp {
        self.updated_at
    }
}

impl Keyed for Post {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn updated_at(&self) -> Stamp {
        self.updated_at
    }
}

/// Outcome counters for one collection merge.
///
/// `added + replaced + kept` equals the merged item count. Conflicts are
/// contested entities whose stamps tied with differing payloads; those are
/// kept on the local side and counted here for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Entities only the remote side had.
    pub added: usize,
    /// Contested entities where the remote revision was strictly newer.
    pub replaced: usize,
    /// Entities that stayed local: uncontested ones plus contested ones
    /// where the local revision won.
    pub kept: usize,
    /// Equal-stamp collisions with differing payloads (subset of `kept`).
    pub conflicts: usize,
}

/// The result of merging one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<T> {
    /// The combined collection: local ordering first, remote-only entities
    /// appended in remote order.
    pub items: Vec<T>,
    /// What happened to get there.
    pub summary: MergeSummary,
}

/// Merges two copies of an identity-keyed collection.
///
/// The union contains every id from either side exactly once. For an id
/// present on both sides the strictly newer revision wins; on an exact
/// stamp tie the local revision is kept. Either input containing the same
/// id twice is malformed and rejected.
///
/// Merging is idempotent (`merge(a, a) == a`) and an empty side returns
/// the other side unchanged.
pub fn merge_by_id<T>(local: Vec<T>, remote: Vec<T>) -> MergeResult<Merged<T>>
where
    T: Keyed + Clone + PartialEq,
{
    check_unique(&local)?;
    check_unique(&remote)?;

    if local.is_empty() {
        let summary = MergeSummary {
            added: remote.len(),
            ..Default::default()
        };
        return Ok(Merged {
            items: remote,
            summary,
        });
    }
    if remote.is_empty() {
        let summary = MergeSummary {
            kept: local.len(),
            ..Default::default()
        };
        return Ok(Merged {
            items: local,
            summary,
        });
    }

    let mut items = local;
    let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        index.insert(item.id().to_owned(), i);
    }

    let mut summary = MergeSummary {
        kept: items.len(),
        ..Default::default()
    };

    for incoming in remote {
        match index.get(incoming.id()) {
            Some(&i) => match incoming.updated_at().cmp(&items[i].updated_at()) {
                Ordering::Greater => {
                    items[i] = incoming;
                    summary.replaced += 1;
                    summary.kept -= 1;
                }
                Ordering::Less => {}
                Ordering::Equal => {
                    if items[i] != incoming {
                        warn!(
                            id = incoming.id(),
                            stamp = %incoming.updated_at(),
                            "equal-stamp collision with differing payloads, keeping local revision"
                        );
                        summary.conflicts += 1;
                    }
                }
            },
            None => {
                index.insert(incoming.id().to_owned(), items.len());
                items.push(incoming);
                summary.added += 1;
            }
        }
    }

    Ok(Merged { items, summary })
}

/// Merges two maps by key union, the remote value winning per key.
///
/// Used for the keyed side collections (credential blobs, avatars), whose
/// values carry no revision stamps of their own.
#[must_use]
pub fn merge_maps<K, V>(local: BTreeMap<K, V>, remote: BTreeMap<K, V>) -> BTreeMap<K, V>
where
    K: Ord,
{
    let mut merged = local;
    merged.extend(remote);
    merged
}

fn check_unique<T: Keyed>(items: &[T]) -> MergeResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(MergeError::DuplicateId {
                id: item.id().to_owned(),
            });
        }
    }
    Ok(())
}
