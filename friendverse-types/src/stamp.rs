//! Hybrid update stamps for last-writer-wins ordering.
//!
//! A stamp combines wall-clock milliseconds with a logical counter so that
//! two edits made within the same millisecond on one device still order
//! deterministically. Every synced entity carries one; "no timestamp" is
//! not a representable state.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A hybrid update stamp.
///
/// Consists of:
/// - `millis`: Milliseconds since Unix epoch (physical component)
/// - `seq`: Logical counter for edits at the same wall time
///
/// Stamps order lexicographically by `(millis, seq)`. Unlike a full hybrid
/// logical clock there is no receive rule; stamps only order revisions of
/// one entity, they do not track causality across devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Physical time component (milliseconds since Unix epoch).
    millis: u64,
    /// Logical counter for edits at the same wall time.
    seq: u32,
}

impl Stamp {
    /// Creates a stamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_millis() as u64;

        Self { millis, seq: 0 }
    }

    /// Creates a stamp from components.
    #[must_use]
    pub const fn new(millis: u64, seq: u32) -> Self {
        Self { millis, seq }
    }

    /// Returns the wall time component.
    #[must_use]
    pub const fn millis(&self) -> u64 {
        self.millis
    }

    /// Returns the logical counter.
    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }

    /// Generates the next stamp, strictly greater than this one.
    ///
    /// Call this when recording a new revision of an entity: either the
    /// wall clock has advanced, or the counter bumps within the same
    /// millisecond. Clock regressions cannot produce an older stamp.
    #[must_use]
    pub fn tick(&self) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_millis() as u64;

        if now > self.millis {
            Self {
                millis: now,
                seq: 0,
            }
        } else {
            Self {
                millis: self.millis,
                seq: self.seq.saturating_add(1),
            }
        }
    }
}

impl Default for Stamp {
    fn default() -> Self {
        Self::now()
    }
}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.millis.cmp(&other.millis) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            other => other,
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.millis, self.seq)
    }
}
