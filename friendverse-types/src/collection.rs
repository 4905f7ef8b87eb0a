//! Keys naming the synced top-level collections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A synced top-level collection of the shared document.
///
/// These are the only fields the sync engine moves; each one merges and
/// notifies independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Users,
    Passwords,
    Events,
    Posts,
    UserAvatars,
}

impl Collection {
    /// Every synced collection, in document field order.
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Passwords,
        Collection::Events,
        Collection::Posts,
        Collection::UserAvatars,
    ];

    /// The collection's field name in the shared document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Passwords => "passwords",
            Collection::Events => "events",
            Collection::Posts => "posts",
            Collection::UserAvatars => "userAvatars",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
