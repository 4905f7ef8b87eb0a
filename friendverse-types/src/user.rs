//! Member accounts.

use crate::{Stamp, UserId};
use serde::{Deserialize, Serialize};

/// Role attached to a member account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can manage members and shared configuration.
    Admin,
    /// Regular member.
    #[default]
    User,
}

/// A member of the friend group.
///
/// Credentials are not part of this record; they travel separately as an
/// opaque map keyed by user id and are never inspected by the sync core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub display_name: String,
    /// Date of birth, ISO-8601 calendar date.
    pub birthdate: String,
    /// Inline avatar, a URL or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    /// Revision stamp, bumped on every edit to this record.
    pub updated_at: Stamp,
}

impl User {
    /// Returns true if this account can administer the group.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
