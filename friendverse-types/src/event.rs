//! Calendar events and their wishes.

use crate::{EventId, Stamp, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Birthday,
    Anniversary,
    Trip,
    Meeting,
    Other,
}

/// A wish left on an event by a member.
///
/// Wishes travel inside their event; the event is the unit of merge, so a
/// newer revision of the event replaces the whole wish list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    pub id: String,
    pub content: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A shared calendar event: birthday, anniversary, trip, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Date of the occasion, ISO-8601 calendar date.
    pub date: String,
    pub description: String,
    pub event_type: EventType,
    pub created_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Cover image, a URL or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wishes: Vec<Wish>,
    /// Revision stamp, bumped on every edit to this record.
    pub updated_at: Stamp,
}

impl Event {
    /// Returns the wish with the given id, if present.
    #[must_use]
    pub fn wish(&self, id: &str) -> Option<&Wish> {
        self.wishes.iter().find(|w| w.id == id)
    }
}
