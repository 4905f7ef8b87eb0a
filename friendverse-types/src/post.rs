//! Feed posts with their attachments, likes and comments.

use crate::{PostId, Stamp, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media kind of a post attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
}

/// A media attachment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// A like on a post. One per member; identified by the liking user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLike {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub id: String,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A feed post.
///
/// Likes and comments are embedded: the post is the unit of merge, and the
/// newer revision carries its whole interaction state. Counts are derived,
/// never stored, so they cannot drift from the embedded lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<PostAttachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likes: Vec<PostLike>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<PostComment>,
    pub created_at: DateTime<Utc>,
    /// Revision stamp, bumped on every edit including likes and comments.
    pub updated_at: Stamp,
}

impl Post {
    /// Number of comments on this post.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Number of likes on this post.
    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Returns true if the given member has liked this post.
    #[must_use]
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likes.iter().any(|l| &l.user_id == user_id)
    }
}
