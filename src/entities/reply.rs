use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A reply in a post's thread tree.
///
/// `path`, `depth`, `parent_id` and `thread_id` are written once at creation; only
/// `content`, `deleted`, `like_count`, `reply_count` and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub thread_id: String,
    pub depth: u8,
    pub path: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub deleted: bool,
    pub like_count: u32,
    /// Direct children ever created; soft deletion never lowers it.
    pub reply_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reply {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// True when `other` sits somewhere below `self` in the same thread.
    pub fn is_ancestor_of(&self, other: &Reply) -> bool {
        other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && other.path.as_bytes()[self.path.len()] == b'/'
    }
}

pub const REPLY_SELECT_FIELDS: &str = "record::id(id) AS id, post_id, parent_id, thread_id, depth, path, author_id, author_name, content, deleted, like_count, reply_count, created_at, updated_at";

/// Input for a new reply after trimming; `parent_id` of `None` starts a new thread.
#[derive(Debug, Clone, Validate)]
pub struct CreateReply {
    #[validate(length(min = 1, message = "postId is required"))]
    pub post_id: String,
    pub parent_id: Option<String>,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "authorId is required"))]
    pub author_id: String,
    #[validate(length(min = 1, message = "authorName is required"))]
    pub author_name: String,
}

impl CreateReply {
    pub fn new(
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
        author_id: &str,
        author_name: &str,
    ) -> Self {
        Self {
            post_id: post_id.trim().to_string(),
            parent_id: parent_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            content: content.trim().to_string(),
            author_id: author_id.trim().to_string(),
            author_name: author_name.trim().to_string(),
        }
    }
}

/// Per-parent sequence used only to allocate the next child's path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyCounter {
    pub post_id: String,
    pub parent_id: String,
    pub next: u32,
}
