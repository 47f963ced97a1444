use serde::{Deserialize, Serialize};

use crate::entities::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListOptions {
    /// Soft-deleted replies keep their place in the list unless this is cleared; the
    /// descendants of a hidden reply are always kept.
    #[serde(default = "include_deleted_default")]
    pub include_deleted: bool,
}

fn include_deleted_default() -> bool {
    true
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            include_deleted: include_deleted_default(),
        }
    }
}

/// One root reply with everything below it, in path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyThread {
    pub thread_id: String,
    pub root: Reply,
    pub items: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: Reply,
    pub children: Vec<ReplyNode>,
}

impl ReplyNode {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            children: vec![],
        }
    }
}
