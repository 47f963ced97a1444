//! Read side of the reply tree.
//!
//! Sorting a post's replies by `path` yields a depth-first pre-order traversal in which every
//! reply follows its parent and siblings appear in creation order. The other projections are
//! derived from that sequence in memory.

use std::collections::HashMap;

use tracing::debug;

use crate::entities::reply::Reply;
use crate::interfaces::repositories::post::PostsRepositoryInterface;
use crate::interfaces::repositories::reply::RepliesRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::models::view::reply::{ListOptions, ReplyNode, ReplyThread};

pub struct ThreadProjector<'a, R, P>
where
    R: RepliesRepositoryInterface + Sync,
    P: PostsRepositoryInterface + Sync,
{
    replies_repository: &'a R,
    posts_repository: &'a P,
}

impl<'a, R, P> ThreadProjector<'a, R, P>
where
    R: RepliesRepositoryInterface + Sync,
    P: PostsRepositoryInterface + Sync,
{
    pub fn new(replies_repository: &'a R, posts_repository: &'a P) -> Self {
        Self {
            replies_repository,
            posts_repository,
        }
    }

    pub async fn list(&self, post_id: &str, options: &ListOptions) -> AppResult<Vec<Reply>> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(AppError::Validation {
                field: "post_id".to_string(),
                description: "postId is required".to_string(),
            });
        }
        if !self.posts_repository.exists(post_id).await? {
            return Err(AppError::PostNotFound {
                id: post_id.to_string(),
            });
        }

        let mut replies = self.replies_repository.get_by_post(post_id).await?;
        sort_by_path(&mut replies);
        let replies = filter(replies, options);
        debug!(post_id, count = replies.len(), "replies listed");
        Ok(replies)
    }
}

/// Stable byte-wise ordering by `path`.
pub fn sort_by_path(replies: &mut [Reply]) {
    replies.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
}

pub fn filter(replies: Vec<Reply>, options: &ListOptions) -> Vec<Reply> {
    if options.include_deleted {
        return replies;
    }
    replies.into_iter().filter(|r| !r.deleted).collect()
}

/// Groups path-ordered replies by thread. Threads are ordered by their root's `created_at`;
/// when the root itself is hidden the first visible item stands in for it.
pub fn threads(replies: &[Reply]) -> Vec<ReplyThread> {
    let mut order: Vec<&str> = vec![];
    let mut by_thread: HashMap<&str, Vec<Reply>> = HashMap::new();
    for reply in replies {
        let items = by_thread.entry(reply.thread_id.as_str()).or_default();
        if items.is_empty() {
            order.push(reply.thread_id.as_str());
        }
        items.push(reply.clone());
    }

    let mut threads: Vec<ReplyThread> = order
        .into_iter()
        .filter_map(|thread_id| {
            let mut items = by_thread.remove(thread_id)?;
            sort_by_path(&mut items);
            let root = items
                .iter()
                .find(|r| r.is_root() && r.depth == 0)
                .or_else(|| items.first())?
                .clone();
            Some(ReplyThread {
                thread_id: thread_id.to_string(),
                root,
                items,
            })
        })
        .collect();
    threads.sort_by(|a, b| a.root.created_at.cmp(&b.root.created_at));
    threads
}

/// Builds the nested tree in one pass over a path-ordered sequence. A reply whose parent is
/// not in the sequence hangs off its nearest present ancestor, or becomes a top-level node.
pub fn nest(replies: &[Reply]) -> Vec<ReplyNode> {
    let mut roots: Vec<ReplyNode> = vec![];
    let mut stack: Vec<ReplyNode> = vec![];

    for reply in replies {
        while let Some(top) = stack.last() {
            if top.reply.is_ancestor_of(reply) {
                break;
            }
            if let Some(done) = stack.pop() {
                attach(&mut stack, &mut roots, done);
            }
        }
        stack.push(ReplyNode::new(reply.clone()));
    }
    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut roots, done);
    }
    roots
}

fn attach(stack: &mut [ReplyNode], roots: &mut Vec<ReplyNode>, node: ReplyNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Live direct-child counts over the given replies, unlike the stored `reply_count` which
/// also counts children that were deleted or filtered out.
pub fn direct_reply_counts(replies: &[Reply]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for parent_id in replies.iter().filter_map(|r| r.parent_id.as_ref()) {
        *counts.entry(parent_id.clone()).or_insert(0) += 1;
    }
    counts
}
