use tracing::debug;
use validator::Validate;

use crate::access::reply::ReplyAccess;
use crate::database::query_builder::SurrealQueryBuilder;
use crate::database::repositories::{post::PostsRepository, reply::RepliesRepository};
use crate::entities::reply::{CreateReply, Reply};
use crate::interfaces::repositories::post::PostsRepositoryInterface;
use crate::interfaces::repositories::reply::RepliesRepositoryInterface;
use crate::middleware::ctx::Actor;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::mw_ctx::CtxState;
use crate::models::view::reply::ListOptions;
use crate::services::path_allocator::{generate_reply_id, PathAllocator};
use crate::services::retry::RetryConfig;
use crate::services::thread_projector::ThreadProjector;

#[derive(Debug, Validate)]
struct ContentInput {
    #[validate(length(min = 1, message = "content is required"))]
    content: String,
}

pub struct ReplyService<'a, R, P>
where
    R: RepliesRepositoryInterface + Sync,
    P: PostsRepositoryInterface + Sync,
{
    replies_repository: &'a R,
    posts_repository: &'a P,
    allocator: PathAllocator,
    access: &'a ReplyAccess,
    retry: &'a RetryConfig,
}

impl<'a, R, P> ReplyService<'a, R, P>
where
    R: RepliesRepositoryInterface + Sync,
    P: PostsRepositoryInterface + Sync,
{
    pub fn new(
        replies_repository: &'a R,
        posts_repository: &'a P,
        max_depth: u8,
        access: &'a ReplyAccess,
        retry: &'a RetryConfig,
    ) -> Self {
        Self {
            replies_repository,
            posts_repository,
            allocator: PathAllocator::new(max_depth),
            access,
            retry,
        }
    }

    pub async fn create(&self, input: CreateReply) -> AppResult<Reply> {
        input.validate()?;

        let reply = self
            .retry
            .run("create_reply", || self.try_create(&input))
            .await?;

        debug!(
            post_id = %reply.post_id,
            reply_id = %reply.id,
            path = %reply.path,
            depth = reply.depth,
            "reply created"
        );
        Ok(reply)
    }

    /// A single attempt: allocation, insert and every aggregate update commit together.
    async fn try_create(&self, input: &CreateReply) -> AppResult<Reply> {
        let query = SurrealQueryBuilder::begin_transaction();
        let query = self
            .posts_repository
            .build_require_query(query, &input.post_id);

        let (query, reply_id) = match input.parent_id.as_deref() {
            None => {
                let allocation = self.allocator.allocate_root();
                let query = self.allocator.build_root_query(query, &allocation);
                (query, allocation.id)
            }
            Some(parent_id) => {
                let reply_id = generate_reply_id();
                let query = self
                    .allocator
                    .build_child_query(query, &reply_id, parent_id);
                (query, reply_id)
            }
        };

        let mut query = self.replies_repository.build_insert_query(query, input);
        if input.parent_id.is_some() {
            query = self
                .replies_repository
                .build_parent_reply_added_query(query);
        }
        let query = self.posts_repository.build_reply_added_query(query);

        self.replies_repository
            .commit_create(query, input, &reply_id, self.allocator.max_depth)
            .await
    }

    pub async fn patch(
        &self,
        post_id: &str,
        reply_id: &str,
        content: &str,
        actor: &Actor,
    ) -> AppResult<Reply> {
        let content = content.trim();
        ContentInput {
            content: content.to_string(),
        }
        .validate()?;
        let (post_id, reply_id) = self.check_mutation(post_id, reply_id, actor).await?;

        let reply = self
            .retry
            .run("patch_reply", || {
                self.replies_repository
                    .update_content(post_id, reply_id, content)
            })
            .await?;

        debug!(post_id, reply_id, actor_id = %actor.id, "reply patched");
        Ok(reply)
    }

    pub async fn soft_delete(
        &self,
        post_id: &str,
        reply_id: &str,
        actor: &Actor,
    ) -> AppResult<Reply> {
        let (post_id, reply_id) = self.check_mutation(post_id, reply_id, actor).await?;

        let reply = self
            .retry
            .run("delete_reply", || {
                self.replies_repository.soft_delete(post_id, reply_id)
            })
            .await?;

        debug!(post_id, reply_id, actor_id = %actor.id, "reply soft deleted");
        Ok(reply)
    }

    pub async fn list(&self, post_id: &str, options: &ListOptions) -> AppResult<Vec<Reply>> {
        ThreadProjector::new(self.replies_repository, self.posts_repository)
            .list(post_id, options)
            .await
    }

    /// Identity, existence and ownership checks shared by patch and delete. The deleted
    /// state is checked later, inside the write transaction.
    async fn check_mutation<'b>(
        &self,
        post_id: &'b str,
        reply_id: &'b str,
        actor: &Actor,
    ) -> AppResult<(&'b str, &'b str)> {
        let post_id = post_id.trim();
        let reply_id = reply_id.trim();
        if post_id.is_empty() {
            return Err(required("post_id", "postId is required"));
        }
        if reply_id.is_empty() {
            return Err(required("reply_id", "replyId is required"));
        }
        if actor.is_anonymous() {
            return Err(AppError::AuthenticationFail);
        }

        let reply = self.replies_repository.get(post_id, reply_id).await?;
        if !self.access.can_edit(actor, &reply.author_id) {
            debug!(post_id, reply_id, actor_id = %actor.id, "reply mutation forbidden");
            return Err(AppError::Forbidden);
        }
        Ok((post_id, reply_id))
    }
}

fn required(field: &str, description: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        description: description.to_string(),
    }
}

impl<'a> ReplyService<'a, RepliesRepository, PostsRepository> {
    pub fn from_state(state: &'a CtxState) -> Self {
        Self::new(
            &state.db.replies,
            &state.db.posts,
            state.reply_max_depth,
            &state.reply_access,
            &state.retry,
        )
    }
}
