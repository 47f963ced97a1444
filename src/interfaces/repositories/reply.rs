use async_trait::async_trait;

use crate::{
    database::query_builder::SurrealQueryBuilder,
    entities::reply::{CreateReply, Reply, ReplyCounter},
    middleware::error::AppResult,
};

#[async_trait]
pub trait RepliesRepositoryInterface {
    /// Inserts the reply using the allocation variables already defined in `query`.
    fn build_insert_query(
        &self,
        query: SurrealQueryBuilder,
        input: &CreateReply,
    ) -> SurrealQueryBuilder;

    /// Bumps the direct parent's `reply_count`; needs `$parent_rec`.
    fn build_parent_reply_added_query(&self, query: SurrealQueryBuilder) -> SurrealQueryBuilder;

    /// Runs a composed create transaction and returns the stored reply.
    async fn commit_create(
        &self,
        query: SurrealQueryBuilder,
        input: &CreateReply,
        reply_id: &str,
        max_depth: u8,
    ) -> AppResult<Reply>;

    async fn update_content(&self, post_id: &str, reply_id: &str, content: &str)
        -> AppResult<Reply>;
    async fn soft_delete(&self, post_id: &str, reply_id: &str) -> AppResult<Reply>;
    async fn get(&self, post_id: &str, reply_id: &str) -> AppResult<Reply>;
    async fn get_by_post(&self, post_id: &str) -> AppResult<Vec<Reply>>;
    async fn get_counter(&self, post_id: &str, parent_id: &str) -> AppResult<Option<ReplyCounter>>;
}
