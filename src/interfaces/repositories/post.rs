use async_trait::async_trait;

use crate::{
    database::query_builder::SurrealQueryBuilder, entities::post::Post,
    middleware::error::AppResult,
};

/// The narrow view of the post store that replies depend on.
#[async_trait]
pub trait PostsRepositoryInterface {
    async fn create(&self, title: &str) -> AppResult<Post>;
    async fn get(&self, post_id: &str) -> AppResult<Post>;
    async fn exists(&self, post_id: &str) -> AppResult<bool>;

    /// Defines `$post_rec` and aborts the transaction when the post is missing.
    fn build_require_query(&self, query: SurrealQueryBuilder, post_id: &str)
        -> SurrealQueryBuilder;

    /// Bumps the post's reply aggregate; needs `$post_rec` and `$now`.
    fn build_reply_added_query(&self, query: SurrealQueryBuilder) -> SurrealQueryBuilder;
}
