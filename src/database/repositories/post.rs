use crate::database::client::Db;
use crate::database::query_builder::SurrealQueryBuilder;
use crate::database::surrdb_utils::THROW_POST_NOT_FOUND;
use crate::database::table_names::POST_TABLE_NAME;
use crate::entities::post::Post;
use crate::interfaces::repositories::post::PostsRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const POST_SELECT_FIELDS: &str =
    "record::id(id) AS id, title, reply_count, last_reply_at, created_at";

#[derive(Debug)]
pub struct PostsRepository {
    client: Arc<Db>,
}

impl PostsRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {POST_TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {POST_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS reply_count ON TABLE {POST_TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS last_reply_at ON TABLE {POST_TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {POST_TABLE_NAME} TYPE datetime DEFAULT time::now();
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }
}

#[async_trait]
impl PostsRepositoryInterface for PostsRepository {
    async fn create(&self, title: &str) -> AppResult<Post> {
        let id = Uuid::now_v7().to_string();
        let mut res = self
            .client
            .query(format!(
                "CREATE type::thing(\"{POST_TABLE_NAME}\", $id) SET title = $title;
                SELECT {POST_SELECT_FIELDS} FROM type::thing(\"{POST_TABLE_NAME}\", $id);"
            ))
            .bind(("id", id.clone()))
            .bind(("title", title.to_string()))
            .await?
            .check()?;
        let post = res.take::<Option<Post>>(1)?;
        post.ok_or(AppError::PostNotFound { id })
    }

    async fn get(&self, post_id: &str) -> AppResult<Post> {
        let mut res = self
            .client
            .query(format!(
                "SELECT {POST_SELECT_FIELDS} FROM type::thing(\"{POST_TABLE_NAME}\", $id);"
            ))
            .bind(("id", post_id.to_string()))
            .await?;
        let post = res.take::<Option<Post>>(0)?;
        post.ok_or(AppError::PostNotFound {
            id: post_id.to_string(),
        })
    }

    async fn exists(&self, post_id: &str) -> AppResult<bool> {
        let mut res = self
            .client
            .query(format!(
                "RETURN (SELECT id FROM type::thing(\"{POST_TABLE_NAME}\", $id))[0] != NONE;"
            ))
            .bind(("id", post_id.to_string()))
            .await?;
        Ok(res.take::<Option<bool>>(0)?.unwrap_or(false))
    }

    fn build_require_query(
        &self,
        query: SurrealQueryBuilder,
        post_id: &str,
    ) -> SurrealQueryBuilder {
        query
            .query(format!(
                "LET $post_rec = type::thing(\"{POST_TABLE_NAME}\", $post_id);
IF (SELECT id FROM $post_rec)[0] == NONE {{ THROW \"{THROW_POST_NOT_FOUND}\"; }};"
            ))
            .bind_var("post_id", post_id)
    }

    fn build_reply_added_query(&self, query: SurrealQueryBuilder) -> SurrealQueryBuilder {
        query.query("UPDATE $post_rec SET reply_count += 1, last_reply_at = $now;")
    }
}
