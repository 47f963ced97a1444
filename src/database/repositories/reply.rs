use crate::database::client::Db;
use crate::database::query_builder::SurrealQueryBuilder;
use crate::database::surrdb_utils::{
    check_transaction_custom_error, map_query_error, TxSubject, REPLY_PATH_INDEX, THROW_REPLY_DELETED,
    THROW_REPLY_NOT_FOUND,
};
use crate::database::table_names::{REPLY_COUNTER_TABLE_NAME, REPLY_TABLE_NAME};
use crate::entities::reply::{CreateReply, Reply, ReplyCounter, REPLY_SELECT_FIELDS};
use crate::interfaces::repositories::reply::RepliesRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct RepliesRepository {
    client: Arc<Db>,
}

impl RepliesRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {REPLY_TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS post_id ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE INDEX IF NOT EXISTS post_id_idx ON TABLE {REPLY_TABLE_NAME} COLUMNS post_id;
    DEFINE FIELD IF NOT EXISTS parent_id ON TABLE {REPLY_TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS thread_id ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS depth ON TABLE {REPLY_TABLE_NAME} TYPE int;
    DEFINE FIELD IF NOT EXISTS path ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE INDEX IF NOT EXISTS {REPLY_PATH_INDEX} ON TABLE {REPLY_TABLE_NAME} COLUMNS post_id, path UNIQUE;
    DEFINE FIELD IF NOT EXISTS author_id ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS author_name ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {REPLY_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS deleted ON TABLE {REPLY_TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS like_count ON TABLE {REPLY_TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS reply_count ON TABLE {REPLY_TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {REPLY_TABLE_NAME} TYPE datetime;
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {REPLY_TABLE_NAME} TYPE datetime;

    DEFINE TABLE IF NOT EXISTS {REPLY_COUNTER_TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS post_id ON TABLE {REPLY_COUNTER_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS parent_id ON TABLE {REPLY_COUNTER_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS next ON TABLE {REPLY_COUNTER_TABLE_NAME} TYPE int ASSERT $value >= 1;
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {REPLY_COUNTER_TABLE_NAME} TYPE datetime;
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    /// Shared read-check-write for content mutations: the reply must exist under the post
    /// and must not be soft-deleted yet.
    async fn mutate_content(
        &self,
        post_id: &str,
        reply_id: &str,
        set_clause: &str,
        content: &str,
    ) -> AppResult<Reply> {
        let subject = TxSubject {
            post_id,
            reply_id: Some(reply_id),
            ..Default::default()
        };
        let query = SurrealQueryBuilder::begin_transaction()
            .query(format!(
                "LET $rec = type::thing(\"{REPLY_TABLE_NAME}\", $reply_id);
LET $prev = (SELECT deleted FROM $rec WHERE post_id = $post_id)[0];
IF $prev == NONE {{ THROW \"{THROW_REPLY_NOT_FOUND}\"; }};
IF $prev.deleted {{ THROW \"{THROW_REPLY_DELETED}\"; }};
UPDATE $rec SET {set_clause}, updated_at = $now;"
            ))
            .commit_transaction()
            .query(format!(
                "SELECT {REPLY_SELECT_FIELDS} FROM type::thing(\"{REPLY_TABLE_NAME}\", $reply_id);"
            ))
            .bind_var("post_id", post_id)
            .bind_var("reply_id", reply_id)
            .bind_var("content", content);

        let mut res = query
            .into_db_query(&self.client)
            .await
            .map_err(|e| map_query_error(e, &subject))?;
        check_transaction_custom_error(&mut res, &subject)?;

        let last = res.num_statements() - 1;
        let reply = res.take::<Option<Reply>>(last)?;
        reply.ok_or(AppError::ReplyNotFound {
            id: reply_id.to_string(),
        })
    }
}

#[async_trait]
impl RepliesRepositoryInterface for RepliesRepository {
    fn build_insert_query(
        &self,
        query: SurrealQueryBuilder,
        input: &CreateReply,
    ) -> SurrealQueryBuilder {
        query
            .query(format!(
                "CREATE type::thing(\"{REPLY_TABLE_NAME}\", $reply_id) CONTENT {{
    post_id: $post_id,
    parent_id: $parent_id,
    thread_id: $thread_id,
    depth: $depth,
    path: $path,
    author_id: $author_id,
    author_name: $author_name,
    content: $content,
    deleted: false,
    like_count: 0,
    reply_count: 0,
    created_at: $now,
    updated_at: $now
}};"
            ))
            .bind_var("post_id", input.post_id.as_str())
            .bind_var("author_id", input.author_id.as_str())
            .bind_var("author_name", input.author_name.as_str())
            .bind_var("content", input.content.as_str())
    }

    fn build_parent_reply_added_query(&self, query: SurrealQueryBuilder) -> SurrealQueryBuilder {
        query.query("UPDATE $parent_rec SET reply_count += 1;")
    }

    async fn commit_create(
        &self,
        query: SurrealQueryBuilder,
        input: &CreateReply,
        reply_id: &str,
        max_depth: u8,
    ) -> AppResult<Reply> {
        let subject = TxSubject {
            post_id: &input.post_id,
            parent_id: input.parent_id.as_deref(),
            reply_id: Some(reply_id),
            max_depth,
        };
        let query = query.commit_transaction().query(format!(
            "SELECT {REPLY_SELECT_FIELDS} FROM type::thing(\"{REPLY_TABLE_NAME}\", $reply_id);"
        ));

        let mut res = query
            .into_db_query(&self.client)
            .await
            .map_err(|e| map_query_error(e, &subject))?;
        check_transaction_custom_error(&mut res, &subject)?;

        let last = res.num_statements() - 1;
        let reply = res.take::<Option<Reply>>(last)?;
        reply.ok_or(AppError::ReplyNotFound {
            id: reply_id.to_string(),
        })
    }

    async fn update_content(
        &self,
        post_id: &str,
        reply_id: &str,
        content: &str,
    ) -> AppResult<Reply> {
        self.mutate_content(post_id, reply_id, "content = $content", content)
            .await
    }

    async fn soft_delete(&self, post_id: &str, reply_id: &str) -> AppResult<Reply> {
        self.mutate_content(post_id, reply_id, "deleted = true, content = \"\"", "")
            .await
    }

    async fn get(&self, post_id: &str, reply_id: &str) -> AppResult<Reply> {
        let mut res = self
            .client
            .query(format!(
                "SELECT {REPLY_SELECT_FIELDS} FROM type::thing(\"{REPLY_TABLE_NAME}\", $reply_id) WHERE post_id = $post_id;"
            ))
            .bind(("reply_id", reply_id.to_string()))
            .bind(("post_id", post_id.to_string()))
            .await?;
        let reply = res.take::<Option<Reply>>(0)?;
        reply.ok_or(AppError::ReplyNotFound {
            id: reply_id.to_string(),
        })
    }

    async fn get_by_post(&self, post_id: &str) -> AppResult<Vec<Reply>> {
        let data = self
            .client
            .query(format!(
                "SELECT {REPLY_SELECT_FIELDS} FROM {REPLY_TABLE_NAME} WHERE post_id = $post_id ORDER BY path ASC;"
            ))
            .bind(("post_id", post_id.to_string()))
            .await?
            .take::<Vec<Reply>>(0)?;
        Ok(data)
    }

    async fn get_counter(
        &self,
        post_id: &str,
        parent_id: &str,
    ) -> AppResult<Option<ReplyCounter>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT post_id, parent_id, next FROM type::thing(\"{REPLY_COUNTER_TABLE_NAME}\", [$post_id, $parent_id]);"
            ))
            .bind(("post_id", post_id.to_string()))
            .bind(("parent_id", parent_id.to_string()))
            .await?;
        Ok(res.take::<Option<ReplyCounter>>(0)?)
    }
}
