use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::reply::{CreateReply, Reply};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::models::view::reply::{ListOptions, ReplyNode, ReplyThread};
use crate::services::reply_service::ReplyService;
use crate::services::thread_projector;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/posts/:post_id/replies",
            get(get_replies).post(create_reply),
        )
        .route(
            "/api/posts/:post_id/replies/:reply_id",
            patch(patch_reply).delete(delete_reply),
        )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListView {
    #[default]
    Flat,
    Threads,
    Tree,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetRepliesQuery {
    pub include_deleted: Option<bool>,
    pub view: Option<ListView>,
}

#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub threads: Vec<ReplyThread>,
    pub direct_reply_counts: HashMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub tree: Vec<ReplyNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReplyInput {
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "authorId")]
    pub author_id: String,
    #[serde(default, alias = "authorName")]
    pub author_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ActorInput {
    #[serde(default, alias = "actorId")]
    pub actor_id: Option<String>,
    #[serde(default, alias = "actorRoles")]
    pub actor_roles: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatchReplyInput {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub actor: ActorInput,
}

async fn get_replies(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(post_id): Path<String>,
    Query(query): Query<GetRepliesQuery>,
) -> CtxResult<Response> {
    let options = query
        .include_deleted
        .map_or_else(ListOptions::default, |include_deleted| ListOptions {
            include_deleted,
        });
    let replies = ReplyService::from_state(&ctx_state)
        .list(&post_id, &options)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;

    let res = match query.view.unwrap_or_default() {
        ListView::Flat => Json(replies).into_response(),
        ListView::Threads => Json(ThreadsResponse {
            direct_reply_counts: thread_projector::direct_reply_counts(&replies),
            threads: thread_projector::threads(&replies),
        })
        .into_response(),
        ListView::Tree => Json(TreeResponse {
            tree: thread_projector::nest(&replies),
        })
        .into_response(),
    };
    Ok(res)
}

async fn create_reply(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(post_id): Path<String>,
    Json(body): Json<CreateReplyInput>,
) -> CtxResult<(StatusCode, Json<Reply>)> {
    let input = CreateReply::new(
        &post_id,
        body.parent_id.as_deref(),
        &body.content,
        &body.author_id,
        &body.author_name,
    );
    let reply = ReplyService::from_state(&ctx_state)
        .create(input)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn patch_reply(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path((post_id, reply_id)): Path<(String, String)>,
    Json(body): Json<PatchReplyInput>,
) -> CtxResult<Json<Reply>> {
    let actor = ctx.actor(body.actor.actor_id.as_deref(), body.actor.actor_roles.as_ref());
    let reply = ReplyService::from_state(&ctx_state)
        .patch(&post_id, &reply_id, &body.content, &actor)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(reply))
}

async fn delete_reply(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path((post_id, reply_id)): Path<(String, String)>,
    body: Option<Json<ActorInput>>,
) -> CtxResult<Json<Reply>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let actor = ctx.actor(body.actor_id.as_deref(), body.actor_roles.as_ref());
    let reply = ReplyService::from_state(&ctx_state)
        .soft_delete(&post_id, &reply_id, &actor)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(reply))
}
