use axum_test::{TestResponse, TestServer};
use board_replies::entities::post::Post;
use board_replies::entities::reply::{CreateReply, Reply};
use board_replies::interfaces::repositories::post::PostsRepositoryInterface;
use board_replies::middleware::ctx::Actor;
use board_replies::middleware::mw_ctx::CtxState;
use board_replies::services::reply_service::ReplyService;
use fake::{faker, Fake};
use serde_json::json;

#[allow(dead_code)]
pub async fn create_fake_post(ctx_state: &CtxState) -> Post {
    let title = faker::lorem::en::Sentence(3..6).fake::<String>();
    ctx_state
        .db
        .posts
        .create(&title)
        .await
        .expect("post created")
}

#[allow(dead_code)]
pub fn fake_author() -> (String, String) {
    let id = uuid::Uuid::new_v4().to_string();
    let name = faker::name::en::Name().fake::<String>();
    (id, name)
}

#[allow(dead_code)]
pub async fn create_reply_as(
    ctx_state: &CtxState,
    post_id: &str,
    parent_id: Option<&str>,
    author_id: &str,
) -> Reply {
    let content = faker::lorem::en::Sentence(4..10).fake::<String>();
    ReplyService::from_state(ctx_state)
        .create(CreateReply::new(post_id, parent_id, &content, author_id, "Author"))
        .await
        .expect("reply created")
}

#[allow(dead_code)]
pub async fn create_fake_reply(
    ctx_state: &CtxState,
    post_id: &str,
    parent_id: Option<&str>,
) -> Reply {
    let (author_id, _) = fake_author();
    create_reply_as(ctx_state, post_id, parent_id, &author_id).await
}

#[allow(dead_code)]
pub fn actor(id: &str, roles: &[&str]) -> Actor {
    Actor::new(id, roles.iter().map(|r| r.to_string()).collect())
}

#[allow(dead_code)]
pub async fn post_reply(
    server: &TestServer,
    post_id: &str,
    parent_id: Option<&str>,
    author_id: &str,
) -> TestResponse {
    server
        .post(format!("/api/posts/{post_id}/replies").as_str())
        .json(&json!({
            "parent_id": parent_id,
            "content": faker::lorem::en::Sentence(4..10).fake::<String>(),
            "author_id": author_id,
            "author_name": faker::name::en::Name().fake::<String>(),
        }))
        .await
}
