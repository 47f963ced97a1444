mod helpers;

use std::collections::HashSet;

use board_replies::entities::reply::{CreateReply, Reply};
use board_replies::interfaces::repositories::post::PostsRepositoryInterface;
use board_replies::interfaces::repositories::reply::RepliesRepositoryInterface;
use board_replies::middleware::error::AppError;
use board_replies::models::view::reply::ListOptions;
use board_replies::services::reply_service::ReplyService;
use futures::future::join_all;
use helpers::reply_helpers::{actor, create_fake_post, create_fake_reply, create_reply_as};

const ALL: ListOptions = ListOptions {
    include_deleted: true,
};

test_with_db!(root_and_children_get_padded_paths, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let root = service
        .create(CreateReply::new(&post.id, None, "first", "u1", "Alice"))
        .await
        .unwrap();
    assert_eq!(root.path, root.id);
    assert_eq!(root.thread_id, root.id);
    assert_eq!(root.depth, 0);
    assert_eq!(root.parent_id, None);
    assert_eq!(root.reply_count, 0);
    assert!(!root.deleted);

    let first = service
        .create(CreateReply::new(&post.id, Some(&root.id), "reply A", "u2", "Bob"))
        .await
        .unwrap();
    assert_eq!(first.path, format!("{}/0001", root.id));
    assert_eq!(first.depth, 1);
    assert_eq!(first.thread_id, root.id);
    assert_eq!(first.parent_id.as_deref(), Some(root.id.as_str()));

    let second = service
        .create(CreateReply::new(&post.id, Some(&root.id), "reply B", "u3", "Carol"))
        .await
        .unwrap();
    assert_eq!(second.path, format!("{}/0002", root.id));

    let nested = service
        .create(CreateReply::new(&post.id, Some(&first.id), "deeper", "u1", "Alice"))
        .await
        .unwrap();
    assert_eq!(nested.path, format!("{}/0001/0001", root.id));
    assert_eq!(nested.depth, 2);
    assert_eq!(nested.thread_id, root.id);

    let root = ctx_state.db.replies.get(&post.id, &root.id).await.unwrap();
    assert_eq!(root.reply_count, 2);

    let counter = ctx_state
        .db
        .replies
        .get_counter(&post.id, &root.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counter.next, 3);

    let post = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post.reply_count, 4);
    assert!(post.last_reply_at.is_some());
});

test_with_db!(inputs_are_trimmed_and_required, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let reply = service
        .create(CreateReply::new(&post.id, Some("  "), "  hello  ", " u1 ", " Alice "))
        .await
        .unwrap();
    assert_eq!(reply.content, "hello");
    assert_eq!(reply.author_id, "u1");
    assert_eq!(reply.author_name, "Alice");
    assert_eq!(reply.depth, 0);

    let err = service
        .create(CreateReply::new(&post.id, None, "   ", "u1", "Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "content"));

    let err = service
        .create(CreateReply::new(&post.id, None, "x", "", "Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "author_id"));

    let post = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post.reply_count, 1);
});

test_with_db!(missing_post_or_parent_is_rejected, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let other_post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let err = service
        .create(CreateReply::new("missing", None, "hi", "u1", "Alice"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::PostNotFound { id: "missing".into() });

    let err = service
        .create(CreateReply::new(&post.id, Some("nope"), "hi", "u1", "Alice"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ParentNotFound { id: "nope".into() });

    // a parent from another post is not visible under this one
    let foreign = create_fake_reply(&ctx_state, &other_post.id, None).await;
    let err = service
        .create(CreateReply::new(&post.id, Some(&foreign.id), "hi", "u1", "Alice"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ParentNotFound { id: foreign.id.clone() });

    let err = service.list("missing", &ListOptions::default()).await.unwrap_err();
    assert_eq!(err, AppError::PostNotFound { id: "missing".into() });

    assert!(service.list(&post.id, &ALL).await.unwrap().is_empty());
    let post = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post.reply_count, 0);
    assert!(post.last_reply_at.is_none());
});

test_with_db!(depth_limit_creates_nothing, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let mut parent = create_fake_reply(&ctx_state, &post.id, None).await;
    for depth in 1..=config.reply_max_depth {
        let child = create_fake_reply(&ctx_state, &post.id, Some(&parent.id)).await;
        assert_eq!(child.depth, depth);
        assert_eq!(child.depth, parent.depth + 1);
        parent = child;
    }
    assert_eq!(parent.depth, 3);

    let err = service
        .create(CreateReply::new(&post.id, Some(&parent.id), "too deep", "u1", "Alice"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::MaxDepthExceeded { max_depth: 3 });

    let replies = service.list(&post.id, &ALL).await.unwrap();
    assert_eq!(replies.len(), 4);

    let deepest = ctx_state.db.replies.get(&post.id, &parent.id).await.unwrap();
    assert_eq!(deepest.reply_count, 0);
    let counter = ctx_state
        .db
        .replies
        .get_counter(&post.id, &parent.id)
        .await
        .unwrap();
    assert!(counter.is_none());

    let post = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post.reply_count, 4);
});

test_with_db!(concurrent_creates_get_distinct_paths, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let root = create_fake_reply(&ctx_state, &post.id, None).await;
    let total = 8;

    let service = ReplyService::from_state(&ctx_state);
    let inputs: Vec<CreateReply> = (0..total)
        .map(|i| {
            CreateReply::new(
                &post.id,
                Some(&root.id),
                &format!("concurrent {i}"),
                &format!("u{i}"),
                "Writer",
            )
        })
        .collect();
    let results = join_all(inputs.into_iter().map(|input| service.create(input))).await;
    let created: Vec<Reply> = results.into_iter().map(|r| r.unwrap()).collect();

    let paths: HashSet<String> = created.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths.len(), total);
    let expected: HashSet<String> = (1..=total)
        .map(|n| format!("{}/{:04}", root.id, n))
        .collect();
    assert_eq!(paths, expected);

    let counter = ctx_state
        .db
        .replies
        .get_counter(&post.id, &root.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counter.next as usize, total + 1);

    let root = ctx_state.db.replies.get(&post.id, &root.id).await.unwrap();
    assert_eq!(root.reply_count as usize, total);
    let post = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post.reply_count as usize, total + 1);
});

test_with_db!(tenth_sibling_sorts_after_ninth, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);
    let root = create_fake_reply(&ctx_state, &post.id, None).await;

    let mut children = vec![];
    for _ in 0..12 {
        children.push(create_fake_reply(&ctx_state, &post.id, Some(&root.id)).await);
    }
    assert_eq!(children[8].path, format!("{}/0009", root.id));
    assert_eq!(children[9].path, format!("{}/0010", root.id));
    assert_eq!(children[11].path, format!("{}/0012", root.id));
    let under_ninth = create_fake_reply(&ctx_state, &post.id, Some(&children[8].id)).await;

    let listed = service.list(&post.id, &ALL).await.unwrap();
    let paths: Vec<String> = listed.iter().map(|r| r.path.clone()).collect();
    let mut expected = vec![root.path.clone()];
    for (i, child) in children.iter().enumerate() {
        expected.push(child.path.clone());
        if i == 8 {
            expected.push(under_ninth.path.clone());
        }
    }
    assert_eq!(paths, expected);

    let counter = ctx_state
        .db
        .replies
        .get_counter(&post.id, &root.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counter.next, 13);
});

test_with_db!(path_order_is_pre_order_traversal, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let a = create_fake_reply(&ctx_state, &post.id, None).await;
    let b = create_fake_reply(&ctx_state, &post.id, None).await;
    let a1 = create_fake_reply(&ctx_state, &post.id, Some(&a.id)).await;
    let b1 = create_fake_reply(&ctx_state, &post.id, Some(&b.id)).await;
    let a2 = create_fake_reply(&ctx_state, &post.id, Some(&a.id)).await;
    let a1x = create_fake_reply(&ctx_state, &post.id, Some(&a1.id)).await;
    let a2x = create_fake_reply(&ctx_state, &post.id, Some(&a2.id)).await;
    let a1y = create_fake_reply(&ctx_state, &post.id, Some(&a1.id)).await;

    let listed = service.list(&post.id, &ALL).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();

    let mut thread_a = vec![
        a.id.as_str(),
        a1.id.as_str(),
        a1x.id.as_str(),
        a1y.id.as_str(),
        a2.id.as_str(),
        a2x.id.as_str(),
    ];
    let mut thread_b = vec![b.id.as_str(), b1.id.as_str()];
    let expected = if a.id < b.id {
        thread_a.append(&mut thread_b);
        thread_a
    } else {
        thread_b.append(&mut thread_a);
        thread_b
    };
    assert_eq!(ids, expected);

    // every reply's descendants follow it contiguously
    for (i, reply) in listed.iter().enumerate() {
        let descendants = listed.iter().filter(|r| reply.is_ancestor_of(r)).count();
        for follower in &listed[i + 1..=i + descendants] {
            assert!(reply.is_ancestor_of(follower));
        }
    }
});

test_with_db!(soft_delete_keeps_structure, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);

    let root = create_fake_reply(&ctx_state, &post.id, None).await;
    let target = create_reply_as(&ctx_state, &post.id, Some(&root.id), "u2").await;
    let child = create_fake_reply(&ctx_state, &post.id, Some(&target.id)).await;

    let deleted = service
        .soft_delete(&post.id, &target.id, &actor("u2", &[]))
        .await
        .unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.content, "");
    assert_eq!(deleted.id, target.id);
    assert_eq!(deleted.path, target.path);
    assert_eq!(deleted.depth, target.depth);
    assert_eq!(deleted.parent_id, target.parent_id);
    assert_eq!(deleted.thread_id, target.thread_id);
    assert_eq!(deleted.created_at, target.created_at);
    assert_eq!(deleted.reply_count, 1);
    assert!(deleted.updated_at >= target.updated_at);

    let root = ctx_state.db.replies.get(&post.id, &root.id).await.unwrap();
    assert_eq!(root.reply_count, 1);
    let post_after = ctx_state.db.posts.get(&post.id).await.unwrap();
    assert_eq!(post_after.reply_count, 3);

    let listed = service.list(&post.id, &ListOptions::default()).await.unwrap();
    let listed_ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        listed_ids,
        vec![root.id.as_str(), target.id.as_str(), child.id.as_str()]
    );
    assert!(listed[1].deleted);
    assert_eq!(listed[1].content, "");

    let hidden = ListOptions {
        include_deleted: false,
    };
    let visible = service.list(&post.id, &hidden).await.unwrap();
    let visible_ids: Vec<&str> = visible.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(visible_ids, vec![root.id.as_str(), child.id.as_str()]);

    // numbering continues past deleted siblings
    let next = create_fake_reply(&ctx_state, &post.id, Some(&root.id)).await;
    assert_eq!(next.path, format!("{}/0002", root.id));

    let err = service
        .soft_delete(&post.id, &target.id, &actor("u2", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ReplyDeleted { id: target.id.clone() });
});

test_with_db!(non_owner_is_forbidden_and_record_unchanged, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);
    let reply = create_reply_as(&ctx_state, &post.id, None, "u1").await;

    let err = service
        .patch(&post.id, &reply.id, "hijack", &actor("u3", &["member"]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::Forbidden);

    let err = service
        .soft_delete(&post.id, &reply.id, &actor("u3", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::Forbidden);

    let stored = ctx_state.db.replies.get(&post.id, &reply.id).await.unwrap();
    assert_eq!(stored, reply);

    let patched = service
        .patch(&post.id, &reply.id, "  edited  ", &actor("u1", &[]))
        .await
        .unwrap();
    assert_eq!(patched.content, "edited");
    assert_eq!(patched.path, reply.path);

    let moderated = service
        .patch(&post.id, &reply.id, "moderated", &actor("u9", &["admin"]))
        .await
        .unwrap();
    assert_eq!(moderated.content, "moderated");
    assert_eq!(moderated.author_id, "u1");
});

test_with_db!(deleted_reply_rejects_edits, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);
    let root = create_fake_reply(&ctx_state, &post.id, None).await;
    let reply = create_reply_as(&ctx_state, &post.id, Some(&root.id), "u2").await;

    service
        .soft_delete(&post.id, &reply.id, &actor("u2", &[]))
        .await
        .unwrap();

    let err = service
        .patch(&post.id, &reply.id, "edit", &actor("u3", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::Forbidden);

    let err = service
        .patch(&post.id, &reply.id, "edit", &actor("u2", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ReplyDeleted { id: reply.id.clone() });

    let stored = ctx_state.db.replies.get(&post.id, &reply.id).await.unwrap();
    assert_eq!(stored.content, "");
    assert!(stored.deleted);
});

test_with_db!(mutations_need_identity_and_existing_reply, |ctx_state, config| {
    let post = create_fake_post(&ctx_state).await;
    let service = ReplyService::from_state(&ctx_state);
    let reply = create_reply_as(&ctx_state, &post.id, None, "u1").await;

    let err = service
        .patch(&post.id, &reply.id, "edit", &actor("", &["admin"]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::AuthenticationFail);

    let err = service
        .patch(&post.id, &reply.id, "   ", &actor("u1", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = service
        .soft_delete(&post.id, "missing", &actor("u1", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ReplyNotFound { id: "missing".into() });

    let other_post = create_fake_post(&ctx_state).await;
    let err = service
        .patch(&other_post.id, &reply.id, "edit", &actor("u1", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::ReplyNotFound { id: reply.id.clone() });

    let stored = ctx_state.db.replies.get(&post.id, &reply.id).await.unwrap();
    assert_eq!(stored, reply);
});
