#![cfg(feature = "inmem-store")]

use rbb::models::{NewComment, NewPost, NewUser};
use rbb::repo::{inmem::InMemRepo, RepoError};
// Bring trait method namespaces into scope so calls on InMemRepo resolve.
use rbb::repo::{CommentRepo, PostRepo, UserRepo};

fn user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.into(),
        email: email.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$c29tZWhhc2g".into(),
    }
}

#[tokio::test]
async fn user_create_and_email_conflict() {
    let r = InMemRepo::new();

    let ann = r.create_user(user("Ann", "ann@example.com")).await.unwrap();
    assert_eq!(ann.name, "Ann");

    // same email again, different name
    let err = r.create_user(user("Ann2", "ann@example.com")).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict));

    // lookup by email
    let found = r.get_user_by_email("ann@example.com").await.unwrap();
    assert_eq!(found.id, ann.id);
    assert!(matches!(
        r.get_user_by_email("nobody@example.com").await.unwrap_err(),
        RepoError::NotFound
    ));
}

#[tokio::test]
async fn post_and_comment_flow() {
    let r = InMemRepo::new();
    let ann = r.create_user(user("Ann", "ann@example.com")).await.unwrap();

    let post = r
        .create_post(NewPost {
            title: "Hello".into(),
            content: "World".into(),
            user_id: ann.id,
        })
        .await
        .unwrap();
    assert_eq!(post.user_id, ann.id);
    assert_eq!(r.get_post(post.id).await.unwrap().title, "Hello");

    let comment = r
        .create_comment(NewComment {
            content: "Nice!".into(),
            user_id: ann.id,
            post_id: post.id,
        })
        .await
        .unwrap();
    assert_eq!(comment.post_id, post.id);

    // parent existence is checked before insert
    let err = r
        .create_comment(NewComment {
            content: "orphan".into(),
            user_id: ann.id,
            post_id: 9999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn feed_is_flat_left_join_newest_first() {
    let r = InMemRepo::new();
    let ann = r.create_user(user("Ann", "ann@example.com")).await.unwrap();
    let bob = r.create_user(user("Bob", "bob@example.com")).await.unwrap();

    let first = r
        .create_post(NewPost { title: "First".into(), content: "a".into(), user_id: ann.id })
        .await
        .unwrap();
    let second = r
        .create_post(NewPost { title: "Second".into(), content: "b".into(), user_id: bob.id })
        .await
        .unwrap();

    let c1 = r
        .create_comment(NewComment { content: "one".into(), user_id: bob.id, post_id: second.id })
        .await
        .unwrap();
    let c2 = r
        .create_comment(NewComment { content: "two".into(), user_id: ann.id, post_id: second.id })
        .await
        .unwrap();

    let rows = r.list_feed().await.unwrap();

    // one row per comment, one row for the commentless post
    assert_eq!(rows.len(), 3);

    // newest post first; its comments in id order
    assert_eq!(rows[0].post_id, second.id);
    assert_eq!(rows[0].author_name, "Bob");
    assert_eq!(rows[0].comment_id, Some(c1.id));
    assert_eq!(rows[0].comment_author.as_deref(), Some("Bob"));
    assert_eq!(rows[1].comment_id, Some(c2.id));
    assert_eq!(rows[1].comment_content.as_deref(), Some("two"));
    assert_eq!(rows[1].comment_author.as_deref(), Some("Ann"));

    // commentless post still present, exactly once, with null comment fields
    assert_eq!(rows[2].post_id, first.id);
    assert_eq!(rows[2].author_name, "Ann");
    assert!(rows[2].comment_id.is_none());
    assert!(rows[2].comment_content.is_none());
    assert!(rows[2].comment_author.is_none());
    assert!(rows[2].comment_created_at.is_none());

    // posts ordered by creation time, non-increasing
    for pair in rows.windows(2) {
        assert!(pair[0].post_created_at >= pair[1].post_created_at);
    }
}
