//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `blog_test`)
//!   `TEST_DB_PASSWORD` (default: `blog_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use blog_db::entities::{Comment, Post, comment, comment::CommentStatus, post, post::PostStatus};
use blog_db::repositories::{
    CommentRepository, PostRepository, PostSearch, TagRepository, UserRepository,
};
use blog_db::test_utils::{TestDatabase, TestDbConfig};
use chrono::Utc;
use sea_orm::{EntityTrait, PaginatorTrait, Set, TransactionTrait};

async fn seed_post(db: &TestDatabase, id: &str, status: PostStatus, tags: &str) -> post::Model {
    let conn = Arc::new(db.conn.clone());
    let users = UserRepository::new(Arc::clone(&conn));
    if users.find_by_username("author").await.unwrap().is_none() {
        users
            .create("author".to_string(), "author".to_string(), None)
            .await
            .unwrap();
    }

    let now = Utc::now();
    PostRepository::new(Arc::clone(&conn))
        .insert(
            conn.as_ref(),
            post::ActiveModel {
                id: Set(id.to_string()),
                title: Set(format!("Post {id}")),
                content: Set("Body".to_string()),
                tags: Set(tags.to_string()),
                status: Set(status),
                author_id: Set("author".to_string()),
                create_time: Set(now.into()),
                update_time: Set(now.into()),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_tag_frequency_upsert_and_decrement() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());
    let tags = TagRepository::new(Arc::clone(&conn));

    tags.increment(conn.as_ref(), "t1".to_string(), "rust")
        .await
        .unwrap();
    tags.increment(conn.as_ref(), "t2".to_string(), "rust")
        .await
        .unwrap();
    tags.increment(conn.as_ref(), "t3".to_string(), "go")
        .await
        .unwrap();

    assert_eq!(tags.find_by_name("rust").await.unwrap().unwrap().frequency, 2);

    tags.decrement(conn.as_ref(), &["rust".to_string(), "go".to_string()])
        .await
        .unwrap();

    assert_eq!(tags.find_by_name("rust").await.unwrap().unwrap().frequency, 1);
    assert!(tags.find_by_name("go").await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_published_tag_membership_is_exact() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());
    let posts = PostRepository::new(Arc::clone(&conn));

    seed_post(&db, "p1", PostStatus::Published, "go, rust").await;
    seed_post(&db, "p2", PostStatus::Published, "rusty").await;
    seed_post(&db, "p3", PostStatus::Draft, "rust").await;
    seed_post(&db, "p4", PostStatus::Published, "a_b").await;
    seed_post(&db, "p5", PostStatus::Published, "axb").await;

    let found = posts.find_published(Some("rust"), 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "p1");
    assert_eq!(posts.count_published(Some("a_b")).await.unwrap(), 1);
    assert_eq!(posts.count_published(None).await.unwrap(), 4);

    let search = PostSearch {
        title: None,
        status: Some(PostStatus::Draft),
        tag: Some("rust".to_string()),
    };
    assert_eq!(posts.count_search(&search).await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_delete_post_with_comments_in_transaction() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());
    let posts = PostRepository::new(Arc::clone(&conn));
    let comments = CommentRepository::new(Arc::clone(&conn));

    seed_post(&db, "p1", PostStatus::Published, "").await;
    for (id, status) in [("c1", CommentStatus::Approved), ("c2", CommentStatus::Pending)] {
        comments
            .insert(
                conn.as_ref(),
                comment::ActiveModel {
                    id: Set(id.to_string()),
                    post_id: Set("p1".to_string()),
                    content: Set("hi".to_string()),
                    author: Set("bob".to_string()),
                    email: Set("bob@example.com".to_string()),
                    url: Set(None),
                    status: Set(status),
                    create_time: Set(Utc::now().into()),
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(comments.count_approved("p1").await.unwrap(), 1);

    let txn = conn.begin().await.unwrap();
    let locked = posts.lock_for_update(&txn, "p1", None).await.unwrap();
    assert!(locked.is_some());
    assert_eq!(comments.delete_by_post(&txn, "p1").await.unwrap(), 2);
    assert_eq!(posts.delete(&txn, "p1").await.unwrap(), 1);
    txn.commit().await.unwrap();

    assert_eq!(Comment::find().count(conn.as_ref()).await.unwrap(), 0);
    assert!(Post::find_by_id("p1").one(conn.as_ref()).await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}
