//! API integration tests.
//!
//! These tests drive the router with a mock database behind it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use blog_api::{AppState, auth_middleware, router as api_router};
use blog_core::MODERATION_NOTICE;
use blog_db::entities::{comment, comment::CommentStatus, post, post::PostStatus, tag, user};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

const TOKEN: &str = "secret";

fn test_user() -> user::Model {
    user::Model {
        id: "user1".to_string(),
        username: "admin".to_string(),
        token: Some(TOKEN.to_string()),
        created_at: Utc::now().into(),
    }
}

fn test_post(status: PostStatus, tags: &str) -> post::Model {
    post::Model {
        id: "post1".to_string(),
        title: "Hello".to_string(),
        content: "World".to_string(),
        tags: tags.to_string(),
        status,
        author_id: "user1".to_string(),
        create_time: Utc::now().into(),
        update_time: Utc::now().into(),
    }
}

fn test_comment() -> comment::Model {
    comment::Model {
        id: "c1".to_string(),
        post_id: "post1".to_string(),
        content: "Nice".to_string(),
        author: "bob".to_string(),
        email: "bob@example.com".to_string(),
        url: None,
        status: CommentStatus::Pending,
        create_time: Utc::now().into(),
    }
}

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

/// Create the test router over a prepared mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let state = AppState::new(Arc::new(db.into_connection()), 20);
    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Json {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_delete_through_get_is_rejected() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/post1/delete", Some(TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    assert_eq!(
        body["error"]["message"],
        "Invalid request. Please do not repeat this request again."
    );
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request(
            "POST",
            "/posts",
            None,
            Some(r#"{"title":"Hi","content":"Body","status":"draft","tags":""}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_is_a_guest() {
    let db = empty_db().append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/admin", Some("wrong"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guest_cannot_view_draft() {
    let db = empty_db().append_query_results([[test_post(PostStatus::Draft, "")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/post1", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_view_renders_post_with_comments() {
    let approved = comment::Model {
        status: CommentStatus::Approved,
        ..test_comment()
    };
    let db = empty_db()
        .append_query_results([[test_post(PostStatus::Published, "go")]])
        .append_query_results([[count_row(1)]])
        .append_query_results([[approved]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/post1", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["view"], "view");
    assert_eq!(body["data"]["post"]["id"], "post1");
    assert_eq!(body["data"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"][0]["status"], "approved");
    assert!(body.get("flash").is_none());
}

#[tokio::test]
async fn test_invalid_comment_is_rejected_before_lookup() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request(
            "POST",
            "/posts/post1/comments",
            None,
            Some(r#"{"content":"Nice","author":"bob","email":"nope"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_comment_missing_field_is_validation_error() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request(
            "POST",
            "/posts/post1/comments",
            None,
            Some(r#"{"content":"Nice","email":"bob@example.com"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("author")
    );
}

#[tokio::test]
async fn test_comment_malformed_json_is_validation_error() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request("POST", "/posts/post1/comments", None, Some("{not json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_comment_submission_flashes_moderation_notice() {
    let db = empty_db()
        // lock the post, insert the comment, reload the post, count, approved comments
        .append_query_results([[test_post(PostStatus::Published, "")]])
        .append_query_results([[test_comment()]])
        .append_query_results([[test_post(PostStatus::Published, "")]])
        .append_query_results([[count_row(0)]])
        .append_query_results([Vec::<comment::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/posts/post1/comments",
            None,
            Some(r#"{"content":"Nice","author":"bob","email":"bob@example.com"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["view"], "view");
    assert_eq!(body["data"]["comment"]["status"], "pending");
    assert_eq!(body["data"]["commentCount"], 0);
    assert_eq!(body["flash"]["message"], MODERATION_NOTICE);
}

#[tokio::test]
async fn test_index_renders_empty_page() {
    let db = empty_db()
        .append_query_results([[count_row(0)]])
        .append_query_results([Vec::<post::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts?tag=go&page=0", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["view"], "index");
    assert_eq!(body["data"]["tag"], "go");
    assert_eq!(body["data"]["posts"]["page"], 1);
    assert_eq!(body["data"]["posts"]["totalCount"], 0);
}

#[tokio::test]
async fn test_create_redirects_to_new_post() {
    let db = empty_db()
        .append_query_results([[test_user()]])
        .append_query_results([[test_post(PostStatus::Draft, "go")]])
        .append_exec_results([exec_ok()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/posts",
            Some(TOKEN),
            Some(r#"{"title":"Hello","content":"World","status":"draft","tags":"go"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/posts/post1");
}

#[tokio::test]
async fn test_create_rejects_bad_tags() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/posts",
            Some(TOKEN),
            Some(r#"{"title":"Hello","content":"World","status":"draft","tags":"a;b"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_missing_title_is_validation_error() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/posts",
            Some(TOKEN),
            Some(r#"{"content":"World","status":"draft","tags":"go"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_update_unknown_status_is_validation_error() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PUT",
            "/posts/post1",
            Some(TOKEN),
            Some(r#"{"title":"Hello","content":"World","status":"hidden","tags":""}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_overlong_tag_is_validation_error() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);
    let body = serde_json::json!({
        "title": "Hello",
        "content": "World",
        "status": "draft",
        "tags": "a".repeat(129),
    })
    .to_string();

    let response = app
        .oneshot(request("POST", "/posts", Some(TOKEN), Some(&body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_token_lookup_failure_is_server_error() {
    let db = empty_db().append_query_errors([DbErr::Custom("connection reset".to_string())]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/post1", Some(TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_ajax_delete_returns_no_content() {
    let db = empty_db()
        .append_query_results([[test_user()]])
        .append_query_results([[test_post(PostStatus::Published, "")]])
        // comments, post
        .append_exec_results([exec_ok(), exec_ok()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("POST", "/posts/post1/delete?ajax", Some(TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_redirects_to_index() {
    let db = empty_db()
        .append_query_results([[test_user()]])
        .append_query_results([[test_post(PostStatus::Draft, "")]])
        .append_exec_results([exec_ok(), exec_ok()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("DELETE", "/posts/post1", Some(TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/posts");
}

#[tokio::test]
async fn test_admin_rejects_unknown_status() {
    let db = empty_db().append_query_results([[test_user()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/posts/admin?status=hidden", Some(TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tag_cloud() {
    let db = empty_db().append_query_results([[
        tag::Model {
            id: "t1".to_string(),
            name: "rust".to_string(),
            frequency: 3,
        },
        tag::Model {
            id: "t2".to_string(),
            name: "go".to_string(),
            frequency: 1,
        },
    ]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/tags", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["view"], "tagCloud");
    assert_eq!(body["data"]["tags"][0]["name"], "go");
}

#[tokio::test]
async fn test_tag_suggest_requires_authentication() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request("GET", "/tags/suggest?keyword=ru", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(request("GET", "/nonexistent/endpoint", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
    std::collections::BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}
