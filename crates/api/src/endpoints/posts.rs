//! Post endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get, post},
};
use blog_common::{AppError, AppResult};
use blog_core::{CommentInput, Page, PostInput, PostSummary};
use blog_db::{
    entities::{comment, post, post::PostStatus},
    repositories::PostSearch,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, require_mutating},
    middleware::AppState,
    response::Rendered,
};

/// Index query.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    /// Only posts carrying this tag.
    pub tag: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
}

/// Admin search query. Empty fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    /// Substring of the title.
    pub title: Option<String>,
    /// Exact status, e.g. `draft`.
    pub status: Option<String>,
    /// Exact tag.
    pub tag: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
}

/// Delete query.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Present for script-driven deletes, which get 204 instead of a redirect.
    pub ajax: Option<String>,
}

#[derive(Serialize)]
struct IndexView {
    tag: Option<String>,
    posts: Page<PostSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostView {
    post: post::Model,
    comments: Vec<comment::Model>,
    comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<comment::Model>,
}

#[derive(Serialize)]
struct AdminView {
    title: Option<String>,
    status: Option<PostStatus>,
    tag: Option<String>,
    posts: Page<PostSummary>,
}

/// Published posts, optionally by tag.
async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> AppResult<Rendered<IndexView>> {
    let posts = state
        .post_service
        .list(query.tag.as_deref(), query.page)
        .await?;

    Ok(Rendered::new(
        "index",
        IndexView {
            tag: query.tag,
            posts,
        },
    ))
}

/// One post with its approved comments.
async fn view(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<Rendered<PostView>> {
    let post = state.post_service.find(&caller, &id).await?;
    let comment_count = state.comment_service.count(&post.id).await?;
    let comments = state.comment_service.list_approved(&post.id).await?;

    Ok(Rendered::new(
        "view",
        PostView {
            comment_count,
            post,
            comments,
            comment: None,
        },
    ))
}

/// Submit a comment and show the post again.
async fn add_comment(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<Rendered<PostView>> {
    let submission = state.comment_service.add(&caller, &id, input).await?;

    let post = state.post_service.find(&caller, &id).await?;
    let comment_count = state.comment_service.count(&post.id).await?;
    let comments = state.comment_service.list_approved(&post.id).await?;
    let rendered = Rendered::new(
        "view",
        PostView {
            comment_count,
            post,
            comments,
            comment: Some(submission.comment),
        },
    );

    Ok(match submission.notice {
        Some(notice) => rendered.with_flash("commentSubmitted", notice),
        None => rendered,
    })
}

/// Create a post.
async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<PostInput>,
) -> AppResult<Redirect> {
    let post = state.post_service.create(&caller, input).await?;
    Ok(Redirect::to(&format!("/posts/{}", post.id)))
}

/// Update a post.
async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PostInput>,
) -> AppResult<Redirect> {
    let post = state.post_service.update(&caller, &id, input).await?;
    Ok(Redirect::to(&format!("/posts/{}", post.id)))
}

/// Delete a post. Reachable through any verb, but only mutating ones act.
async fn delete(
    State(state): State<AppState>,
    method: Method,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Response> {
    require_mutating(&method)?;
    state.post_service.delete(&caller, &id).await?;

    if query.ajax.is_some() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(Redirect::to("/posts").into_response())
    }
}

/// All posts, filtered for management.
async fn admin(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<AdminQuery>,
) -> AppResult<Rendered<AdminView>> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(s.parse::<PostStatus>().map_err(AppError::Validation)?),
        None => None,
    };
    let filter = PostSearch {
        title: query.title,
        status,
        tag: query.tag,
    };
    debug!(?filter, "Admin post search");

    let posts = state.post_service.search(&caller, &filter, query.page).await?;

    Ok(Rendered::new(
        "admin",
        AdminView {
            title: filter.title,
            status: filter.status,
            tag: filter.tag,
            posts,
        },
    ))
}

/// Post routes, nested under `/posts`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/admin", get(admin))
        .route("/{id}", get(view).put(update).delete(delete))
        .route("/{id}/comments", post(add_comment))
        .route("/{id}/delete", any(delete))
}
