//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use blog_core::{Caller, CommentService, PostService, TagService, UserService};
use blog_db::repositories::{CommentRepository, PostRepository, TagRepository, UserRepository};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Token authentication.
    pub user_service: UserService,
    /// Post lifecycle.
    pub post_service: PostService,
    /// Comment submission and listing.
    pub comment_service: CommentService,
    /// Tag cloud and suggestions.
    pub tag_service: TagService,
    /// Tags shown by the tag cloud when no `limit` is given.
    pub tag_cloud_limit: u64,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, tag_cloud_limit: u64) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));

        let tag_service = TagService::new(tag_repo);

        Self {
            user_service: UserService::new(user_repo),
            post_service: PostService::new(
                Arc::clone(&db),
                post_repo.clone(),
                comment_repo.clone(),
                tag_service.clone(),
            ),
            comment_service: CommentService::new(db, post_repo, comment_repo),
            tag_service,
            tag_cloud_limit,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a [`Caller`] stored in the
/// request extensions. Requests without a token, or with an unknown one,
/// continue as guests. A failed lookup ends the request with its error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    let caller = match token {
        Some(token) => match state.user_service.authenticate(&token).await {
            Ok(caller) => caller,
            Err(e) => {
                warn!(error = %e, "Token lookup failed");
                return e.into_response();
            }
        },
        None => Caller::Guest,
    };
    req.extensions_mut().insert(caller);

    next.run(req).await
}
