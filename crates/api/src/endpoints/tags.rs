//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use blog_common::AppResult;
use blog_core::TagWeight;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::Rendered};

/// Tag cloud query.
#[derive(Debug, Deserialize)]
pub struct CloudQuery {
    /// Number of tags, defaults to the configured cloud size.
    pub limit: Option<u64>,
}

/// Tag suggestion query.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    /// Substring to look for.
    #[serde(default)]
    pub keyword: String,
    /// Maximum number of names.
    pub limit: Option<u64>,
}

#[derive(Serialize)]
struct TagCloudView {
    tags: Vec<TagWeight>,
}

/// Most frequent tags with display weights.
async fn cloud(
    State(state): State<AppState>,
    Query(query): Query<CloudQuery>,
) -> AppResult<Rendered<TagCloudView>> {
    let limit = query.limit.unwrap_or(state.tag_cloud_limit);
    let tags = state.tag_service.cloud(limit).await?;
    Ok(Rendered::new("tagCloud", TagCloudView { tags }))
}

/// Tag names matching a keyword, for tag input completion.
async fn suggest(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(query): Query<SuggestQuery>,
) -> AppResult<Json<Vec<String>>> {
    let names = state
        .tag_service
        .suggest(&query.keyword, query.limit)
        .await?;
    Ok(Json(names))
}

/// Tag routes, nested under `/tags`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cloud))
        .route("/suggest", get(suggest))
}
