//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post, post::PostStatus};
use blog_common::{AppError, AppResult, escape_like, tags::TAG_SEPARATOR};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::Deserialize;

/// Admin search filters. Every field is optional; `None` means "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSearch {
    /// Substring of the title.
    pub title: Option<String>,
    /// Exact status.
    pub status: Option<PostStatus>,
    /// Tag the post must carry.
    pub tag: Option<String>,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID, whatever its status.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a post with `SELECT ... FOR UPDATE` inside the caller's transaction.
    ///
    /// Concurrent updates or deletes of the same post wait on this lock, so
    /// the tag set read here is the one being replaced.
    pub async fn lock_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a post with `SELECT ... FOR SHARE`, blocking its deletion until
    /// the caller's transaction ends.
    pub async fn lock_for_share<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .lock_shared()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new post.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Returns the number of rows removed.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<u64> {
        Post::delete_by_id(id)
            .exec(conn)
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts, newest update first, optionally carrying `tag`.
    pub async fn find_published(
        &self,
        tag: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        newest_first(Post::find().filter(published_condition(tag)))
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published posts, optionally carrying `tag`.
    pub async fn count_published(&self, tag: Option<&str>) -> AppResult<u64> {
        Post::find()
            .filter(published_condition(tag))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts of any status matching the admin filters.
    pub async fn search(
        &self,
        filter: &PostSearch,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        newest_first(Post::find().filter(search_condition(filter)))
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts matching the admin filters.
    pub async fn count_search(&self, filter: &PostSearch) -> AppResult<u64> {
        Post::find()
            .filter(search_condition(filter))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn newest_first(query: Select<Post>) -> Select<Post> {
    query
        .order_by_desc(post::Column::UpdateTime)
        .order_by_desc(post::Column::Id)
}

fn published_condition(tag: Option<&str>) -> Condition {
    let condition = Condition::all().add(post::Column::Status.eq(PostStatus::Published));
    match tag {
        Some(tag) => condition.add(has_tag(tag)),
        None => condition,
    }
}

fn search_condition(filter: &PostSearch) -> Condition {
    let mut condition = Condition::all();
    if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
        condition = condition.add(post::Column::Title.like(format!("%{}%", escape_like(title))));
    }
    if let Some(status) = filter.status {
        condition = condition.add(post::Column::Status.eq(status));
    }
    if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
        condition = condition.add(has_tag(tag));
    }
    condition
}

/// Exact membership of `tag` in the normalized `tags` column.
fn has_tag(tag: &str) -> Condition {
    let escaped = escape_like(tag);
    Condition::any()
        .add(post::Column::Tags.eq(tag))
        .add(post::Column::Tags.like(format!("{escaped}{TAG_SEPARATOR}%")))
        .add(post::Column::Tags.like(format!("%{TAG_SEPARATOR}{escaped}")))
        .add(post::Column::Tags.like(format!("%{TAG_SEPARATOR}{escaped}{TAG_SEPARATOR}%")))
}
