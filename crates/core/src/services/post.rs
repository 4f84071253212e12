//! Post service.
//!
//! Every write runs in one transaction together with the tag frequency
//! changes it causes. Updates and deletes lock the post row first, so two
//! writers of the same post never diff against a stale tag set.

use std::sync::Arc;

use crate::pagination::Page;
use crate::services::tag::TagService;
use crate::services::visibility::Caller;
use blog_common::{AppError, AppResult, IdGenerator, TagSet, tags::MAX_TAG_LENGTH};
use blog_db::{
    entities::post::{self, PostStatus},
    repositories::{CommentRepository, PostRepository, PostSearch},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

/// Posts per page on the public index.
pub const POSTS_PER_PAGE: u64 = 5;

/// Posts per page on the admin listing.
pub const ADMIN_POSTS_PER_PAGE: u64 = 10;

/// Attributes of a post, for both create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 128))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    pub status: PostStatus,

    /// Space or comma separated.
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: String,
}

fn validate_tags(tags: &str) -> Result<(), ValidationError> {
    if !TagSet::is_valid_input(tags) {
        return Err(ValidationError::new("tags")
            .with_message("Tags can only contain word characters.".into()));
    }
    if TagSet::parse(tags).longest() > MAX_TAG_LENGTH {
        let message = format!("Tags can be at most {MAX_TAG_LENGTH} characters long.");
        return Err(ValidationError::new("tags").with_message(message.into()));
    }
    Ok(())
}

/// A listed post with its approved comment count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: post::Model,
    pub comment_count: u64,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    tag_service: TagService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        tag_service: TagService,
    ) -> Self {
        Self {
            db,
            post_repo,
            comment_repo,
            tag_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a post the caller is allowed to see.
    ///
    /// Posts hidden from the caller are reported exactly like missing ones.
    pub async fn find(&self, caller: &Caller, id: &str) -> AppResult<post::Model> {
        self.post_repo
            .find_by_id(id)
            .await?
            .filter(|post| caller.can_see(post.status))
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a post and count its tags.
    pub async fn create(&self, caller: &Caller, input: PostInput) -> AppResult<post::Model> {
        let author_id = caller.require_user()?;
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let tags = TagSet::parse(&input.tags);
        let now = Utc::now();

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            tags: Set(tags.normalized()),
            status: Set(input.status),
            author_id: Set(author_id.to_string()),
            create_time: Set(now.into()),
            update_time: Set(now.into()),
        };

        let txn = self.db.begin().await.map_err(db_err)?;
        let post = self.post_repo.insert(&txn, model).await?;
        self.tag_service
            .apply(&txn, &TagSet::default(), &tags)
            .await?;
        txn.commit().await.map_err(db_err)?;

        info!(post_id = %post.id, author_id = %post.author_id, "Created post");
        Ok(post)
    }

    /// Replace a post's attributes and adjust tag counts by the difference.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        caller.require_user()?;
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = self
            .post_repo
            .lock_for_update(&txn, id)
            .await?
            .filter(|post| caller.can_see(post.status))
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        let old_tags = TagSet::parse(&existing.tags);
        let new_tags = TagSet::parse(&input.tags);

        let mut active: post::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.content = Set(input.content);
        active.status = Set(input.status);
        active.tags = Set(new_tags.normalized());
        active.update_time = Set(Utc::now().into());

        let post = self.post_repo.update(&txn, active).await?;
        self.tag_service.apply(&txn, &old_tags, &new_tags).await?;
        txn.commit().await.map_err(db_err)?;

        info!(post_id = %post.id, "Updated post");
        Ok(post)
    }

    /// Delete a post with all of its comments and tag counts.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        caller.require_user()?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = self
            .post_repo
            .lock_for_update(&txn, id)
            .await?
            .filter(|post| caller.can_see(post.status))
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        let comments = self.comment_repo.delete_by_post(&txn, id).await?;
        self.tag_service
            .apply(&txn, &TagSet::parse(&existing.tags), &TagSet::default())
            .await?;
        self.post_repo.delete(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(post_id = %id, comments, "Deleted post");
        Ok(())
    }

    /// Published posts, newest first, optionally carrying `tag`.
    pub async fn list(
        &self,
        tag: Option<&str>,
        page: Option<u64>,
    ) -> AppResult<Page<PostSummary>> {
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());
        let page = Page::<PostSummary>::normalize(page);

        let total = self.post_repo.count_published(tag).await?;
        let posts = self
            .post_repo
            .find_published(
                tag,
                POSTS_PER_PAGE,
                Page::<PostSummary>::offset(page, POSTS_PER_PAGE),
            )
            .await?;

        let items = self.with_comment_counts(posts).await?;
        Ok(Page::new(items, total, page, POSTS_PER_PAGE))
    }

    /// Posts of every status matching the admin filters.
    pub async fn search(
        &self,
        caller: &Caller,
        filter: &PostSearch,
        page: Option<u64>,
    ) -> AppResult<Page<PostSummary>> {
        caller.require_user()?;
        let page = Page::<PostSummary>::normalize(page);

        let total = self.post_repo.count_search(filter).await?;
        let posts = self
            .post_repo
            .search(
                filter,
                ADMIN_POSTS_PER_PAGE,
                Page::<PostSummary>::offset(page, ADMIN_POSTS_PER_PAGE),
            )
            .await?;

        let items = self.with_comment_counts(posts).await?;
        Ok(Page::new(items, total, page, ADMIN_POSTS_PER_PAGE))
    }

    async fn with_comment_counts(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostSummary>> {
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let counts = self.comment_repo.count_approved_for_posts(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostSummary {
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                post,
            })
            .collect())
    }
}

fn db_err(e: sea_orm::DbErr) -> AppError {
    AppError::Database(e.to_string())
}
