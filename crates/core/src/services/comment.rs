//! Comment service.

use std::sync::Arc;

use crate::services::visibility::Caller;
use blog_common::{AppError, AppResult, IdGenerator};
use blog_db::{
    entities::comment::{self, CommentStatus},
    repositories::{CommentRepository, PostRepository},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Shown to whoever submitted a comment that still awaits approval.
pub const MODERATION_NOTICE: &str =
    "Thank you for your comment. Your comment will be posted once it is approved.";

/// A comment as submitted through the post view.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(min = 1, max = 128))]
    pub author: String,

    #[validate(email, length(max = 128))]
    pub email: String,

    #[serde(default)]
    #[validate(url, length(max = 128))]
    pub url: Option<String>,
}

/// Result of a comment submission.
#[derive(Debug, Clone, Serialize)]
pub struct CommentSubmission {
    pub comment: comment::Model,
    /// Set while the comment is waiting for moderation.
    pub notice: Option<&'static str>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            db,
            post_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a comment on a post the caller can see.
    ///
    /// Input is checked before the post is looked up. New comments always
    /// start out pending, whoever wrote them.
    pub async fn add(
        &self,
        caller: &Caller,
        post_id: &str,
        mut input: CommentInput,
    ) -> AppResult<CommentSubmission> {
        input.url = input.url.filter(|url| !url.trim().is_empty());
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let txn = self.db.begin().await.map_err(db_err)?;
        self.post_repo
            .lock_for_share(&txn, post_id)
            .await?
            .filter(|post| caller.can_see(post.status))
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            content: Set(input.content),
            author: Set(input.author),
            email: Set(input.email),
            url: Set(input.url),
            status: Set(CommentStatus::Pending),
            create_time: Set(Utc::now().into()),
        };
        let comment = self.comment_repo.insert(&txn, model).await?;
        txn.commit().await.map_err(db_err)?;

        info!(comment_id = %comment.id, post_id = %post_id, "Comment submitted for moderation");

        let notice = (comment.status == CommentStatus::Pending).then_some(MODERATION_NOTICE);
        Ok(CommentSubmission { comment, notice })
    }

    /// Number of approved comments on a post.
    pub async fn count(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_approved(post_id).await
    }

    /// Approved comments on a post, oldest first.
    pub async fn list_approved(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_approved_by_post(post_id).await
    }
}

fn db_err(e: sea_orm::DbErr) -> AppError {
    AppError::Database(e.to_string())
}
