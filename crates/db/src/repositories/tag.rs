//! Tag frequency repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use blog_common::{AppError, AppResult, escape_like};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, OnConflict},
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Count one more post carrying `name`.
    ///
    /// Inserts the row with frequency 1, or bumps the existing row in the same
    /// statement, so two writers adding the same new tag cannot both insert.
    /// `id` is only used when the row is created.
    pub async fn increment<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: String,
        name: &str,
    ) -> AppResult<()> {
        let model = tag::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            frequency: Set(1),
        };

        Tag::insert(model)
            .on_conflict(
                OnConflict::column(tag::Column::Name)
                    .value(
                        tag::Column::Frequency,
                        Expr::col((Tag, tag::Column::Frequency)).add(1),
                    )
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Count one fewer post for each of `names`, then drop rows that reached zero.
    pub async fn decrement<C: ConnectionTrait>(
        &self,
        conn: &C,
        names: &[String],
    ) -> AppResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        Tag::update_many()
            .col_expr(
                tag::Column::Frequency,
                Expr::col(tag::Column::Frequency).sub(1),
            )
            .filter(tag::Column::Name.is_in(names.iter().cloned()))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Tag::delete_many()
            .filter(tag::Column::Frequency.lte(0))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find a tag row by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most frequent tags, ties broken by name.
    pub async fn find_top(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_desc(tag::Column::Frequency)
            .order_by_asc(tag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags whose name contains `keyword`, most frequent first.
    pub async fn suggest(&self, keyword: &str, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.like(format!("%{}%", escape_like(keyword))))
            .order_by_desc(tag::Column::Frequency)
            .order_by_asc(tag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
