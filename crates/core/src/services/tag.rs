//! Tag frequency service.

use blog_common::{AppResult, IdGenerator, TagDelta, TagSet};
use blog_db::repositories::TagRepository;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::debug;

/// Upper bound for `limit` on tag listings.
pub const MAX_TAG_LIMIT: u64 = 100;

/// Default number of suggestions.
pub const DEFAULT_SUGGEST_LIMIT: u64 = 20;

/// A tag in the tag cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWeight {
    pub name: String,
    pub frequency: i32,
    /// Display weight, from 8 upwards.
    pub weight: i64,
}

/// Keeps the `tag` table in step with the tag sets of stored posts.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Account for a post's tags changing from `old` to `new`.
    ///
    /// Must run inside the transaction that writes the post.
    pub async fn apply<C: ConnectionTrait>(
        &self,
        conn: &C,
        old: &TagSet,
        new: &TagSet,
    ) -> AppResult<TagDelta> {
        let delta = TagDelta::between(old, new);
        if delta.is_empty() {
            return Ok(delta);
        }

        for name in &delta.added {
            self.tag_repo
                .increment(conn, self.id_gen.generate(), name)
                .await?;
        }
        self.tag_repo.decrement(conn, &delta.removed).await?;

        debug!(added = ?delta.added, removed = ?delta.removed, "Applied tag delta");
        Ok(delta)
    }

    /// Number of stored posts carrying `name`.
    pub async fn frequency(&self, name: &str) -> AppResult<i32> {
        Ok(self
            .tag_repo
            .find_by_name(name)
            .await?
            .map_or(0, |tag| tag.frequency))
    }

    /// The `limit` most frequent tags with display weights, sorted by name.
    pub async fn cloud(&self, limit: u64) -> AppResult<Vec<TagWeight>> {
        let tags = self.tag_repo.find_top(limit.clamp(1, MAX_TAG_LIMIT)).await?;
        let total: i64 = tags.iter().map(|t| i64::from(t.frequency)).sum();

        let mut cloud: Vec<TagWeight> = tags
            .into_iter()
            .map(|t| TagWeight {
                weight: 8 + 16 * i64::from(t.frequency) / (total + 10),
                name: t.name,
                frequency: t.frequency,
            })
            .collect();
        cloud.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(cloud)
    }

    /// Names of tags containing `keyword`, most frequent first.
    pub async fn suggest(&self, keyword: &str, limit: Option<u64>) -> AppResult<Vec<String>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit.unwrap_or(DEFAULT_SUGGEST_LIMIT).clamp(1, MAX_TAG_LIMIT);
        Ok(self
            .tag_repo
            .suggest(keyword, limit)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }
}
