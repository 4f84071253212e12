//! User service.

use blog_common::{AppResult, IdGenerator};
use blog_db::{entities::user, repositories::UserRepository};
use tracing::{info, warn};

use crate::services::visibility::Caller;

/// Resolves bearer tokens to callers.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The caller behind `token`. Unknown tokens are guests.
    pub async fn authenticate(&self, token: &str) -> AppResult<Caller> {
        Ok(match self.user_repo.find_by_token(token).await? {
            Some(user) => Caller::User { id: user.id },
            None => {
                warn!("Unknown bearer token, continuing as guest");
                Caller::Guest
            }
        })
    }

    /// Create the configured initial user unless it already exists.
    pub async fn ensure_bootstrap_user(
        &self,
        username: &str,
        token: &str,
    ) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(username).await? {
            return Ok(existing);
        }

        let user = self
            .user_repo
            .create(
                self.id_gen.generate(),
                username.to_string(),
                Some(token.to_string()),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "Created bootstrap user");
        Ok(user)
    }
}
