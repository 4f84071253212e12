//! Who is asking, and which posts they may see.

use blog_common::{AppError, AppResult};
use blog_db::entities::post::PostStatus;

/// The identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No or unknown credentials.
    Guest,
    /// A user resolved from a bearer token.
    User { id: String },
}

impl Caller {
    /// Caller for a known user.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::User { id: id.into() }
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::User { id } => Some(id),
        }
    }

    /// The user id, or `Unauthorized` for guests.
    pub fn require_user(&self) -> AppResult<&str> {
        self.user_id().ok_or(AppError::Unauthorized)
    }

    /// Whether this caller may see a post with `status`.
    #[must_use]
    pub const fn can_see(&self, status: PostStatus) -> bool {
        is_visible(status, self.is_guest())
    }
}

/// Whether a post with `status` may be shown.
#[must_use]
pub const fn is_visible(status: PostStatus, caller_is_guest: bool) -> bool {
    !caller_is_guest || status.is_guest_visible()
}
