//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;
pub mod visibility;

pub use comment::{CommentInput, CommentService, CommentSubmission, MODERATION_NOTICE};
pub use post::{PostInput, PostService, PostSummary};
pub use tag::{TagService, TagWeight};
pub use user::UserService;
pub use visibility::{Caller, is_visible};
