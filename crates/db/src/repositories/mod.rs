//! Repositories, one per table.

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use comment::CommentRepository;
pub use post::{PostRepository, PostSearch};
pub use tag::TagRepository;
pub use user::UserRepository;
