//! Database entities.

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use comment::Entity as Comment;
pub use post::Entity as Post;
pub use tag::Entity as Tag;
pub use user::Entity as User;
