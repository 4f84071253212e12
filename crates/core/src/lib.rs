//! Core business logic for blog-rs.

pub mod pagination;
pub mod services;

pub use pagination::Page;
pub use services::*;
