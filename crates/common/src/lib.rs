//! Common utilities and shared types for blog-rs.
//!
//! This crate provides foundational components used across all blog-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Tags**: Parsing, normalizing and diffing post tag strings via [`TagSet`]
//!
//! # Example
//!
//! ```no_run
//! use blog_common::{Config, IdGenerator, AppResult, TagSet};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id = IdGenerator::new().generate();
//!     let tags = TagSet::parse("rust, storage");
//!     println!("{id} listens on {} with tags {}", config.server.port, tags.normalized());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod tags;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use tags::{TagDelta, TagSet, escape_like};
