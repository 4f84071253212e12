//! HTTP API layer for blog-rs.
//!
//! - **Endpoints**: posts, comments and tags
//! - **Extractors**: the caller resolved by the auth middleware
//! - **Middleware**: bearer token authentication, shared [`middleware::AppState`]
//! - **Responses**: rendered views with optional flash messages
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
