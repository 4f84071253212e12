//! Request extractors.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::{Method, request::Parts},
};
use blog_common::AppError;
use blog_core::Caller;

/// Authenticated caller extractor. Guests are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Caller);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        match parts.extensions.get::<Caller>() {
            Some(caller @ Caller::User { .. }) => Ok(Self(caller.clone())),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Caller extractor that falls back to [`Caller::Guest`].
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Caller);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Caller>()
                .cloned()
                .unwrap_or(Caller::Guest),
        ))
    }
}

/// JSON request body. Malformed bodies and missing fields are reported as
/// [`AppError::Validation`] instead of axum's plain-text 422.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Reject actions that change state when requested through a safe verb.
pub fn require_mutating(method: &Method) -> Result<(), AppError> {
    if method.is_safe() {
        Err(AppError::MethodNotAllowed(method.to_string()))
    } else {
        Ok(())
    }
}
