//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A named view and the data to render it with.
#[derive(Debug, Serialize)]
pub struct Rendered<T: Serialize> {
    /// View name, e.g. `index` or `view`.
    pub view: &'static str,
    /// Payload handed to the view.
    pub data: T,
    /// Message to show alongside the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

/// One-shot message shown with the next rendered view.
#[derive(Debug, Serialize)]
pub struct Flash {
    /// Lookup key, e.g. `commentSubmitted`.
    pub key: &'static str,
    /// Text shown to the user.
    pub message: String,
}

impl<T: Serialize> Rendered<T> {
    /// Render `view` with `data` and no flash.
    pub const fn new(view: &'static str, data: T) -> Self {
        Self {
            view,
            data,
            flash: None,
        }
    }

    /// Attach a flash message.
    #[must_use]
    pub fn with_flash(mut self, key: &'static str, message: impl Into<String>) -> Self {
        self.flash = Some(Flash {
            key,
            message: message.into(),
        });
        self
    }
}

impl<T: Serialize> IntoResponse for Rendered<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
