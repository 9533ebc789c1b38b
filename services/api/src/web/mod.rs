//! services/api/src/web/mod.rs
//!
//! The axum layer: handlers, auth, shared state, and the JSON failure type
//! every handler converts its errors into. No handler panics; every failure
//! becomes a `{"error": ...}` body or a placeholder content string.

pub mod auth;
pub mod chat;
pub mod conversations;
pub mod middleware;
pub mod providers;
pub mod rest;
pub mod sessions;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deep_content_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

/// The JSON error body every failed request carries.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// A handler failure: an HTTP status plus the message for the error body.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<PortError> for ApiFailure {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            PortError::Unauthorized => Self::new(
                StatusCode::FORBIDDEN,
                "You don't have permission to access this resource".to_string(),
            ),
            PortError::Provider(message) | PortError::Unexpected(message) => {
                Self::internal(message)
            }
        }
    }
}
