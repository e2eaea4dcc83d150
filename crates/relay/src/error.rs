//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Every error response has the JSON shape
//! `{"error": "..."}` the storefront popup expects.
//!
//! Failures of the outbound mail and Shopify calls are not represented here;
//! handlers record them as flags in a successful response.

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::SubmissionError;

/// Application-level error type for the relay.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body could not be parsed as JSON of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Request body could not be parsed as a URL-encoded form.
    #[error("Invalid request body: {0}")]
    InvalidForm(#[from] FormRejection),

    /// Request failed validation. The message is shown to the client as-is.
    #[error("{0}")]
    BadRequest(String),

    /// Route does not exist.
    #[error("Not found")]
    NotFound,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Build the generic 500 response used for unhandled failures.
    #[must_use]
    pub fn internal() -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                error: "Internal Server Error".to_string(),
            }),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Internal(_) => {
                // Capture server errors to Sentry; never expose their detail
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                return ErrorBody::internal().into_response();
            }
            Self::InvalidBody(_) | Self::InvalidForm(_) => {
                tracing::warn!(error = %self, "Rejected request body");
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a form submission step.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
