//! Status endpoints.

use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

/// GET /
pub async fn index() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "Waldoch rebate popup API running",
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify or SendGrid.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
