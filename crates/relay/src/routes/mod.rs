//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Status message
//! GET  /health            - Liveness check
//! POST /api/send-rebate   - Email the rebate form, tag customer "rebate"
//! POST /api/quote         - Notify sales, confirm to customer, tag "quote-request"
//! ```

pub mod quote;
pub mod rebate;
pub mod status;

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    routing::{get, post},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Form body extractor accepting JSON or `application/x-www-form-urlencoded`.
///
/// URL-encoded bodies are parsed as a form; anything else goes through the
/// JSON extractor. Rejections become an [`AppError`], so malformed bodies get
/// the same `{"error": ...}` shape as every other failure.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_url_encoded(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

fn is_url_encoded(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Create the form submission routes.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/send-rebate", post(rebate::send_rebate))
        .route("/quote", post(quote::submit_quote))
}

/// Create all routes for the relay.
///
/// `rate_limit` is applied to the form routes only, leaving the status
/// endpoints unthrottled for uptime probes.
pub fn routes(rate_limit: Option<RateLimiterLayer>) -> Router<AppState> {
    let forms = match rate_limit {
        Some(layer) => form_routes().layer(layer),
        None => form_routes(),
    };

    Router::new()
        .route("/", get(status::index))
        .route("/health", get(status::health))
        .nest("/api", forms)
        .fallback(status::not_found)
}
