//! Shopify Admin API client for the customer directory.
//!
//! # Architecture
//!
//! - Plain REST calls against `/admin/api/{version}/customers*` via `reqwest`
//! - Shopify is the source of truth - NO local copy, every request re-fetches
//! - Every call is bounded by the configured outbound timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use popup_relay::shopify::{AdminClient, CustomerLookup};
//!
//! let client = AdminClient::new(&config.shopify, config.outbound_timeout)?;
//!
//! match client.find_by_email("jane@x.com").await? {
//!     CustomerLookup::Found(customer) => println!("tags: {}", customer.tags),
//!     CustomerLookup::NotFound => println!("new customer"),
//! }
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect error, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client could not be built from configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ShopifyError {
    /// Build an [`ShopifyError::Api`] from a status and raw response body.
    pub(crate) fn api(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            message: format_rest_errors(body),
        }
    }
}

/// Flatten Shopify's REST error payloads into one line.
///
/// Shopify answers with either `{"errors": "Not Found"}` or a map of field
/// names to message lists, e.g. `{"errors": {"email": ["has already been taken"]}}`.
/// Anything else is returned verbatim.
fn format_rest_errors(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("errors") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Object(fields)) => fields
            .iter()
            .map(|(field, messages)| {
                let joined = match messages {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|m| m.as_str().map_or_else(|| m.to_string(), String::from))
                        .collect::<Vec<_>>()
                        .join(", "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if field == "base" {
                    joined
                } else {
                    format!("{field} {joined}")
                }
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}
