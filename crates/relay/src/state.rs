//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::services::{EmailError, EmailService};
use crate::shopify::{AdminClient, ShopifyError};

/// Error building the outbound clients at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("email client: {0}")]
    Email(#[from] EmailError),
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds only immutable
/// configuration and the two outbound HTTP clients; no request writes to it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    email: EmailService,
    shopify: AdminClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Both clients share the configured outbound timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built from `config`.
    pub fn new(config: RelayConfig) -> Result<Self, StateError> {
        let email = EmailService::new(&config.email, config.outbound_timeout)?;
        let shopify = AdminClient::new(&config.shopify, config.outbound_timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                email,
                shopify,
            }),
        })
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the SendGrid client.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }
}
