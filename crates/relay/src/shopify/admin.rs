//! Customer search, create and update against the Admin REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use popup_relay_core::CustomerId;

use super::ShopifyError;
use super::types::{
    CustomerEnvelope, CustomerLookup, CustomerRecord, CustomerSearchResponse, CustomerUpdate,
    NewCustomer,
};
use crate::config::ShopifyConfig;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Fallback wait when a 429 arrives without a usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Shopify Admin REST client scoped to the customer directory.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    /// e.g. `https://shop.myshopify.com/admin/api/2025-07`
    api_url: String,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::InvalidConfig(format!("Invalid access token: {e}")))?;
        token.set_sensitive(true);
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                api_url: config.admin_api_url(),
            }),
        })
    }

    /// Look up a customer by email address.
    ///
    /// Uses the customer search endpoint and picks the first result whose
    /// email matches exactly (ignoring case); Shopify's search is fuzzy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Shopify answers with a
    /// non-success status, or the body cannot be decoded. A successful empty
    /// search is `Ok(CustomerLookup::NotFound)`, never an error.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<CustomerLookup, ShopifyError> {
        let mut url = self.endpoint("customers/search.json")?;
        url.query_pairs_mut()
            .append_pair("query", &format!("email:{email}"));

        let response = self.inner.client.get(url).send().await?;
        let search: CustomerSearchResponse = read_json(response).await?;

        let found = search
            .customers
            .into_iter()
            .find(|customer| customer.has_email(email));

        Ok(match found {
            Some(customer) => {
                tracing::debug!(customer_id = %customer.id, "Customer found");
                CustomerLookup::Found(customer)
            }
            None => CustomerLookup::NotFound,
        })
    }

    /// Create a new customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects the customer
    /// (e.g. 422 for an invalid or duplicate email).
    #[instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn create(&self, customer: &NewCustomer) -> Result<CustomerRecord, ShopifyError> {
        let url = self.endpoint("customers.json")?;

        let response = self
            .inner
            .client
            .post(url)
            .json(&CustomerEnvelope { customer })
            .send()
            .await?;

        let created: CustomerEnvelope<CustomerRecord> = read_json(response).await?;
        tracing::info!(customer_id = %created.customer.id, "Customer created");
        Ok(created.customer)
    }

    /// Update tags (and optionally names) on an existing customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects the update.
    #[instrument(skip(self, update), fields(customer_id = %id, tags = %update.tags))]
    pub async fn update(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<CustomerRecord, ShopifyError> {
        let url = self.endpoint(&format!("customers/{id}.json"))?;

        let response = self
            .inner
            .client
            .put(url)
            .json(&CustomerEnvelope { customer: update })
            .send()
            .await?;

        let updated: CustomerEnvelope<CustomerRecord> = read_json(response).await?;
        tracing::info!("Customer updated");
        Ok(updated.customer)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ShopifyError> {
        Url::parse(&format!("{}/{path}", self.inner.api_url))
            .map_err(|e| ShopifyError::InvalidConfig(format!("Invalid Admin API URL: {e}")))
    }
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ShopifyError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ShopifyError::RateLimited(retry_after_secs(response.headers())));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ShopifyError::api(status.as_u16(), &body));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Parse Shopify's `Retry-After` header, which may be fractional (e.g. "2.0").
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // filtered to finite, non-negative
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| secs.ceil() as u64)
}
