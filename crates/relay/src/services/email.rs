//! Transactional email over the SendGrid v3 mail API.
//!
//! Bodies are rendered from Askama HTML templates and posted to
//! `/v3/mail/send`. Delivery is best-effort: callers get a `bool`, and every
//! failure is logged with the provider's status and response body.

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::EmailConfig;
use crate::models::QuoteSubmission;

/// Subject of the rebate download email.
const REBATE_SUBJECT: &str = "Superwinch Rebate Form";

/// Subject of the customer-facing quote confirmation.
const QUOTE_CONFIRMATION_SUBJECT: &str = "Your Quote Request Has Been Received";

/// Shown in the sales notification for optional fields the popup left out.
const NOT_AVAILABLE: &str = "N/A";

/// HTML template for the rebate download email.
#[derive(Template)]
#[template(path = "email/rebate_form.html")]
struct RebateFormEmail<'a> {
    pdf_url: &'a str,
}

/// HTML template for the internal sales notification.
#[derive(Template)]
#[template(path = "email/quote_notification.html")]
struct QuoteNotificationEmail<'a> {
    product_title: &'a str,
    variant_id: &'a str,
    collection_handle: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
}

/// HTML template for the customer confirmation.
#[derive(Template)]
#[template(path = "email/quote_confirmation.html")]
struct QuoteConfirmationEmail<'a> {
    first_name: &'a str,
    last_name: &'a str,
    product_title: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SendGrid rejected the message.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The client could not be built from configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// SendGrid mail client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct EmailService {
    inner: Arc<EmailServiceInner>,
}

struct EmailServiceInner {
    client: reqwest::Client,
    send_url: Url,
    from_address: String,
    sales_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value, the API
    /// base URL cannot be extended, or the HTTP client fails to build.
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
            .map_err(|e| EmailError::InvalidConfig(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let send_url = Url::parse(&format!(
            "{}/v3/mail/send",
            config.api_base.as_str().trim_end_matches('/')
        ))
        .map_err(|e| EmailError::InvalidConfig(format!("Invalid mail API URL: {e}")))?;

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(EmailServiceInner {
                client,
                send_url,
                from_address: config.from_address.to_string(),
                sales_address: config.sales_address.to_string(),
            }),
        })
    }

    /// Send one HTML email.
    ///
    /// Returns `true` once SendGrid accepts the message. Any failure is
    /// logged and reported as `false`; nothing is retried.
    #[instrument(skip(self, html))]
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        match self.try_send(to, subject, html).await {
            Ok(()) => {
                tracing::info!("Email sent successfully");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Email sending failed");
                false
            }
        }
    }

    /// Send the rebate download link to a customer.
    pub async fn send_rebate_form(&self, to: &str, pdf_url: &str) -> bool {
        self.send_template(to, REBATE_SUBJECT, &RebateFormEmail { pdf_url })
            .await
    }

    /// Notify the sales inbox about a quote request.
    pub async fn send_quote_notification(&self, quote: &QuoteSubmission) -> bool {
        let template = QuoteNotificationEmail {
            product_title: &quote.product_title,
            variant_id: quote.variant_id.as_deref().unwrap_or(NOT_AVAILABLE),
            collection_handle: quote.collection_handle.as_deref().unwrap_or(NOT_AVAILABLE),
            first_name: &quote.first_name,
            last_name: &quote.last_name,
            email: quote.email.as_str(),
            phone: quote.phone.as_str(),
        };
        let subject = format!("Quote Request for {}", quote.product_title);

        self.send_template(&self.inner.sales_address, &subject, &template)
            .await
    }

    /// Confirm receipt of a quote request to the customer.
    pub async fn send_quote_confirmation(&self, quote: &QuoteSubmission) -> bool {
        let template = QuoteConfirmationEmail {
            first_name: &quote.first_name,
            last_name: &quote.last_name,
            product_title: &quote.product_title,
        };

        self.send_template(quote.email.as_str(), QUOTE_CONFIRMATION_SUBJECT, &template)
            .await
    }

    async fn send_template<T>(&self, to: &str, subject: &str, template: &T) -> bool
    where
        T: Template + Sync,
    {
        match template.render() {
            Ok(html) => self.send(to, subject, &html).await,
            Err(e) => {
                let err = EmailError::from(e);
                tracing::error!(to, subject, error = %err, "Email template failed to render");
                false
            }
        }
    }

    async fn try_send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let request = MailSendRequest {
            personalizations: [Personalization {
                to: [Address { email: to }],
            }],
            from: Address {
                email: &self.inner.from_address,
            },
            subject,
            content: [Content {
                kind: "text/html",
                value: html,
            }],
        };

        let response = self
            .inner
            .client
            .post(self.inner.send_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message: format_sendgrid_errors(&body),
            });
        }

        Ok(())
    }
}

/// `POST /v3/mail/send` body.
#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

/// SendGrid error body: `{"errors": [{"message": "...", "field": "..."}]}`.
#[derive(Debug, Deserialize)]
struct SendGridErrors {
    errors: Vec<SendGridErrorItem>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorItem {
    message: String,
    #[serde(default)]
    field: Option<String>,
}

/// Join SendGrid's error messages, falling back to the raw body.
fn format_sendgrid_errors(body: &str) -> String {
    match serde_json::from_str::<SendGridErrors>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|item| match item.field {
                Some(field) => format!("{field}: {}", item.message),
                None => item.message,
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}
