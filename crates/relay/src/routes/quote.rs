//! Sales quote submission.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use popup_relay_core::Tag;

use super::FormOrJson;
use crate::error::{Result, add_breadcrumb};
use crate::models::QuoteForm;
use crate::services::{CustomerProfile, UpdatePolicy, UpsertRequest, upsert_tagged_customer};
use crate::shopify::CustomerRecord;
use crate::state::AppState;

/// Message when every side effect succeeded.
const SUCCESS_MESSAGE: &str = "Quote request submitted successfully!";

/// Message when at least one side effect failed.
const PARTIAL_MESSAGE: &str = "Quote request received, but some steps failed";

/// Response for a quote submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub message: &'static str,
    pub sales_email_sent: bool,
    pub confirmation_email_sent: bool,
    pub shopify_success: bool,
    pub shopify_data: Option<CustomerRecord>,
}

/// Notify sales, confirm to the customer and tag the customer.
///
/// POST /api/quote
///
/// The two emails and the Shopify upsert run concurrently. Validation
/// failures return 400 before any of them starts.
#[instrument(skip(state, form))]
pub async fn submit_quote(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<QuoteForm>,
) -> Result<Json<QuoteResponse>> {
    let quote = form.validate()?;

    add_breadcrumb(
        "quote",
        "Quote form submitted",
        Some(&[
            ("email", quote.email.as_str()),
            ("product", quote.product_title.as_str()),
        ]),
    );

    let upsert = UpsertRequest {
        email: quote.email.as_str(),
        tag: Tag::QUOTE_REQUEST,
        profile: CustomerProfile {
            first_name: quote.first_name.clone(),
            last_name: quote.last_name.clone(),
            phone: Some(quote.phone.to_string()),
        },
        policy: UpdatePolicy::TagsAndName,
    };

    let (sales_email_sent, confirmation_email_sent, customer) = tokio::join!(
        state.email().send_quote_notification(&quote),
        state.email().send_quote_confirmation(&quote),
        upsert_tagged_customer(state.shopify(), &upsert),
    );

    let message = if sales_email_sent && confirmation_email_sent && customer.success {
        SUCCESS_MESSAGE
    } else {
        PARTIAL_MESSAGE
    };

    tracing::info!(
        email = %quote.email,
        product = %quote.product_title,
        sales_email_sent,
        confirmation_email_sent,
        shopify_success = customer.success,
        "Quote request processed"
    );

    Ok(Json(QuoteResponse {
        message,
        sales_email_sent,
        confirmation_email_sent,
        shopify_success: customer.success,
        shopify_data: customer.customer,
    }))
}
