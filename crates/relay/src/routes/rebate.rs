//! Rebate form submission.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use popup_relay_core::Tag;

use super::FormOrJson;
use crate::error::{Result, add_breadcrumb};
use crate::models::RebateForm;
use crate::services::{CustomerProfile, UpdatePolicy, UpsertRequest, upsert_tagged_customer};
use crate::shopify::CustomerRecord;
use crate::state::AppState;

/// Response for a rebate submission.
///
/// Each flag reports one side effect; `200` does not imply both succeeded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateResponse {
    pub email_sent: bool,
    pub shopify_success: bool,
    pub shopify_data: Option<CustomerRecord>,
}

/// Email the rebate form and tag the customer.
///
/// POST /api/send-rebate
///
/// The email and the Shopify upsert run concurrently; neither failure
/// aborts the other.
#[instrument(skip(state, form))]
pub async fn send_rebate(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<RebateForm>,
) -> Result<Json<RebateResponse>> {
    let submission = form.validate()?;

    add_breadcrumb(
        "rebate",
        "Rebate form submitted",
        Some(&[("email", submission.email.as_str())]),
    );

    let upsert = UpsertRequest {
        email: &submission.email,
        tag: Tag::REBATE,
        profile: CustomerProfile::rebate_placeholder(),
        policy: UpdatePolicy::TagsOnly,
    };

    let (email_sent, customer) = tokio::join!(
        state
            .email()
            .send_rebate_form(&submission.email, &submission.pdf_url),
        upsert_tagged_customer(state.shopify(), &upsert),
    );

    tracing::info!(
        email = %submission.email,
        email_sent,
        shopify_success = customer.success,
        "Rebate request processed"
    );

    Ok(Json(RebateResponse {
        email_sent,
        shopify_success: customer.success,
        shopify_data: customer.customer,
    }))
}
