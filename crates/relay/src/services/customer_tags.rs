//! Idempotent customer upsert-and-tag.
//!
//! Look the customer up by email, then either leave an already-tagged record
//! alone, append the tag to an existing record, or create a new tagged
//! customer. A lookup failure stops the protocol: an unreachable directory
//! must never be mistaken for "no such customer".

use tracing::instrument;

use popup_relay_core::Tag;

use crate::shopify::{
    AdminClient, CustomerLookup, CustomerRecord, CustomerUpdate, NewCustomer, ShopifyError,
};

/// Fields to apply to the customer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl CustomerProfile {
    /// Placeholder names used for rebate-only customers.
    #[must_use]
    pub fn rebate_placeholder() -> Self {
        Self {
            first_name: "Rebate".to_string(),
            last_name: "User".to_string(),
            phone: None,
        }
    }
}

/// What to write when the customer already exists without the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Only append the tag; keep the stored names.
    TagsOnly,
    /// Append the tag and overwrite first/last name from the profile.
    TagsAndName,
}

/// Input to [`upsert_tagged_customer`].
#[derive(Debug, Clone)]
pub struct UpsertRequest<'a> {
    pub email: &'a str,
    pub tag: Tag,
    pub profile: CustomerProfile,
    pub policy: UpdatePolicy,
}

/// Result reported to the storefront as `shopifySuccess` / `shopifyData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub success: bool,
    pub customer: Option<CustomerRecord>,
}

impl UpsertOutcome {
    fn succeeded(customer: CustomerRecord) -> Self {
        Self {
            success: true,
            customer: Some(customer),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            customer: None,
        }
    }
}

/// Ensure a customer with `request.email` exists and carries `request.tag`.
///
/// Never fails: directory errors are logged and reported as
/// `success: false`.
#[instrument(skip(client, request), fields(email = %request.email, tag = %request.tag))]
pub async fn upsert_tagged_customer(
    client: &AdminClient,
    request: &UpsertRequest<'_>,
) -> UpsertOutcome {
    match try_upsert(client, request).await {
        Ok(customer) => UpsertOutcome::succeeded(customer),
        Err(e) => {
            tracing::error!(error = %e, "Customer upsert failed");
            UpsertOutcome::failed()
        }
    }
}

async fn try_upsert(
    client: &AdminClient,
    request: &UpsertRequest<'_>,
) -> Result<CustomerRecord, ShopifyError> {
    let existing = match client.find_by_email(request.email).await? {
        CustomerLookup::Found(customer) => customer,
        CustomerLookup::NotFound => {
            tracing::info!("Customer not found, creating");
            return client.create(&new_customer(request)).await;
        }
    };

    let mut tags = existing.tag_set();
    if !tags.insert(request.tag) {
        tracing::info!(customer_id = %existing.id, "Customer already tagged");
        return Ok(existing);
    }

    let update = match request.policy {
        UpdatePolicy::TagsOnly => CustomerUpdate {
            tags: tags.to_string(),
            ..Default::default()
        },
        UpdatePolicy::TagsAndName => CustomerUpdate {
            tags: tags.to_string(),
            first_name: Some(request.profile.first_name.clone()),
            last_name: Some(request.profile.last_name.clone()),
        },
    };

    client.update(existing.id, &update).await
}

fn new_customer(request: &UpsertRequest<'_>) -> NewCustomer {
    NewCustomer {
        email: request.email.to_string(),
        first_name: request.profile.first_name.clone(),
        last_name: request.profile.last_name.clone(),
        phone: request.profile.phone.clone(),
        tags: request.tag.to_string(),
        verified_email: true,
    }
}
