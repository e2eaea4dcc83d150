//! Customer types for the Shopify Admin REST API.
//!
//! Only the fields the relay reads or writes are modelled; Shopify ignores
//! absent fields on write and the relay ignores unknown fields on read.

use popup_relay_core::{CustomerId, TagSet};
use serde::{Deserialize, Deserializer, Serialize};

/// A customer as stored in the Shopify customer directory.
///
/// Returned to the storefront verbatim as `shopifyData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Shopify customer ID.
    pub id: CustomerId,
    /// Primary email address.
    #[serde(default)]
    pub email: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Phone number in E.164 format.
    #[serde(default)]
    pub phone: Option<String>,
    /// Comma-joined tag list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub verified_email: bool,
}

impl CustomerRecord {
    /// Parse the comma-joined tag list.
    #[must_use]
    pub fn tag_set(&self) -> TagSet {
        TagSet::parse(&self.tags)
    }

    /// Returns true if the record's email matches `email`, ignoring case.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(email.trim()))
    }
}

/// Outcome of a lookup by email.
///
/// Transport and API failures are reported as `Err(ShopifyError)` alongside
/// this type, so `NotFound` always means Shopify answered with no match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLookup {
    /// A customer with the requested email exists.
    Found(CustomerRecord),
    /// Shopify has no customer with that email.
    NotFound,
}

/// Fields for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub tags: String,
    pub verified_email: bool,
}

/// Fields for updating an existing customer.
///
/// `None` fields are left untouched by Shopify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerUpdate {
    pub tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// `{"customer": ...}` wrapper used by create/update requests and responses.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CustomerEnvelope<T> {
    pub customer: T,
}

/// Response of `GET /customers/search.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct CustomerSearchResponse {
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
