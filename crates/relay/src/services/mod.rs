//! Side effects performed for each form submission.
//!
//! - `email` - SendGrid delivery of the rebate and quote emails
//! - `customer_tags` - Shopify customer upsert-and-tag

pub mod customer_tags;
pub mod email;

pub use customer_tags::{
    CustomerProfile, UpdatePolicy, UpsertOutcome, UpsertRequest, upsert_tagged_customer,
};
pub use email::{EmailError, EmailService};
