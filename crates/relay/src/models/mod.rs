//! Request payloads accepted from the storefront popup.
//!
//! Raw forms deserialize leniently (every field optional) so that a missing
//! field produces the popup's own error message instead of a serde rejection.
//! Each form is validated into a submission type before any outbound call.

mod submission;

pub use submission::{
    QuoteForm, QuoteSubmission, RebateForm, RebateSubmission, SubmissionError,
};
