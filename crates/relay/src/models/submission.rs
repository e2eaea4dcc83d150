//! Rebate and quote form payloads.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use popup_relay_core::{Email, Phone};

/// Validation failures. The `Display` text is returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Missing email or pdfUrl")]
    MissingRebateFields,

    #[error("Missing required fields")]
    MissingQuoteFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid phone number format")]
    InvalidPhone,
}

/// Raw `POST /api/send-rebate` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// A rebate request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebateSubmission {
    /// Trimmed, lowercased recipient address. Presence is the only check.
    pub email: String,
    pub pdf_url: String,
}

impl RebateForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns `MissingRebateFields` if either field is absent or blank.
    pub fn validate(self) -> Result<RebateSubmission, SubmissionError> {
        match (present(self.email), present(self.pdf_url)) {
            (Some(email), Some(pdf_url)) => Ok(RebateSubmission {
                email: email.to_lowercase(),
                pdf_url,
            }),
            _ => Err(SubmissionError::MissingRebateFields),
        }
    }
}

/// Raw `POST /api/quote` body.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default)]
    pub collection_handle: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub variant_id: Option<String>,
}

/// A quote request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub product_title: String,
    pub collection_handle: Option<String>,
    pub variant_id: Option<String>,
}

impl QuoteForm {
    /// Validate the form.
    ///
    /// Presence is checked before format, so a request with a missing name
    /// and a malformed email reports the missing field.
    ///
    /// # Errors
    ///
    /// Returns `MissingQuoteFields`, `InvalidEmail` or `InvalidPhone`.
    pub fn validate(self) -> Result<QuoteSubmission, SubmissionError> {
        let (Some(first_name), Some(last_name), Some(email), Some(phone), Some(product_title)) = (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            present(self.phone),
            present(self.product_title),
        ) else {
            return Err(SubmissionError::MissingQuoteFields);
        };

        let email =
            Email::parse(&email.to_lowercase()).map_err(|_| SubmissionError::InvalidEmail)?;
        let phone = Phone::parse(&phone).map_err(|_| SubmissionError::InvalidPhone)?;

        Ok(QuoteSubmission {
            first_name,
            last_name,
            email,
            phone,
            product_title,
            collection_handle: present(self.collection_handle),
            variant_id: present(self.variant_id),
        })
    }
}

/// Accept a string or an unsigned integer. Liquid renders ids such as
/// `variant.id` as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Trim a field, treating blank as absent.
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quote_form() -> QuoteForm {
        QuoteForm {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("jane@x.com".to_string()),
            phone: Some("5551234567".to_string()),
            product_title: Some("Winch 9500".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rebate_form_uses_camel_case() {
        let form: RebateForm = serde_json::from_str(
            r#"{"email": " Jane@X.com ", "pdfUrl": "https://cdn.example.com/rebate.pdf"}"#,
        )
        .unwrap();
        let submission = form.validate().unwrap();
        assert_eq!(submission.email, "jane@x.com");
        assert_eq!(submission.pdf_url, "https://cdn.example.com/rebate.pdf");
    }

    #[test]
    fn test_rebate_form_missing_fields() {
        for body in [
            r"{}",
            r#"{"email": "jane@x.com"}"#,
            r#"{"pdfUrl": "https://cdn.example.com/rebate.pdf"}"#,
            r#"{"email": "   ", "pdfUrl": "https://cdn.example.com/rebate.pdf"}"#,
            r#"{"email": null, "pdfUrl": null}"#,
        ] {
            let form: RebateForm = serde_json::from_str(body).unwrap();
            assert_eq!(
                form.validate(),
                Err(SubmissionError::MissingRebateFields),
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_rebate_email_not_format_checked() {
        let form = RebateForm {
            email: Some("not-an-email".to_string()),
            pdf_url: Some("x".to_string()),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_quote_form_valid() {
        let submission = quote_form().validate().unwrap();
        assert_eq!(submission.email.as_str(), "jane@x.com");
        assert_eq!(submission.phone.as_str(), "5551234567");
        assert!(submission.collection_handle.is_none());
        assert!(submission.variant_id.is_none());
    }

    #[test]
    fn test_quote_form_missing_field() {
        let form = QuoteForm {
            product_title: Some(String::new()),
            ..quote_form()
        };
        assert_eq!(form.validate(), Err(SubmissionError::MissingQuoteFields));
    }

    #[test]
    fn test_quote_form_missing_checked_before_format() {
        let form = QuoteForm {
            first_name: None,
            email: Some("not-an-email".to_string()),
            ..quote_form()
        };
        assert_eq!(form.validate(), Err(SubmissionError::MissingQuoteFields));
    }

    #[test]
    fn test_quote_form_invalid_email() {
        let form = QuoteForm {
            email: Some("not-an-email".to_string()),
            ..quote_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");
    }

    #[test]
    fn test_quote_form_invalid_phone() {
        for phone in ["12345", "555-123-4567", "1234567890123456"] {
            let form = QuoteForm {
                phone: Some(phone.to_string()),
                ..quote_form()
            };
            let err = form.validate().unwrap_err();
            assert_eq!(err.to_string(), "Invalid phone number format", "phone: {phone}");
        }
    }

    #[test]
    fn test_quote_form_accepts_numeric_ids() {
        let form: QuoteForm = serde_json::from_str(
            r#"{
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@x.com",
                "phone": 5551234567,
                "product_title": "Winch 9500",
                "variant_id": 44012345678901
            }"#,
        )
        .unwrap();
        let submission = form.validate().unwrap();
        assert_eq!(submission.phone.as_str(), "5551234567");
        assert_eq!(submission.variant_id.as_deref(), Some("44012345678901"));
    }

    #[test]
    fn test_quote_form_rejects_other_id_types() {
        let result = serde_json::from_str::<QuoteForm>(r#"{"variant_id": {"id": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_quote_form_blank_optionals_are_none() {
        let form = QuoteForm {
            collection_handle: Some("  ".to_string()),
            variant_id: Some("44012345678901".to_string()),
            ..quote_form()
        };
        let submission = form.validate().unwrap();
        assert!(submission.collection_handle.is_none());
        assert_eq!(submission.variant_id.as_deref(), Some("44012345678901"));
    }
}
