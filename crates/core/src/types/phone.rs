//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than ASCII digits.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The number of digits is outside the accepted range.
    #[error("phone number must have {min}-{max} digits (got {len})")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Digit count of the input.
        len: usize,
    },
}

/// A phone number consisting of 10 to 15 ASCII digits.
///
/// No separators, spaces or leading `+` are accepted; the popup strips those
/// before submitting.
///
/// ```
/// use popup_relay_core::Phone;
///
/// assert!(Phone::parse("5551234567").is_ok());
/// assert!(Phone::parse("12345").is_err());
/// assert!(Phone::parse("555-123-4567").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit characters,
    /// or has fewer than 10 or more than 15 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&s.len()) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                len: s.len(),
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Phone::parse("5551234567").is_ok());
        assert!(Phone::parse("15551234567").is_ok());
        assert!(Phone::parse("123456789012345").is_ok());
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            Phone::parse("12345"),
            Err(PhoneError::InvalidLength {
                min: 10,
                max: 15,
                len: 5
            })
        );
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Phone::parse("1234567890123456"),
            Err(PhoneError::InvalidLength { len: 16, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_formatting() {
        assert_eq!(Phone::parse("555-123-4567"), Err(PhoneError::NonDigit));
        assert_eq!(Phone::parse("+15551234567"), Err(PhoneError::NonDigit));
        assert_eq!(Phone::parse("555 123 4567"), Err(PhoneError::NonDigit));
        // Non-ASCII digits are rejected too
        assert_eq!(Phone::parse("５５５１２３４５６７"), Err(PhoneError::NonDigit));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
    }
}
