//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Nothing left after stripping separators.
    #[error("phone number cannot be empty")]
    Empty,
    /// A character other than digits, a leading `+`, or separators.
    #[error("phone number may only contain digits and an optional leading +")]
    InvalidCharacter,
    /// The first digit is zero.
    #[error("phone number cannot start with 0")]
    LeadingZero,
    /// More than 16 digits.
    #[error("phone number must have at most {max} digits")]
    TooLong {
        /// Maximum digit count.
        max: usize,
    },
}

/// A loosely validated phone number.
///
/// Spaces, dashes and parentheses are accepted as separators and ignored
/// during validation. The remaining text must be an optional `+` followed by
/// 1-16 digits, the first of which is not `0`. The original input is kept
/// verbatim for display.
///
/// ```
/// use bmart_core::Phone;
///
/// assert!(Phone::parse("+1 (234) 567-890").is_ok());
/// assert!(Phone::parse("0123").is_err());
/// assert!(Phone::parse("12ab").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 16;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')') && !c.is_whitespace())
            .collect();

        let digits = compact.strip_prefix('+').unwrap_or(&compact);

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }

        if digits.starts_with('0') {
            return Err(PhoneError::LeadingZero);
        }

        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert!(Phone::parse("+1234567890").is_ok());
        assert!(Phone::parse("555-123-4567").is_ok());
        assert!(Phone::parse("(555) 123 4567").is_ok());
        assert!(Phone::parse("7").is_ok());
        assert!(Phone::parse("1234567890123456").is_ok());
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("+"), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("555.123"), Err(PhoneError::InvalidCharacter));
        assert_eq!(Phone::parse("++1234"), Err(PhoneError::InvalidCharacter));
        assert_eq!(Phone::parse("0555"), Err(PhoneError::LeadingZero));
        assert_eq!(
            Phone::parse("12345678901234567"),
            Err(PhoneError::TooLong { max: 16 })
        );
    }

    #[test]
    fn test_keeps_original_text() {
        let phone = Phone::parse("+1 (234) 567-890").map(|p| p.to_string());
        assert_eq!(phone.as_deref(), Ok("+1 (234) 567-890"));
    }
}
