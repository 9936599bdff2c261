//! Checkout form input validation
//!
//! Phone and email checks used by the checkout state machine. A failed
//! check never aborts the flow; the caller re-prompts the same step.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone number is not `+` followed by 11 digits (or 11 bare digits)
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Email does not look like local@domain
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Optional leading `+`, then exactly 11 digits (e.g. `+79991234567`)
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{11}$").expect("Failed to compile phone regex"));

/// Conventional local@domain shape with a dotted domain part
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("Failed to compile email regex")
});

/// Validates a phone number entered during checkout.
///
/// Accepts 11 digits with an optional leading `+`. Spaces and dashes are
/// stripped first so `+7 999 123 45 67` passes too (contact-share buttons
/// deliver numbers with separators).
pub fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let normalized: String = input.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect();
    if PHONE_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidPhone(input.to_string()))
    }
}

/// Validates an email address entered during checkout.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if EMAIL_REGEX.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidEmail(input.to_string()))
    }
}
