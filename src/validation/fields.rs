use lazy_static::lazy_static;
use regex::Regex;

use super::messages::Rejection;
use super::ValidationResult;

lazy_static! {
    // ASCII letters in either case, matching the front ends' case-insensitive pattern
    pub static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// Validates `local-part@domain.tld` shape.
pub fn validate_email(raw: &str) -> ValidationResult {
    if EMAIL_PATTERN.is_match(raw) {
        Ok(())
    } else {
        Err(Rejection::EmailInvalid)
    }
}

/// Rejects empty values. Whitespace counts as input.
pub fn validate_required(raw: &str, rejection: Rejection) -> ValidationResult {
    if raw.is_empty() {
        Err(rejection)
    } else {
        Ok(())
    }
}

/// Parses a strictly positive whole quantity.
pub fn validate_quantity(raw: &str) -> ValidationResult<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::QuantityRequired);
    }
    match trimmed.parse::<u32>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(Rejection::QuantityNotPositive),
    }
}
