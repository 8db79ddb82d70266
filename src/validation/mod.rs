//! Input validation rules shared by every form.
//!
//! Validators never fail on malformed input; a rejected value is an ordinary
//! return value carrying a [`Rejection`].

pub mod fields;
pub mod messages;
pub mod password;
pub mod phone;
pub mod rules;
pub mod validator;

use lazy_static::lazy_static;

pub use fields::{validate_quantity, validate_required};
pub use messages::{Locale, Rejection, RejectionKind};
pub use password::PasswordPolicy;
pub use phone::{normalize_phone, NormalizedPhone};
pub use rules::{FieldRules, FieldValues, Rule};
pub use validator::Validator;

pub type ValidationResult<T = ()> = Result<T, Rejection>;

lazy_static! {
    static ref DEFAULT_VALIDATOR: Validator = Validator::default();
}

/// Validates a mainland mobile number with the default virtual prefix set.
pub fn validate_phone(raw: &str) -> ValidationResult<NormalizedPhone> {
    DEFAULT_VALIDATOR.validate_phone(raw)
}

/// Validates a password against the default policy, reporting every failure.
pub fn validate_password(raw: &str) -> Result<(), Vec<Rejection>> {
    DEFAULT_VALIDATOR.validate_password(raw)
}

pub fn validate_confirmation(password: &str, confirmation: &str) -> ValidationResult {
    DEFAULT_VALIDATOR.validate_confirmation(password, confirmation)
}

pub fn validate_email(raw: &str) -> ValidationResult {
    DEFAULT_VALIDATOR.validate_email(raw)
}
