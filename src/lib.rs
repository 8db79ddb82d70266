pub mod actions;
pub mod config;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod logging;
pub mod routes;
pub mod startup;
pub mod validation;

// Re-export commonly used types for easier access
pub use forms::{FieldErrors, FormKind};
pub use validation::{
    normalize_phone, validate_confirmation, validate_email, validate_password, validate_phone,
    Locale, Rejection, RejectionKind, Validator,
};
