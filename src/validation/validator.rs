use std::collections::BTreeSet;
use std::sync::Arc;

use super::fields;
use super::messages::{Locale, Rejection};
use super::password::{check_confirmation, PasswordPolicy};
use super::phone::{check_phone, NormalizedPhone};
use super::rules::{FieldValues, Rule};
use super::ValidationResult;
use crate::config::ValidationConfig;
use crate::forms::{FormInput, FormKind, FormSchema, Violations};

/// The configured rule set shared by every form.
#[derive(Debug, Clone)]
pub struct Validator {
    locale: Locale,
    virtual_prefixes: Arc<BTreeSet<String>>,
    password_policy: PasswordPolicy,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            locale: config.locale,
            virtual_prefixes: Arc::new(config.virtual_prefixes.iter().cloned().collect()),
            password_policy: config.password.clone(),
        }
    }

    /// Locale used when a caller does not ask for one.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn virtual_prefixes(&self) -> &BTreeSet<String> {
        &self.virtual_prefixes
    }

    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.password_policy
    }

    pub fn validate_phone(&self, raw: &str) -> ValidationResult<NormalizedPhone> {
        check_phone(raw, &self.virtual_prefixes)
    }

    /// Like [`Validator::validate_phone`], but an empty value is accepted.
    pub fn validate_optional_phone(&self, raw: &str) -> ValidationResult<Option<NormalizedPhone>> {
        if raw.is_empty() {
            return Ok(None);
        }
        self.validate_phone(raw).map(Some)
    }

    /// Returns every unmet password rule, not just the first.
    pub fn validate_password(&self, raw: &str) -> Result<(), Vec<Rejection>> {
        let rejections = self
            .password_policy
            .field_rules("password")
            .evaluate(raw, &FieldValues::new());
        if rejections.is_empty() {
            Ok(())
        } else {
            Err(rejections)
        }
    }

    pub fn validate_confirmation(&self, password: &str, confirmation: &str) -> ValidationResult {
        check_confirmation(password, confirmation)
    }

    pub fn validate_email(&self, raw: &str) -> ValidationResult {
        fields::validate_email(raw)
    }

    /// Phone check as a rule, bound to this validator's prefix set.
    pub fn phone_rule(&self) -> Rule {
        let prefixes = Arc::clone(&self.virtual_prefixes);
        Rule::custom("china_mobile", move |value| {
            check_phone(value, &prefixes).map(|_| ())
        })
    }

    pub fn schema(&self, kind: FormKind) -> FormSchema {
        FormSchema::build(kind, self)
    }

    pub fn validate_values(&self, kind: FormKind, values: &FieldValues) -> Violations {
        self.schema(kind).evaluate(values)
    }

    pub fn validate<F: FormInput>(&self, form: &F) -> Violations {
        self.validate_values(F::KIND, &form.field_values())
    }
}
