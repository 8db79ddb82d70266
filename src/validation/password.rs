use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::messages::Rejection;
use super::rules::{FieldRules, Rule};
use super::ValidationResult;

pub const DEFAULT_SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

lazy_static! {
    static ref UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
}

/// Composition rules for new passwords.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PasswordPolicy {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    #[serde(default = "default_true")]
    pub require_special: bool,
    #[serde(default = "default_special_characters")]
    pub special_characters: String,
}

fn default_min_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_special_characters() -> String {
    DEFAULT_SPECIAL_CHARACTERS.to_string()
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_uppercase: true,
            require_special: true,
            special_characters: default_special_characters(),
        }
    }
}

impl PasswordPolicy {
    /// The composition rules as a rule list, without a required check.
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = vec![Rule::MinLength(
            self.min_length,
            Rejection::PasswordTooShort {
                min: self.min_length,
            },
        )];
        if self.require_uppercase {
            rules.push(Rule::Pattern(UPPERCASE.clone(), Rejection::PasswordUppercase));
        }
        if self.require_special {
            rules.push(Rule::AnyOf(
                self.special_characters.clone(),
                Rejection::PasswordSpecial,
            ));
        }
        rules
    }

    pub fn field_rules(&self, field: &'static str) -> FieldRules {
        FieldRules::new(field).rules(self.rules())
    }
}

/// Succeeds only when both strings are identical.
pub fn check_confirmation(password: &str, confirmation: &str) -> ValidationResult {
    if password == confirmation {
        Ok(())
    } else {
        Err(Rejection::PasswordMismatch)
    }
}
