//! Mainland China mobile number validation.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::messages::Rejection;
use super::ValidationResult;

/// Prefixes allocated to virtual (MVNO) carriers.
pub const DEFAULT_VIRTUAL_PREFIXES: [&str; 6] = ["170", "171", "162", "165", "166", "167"];

const COUNTRY_CODE: &str = "86";
const NATIONAL_LENGTH: usize = 11;

lazy_static! {
    // `\d` would also accept non-ASCII digits
    static ref MOBILE_PATTERN: Regex = Regex::new(r"^1[3-9][0-9]{9}$").unwrap();
}

/// An 11-digit mainland mobile number with whitespace and country code removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// First three digits, used for carrier checks.
    pub fn prefix(&self) -> &str {
        &self.0[..3]
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips whitespace and a leading `+86`, or a leading `86` when the number is
/// longer than a national number. A bare 11-digit number starting with `86`
/// keeps its digits.
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(rest) = compact.strip_prefix("+86") {
        return rest.to_string();
    }

    if compact.starts_with(COUNTRY_CODE) && compact.chars().count() > NATIONAL_LENGTH {
        return compact[COUNTRY_CODE.len()..].to_string();
    }

    compact
}

/// Validates a phone number against the mobile pattern and the given virtual
/// prefix set.
pub fn check_phone(raw: &str, virtual_prefixes: &BTreeSet<String>) -> ValidationResult<NormalizedPhone> {
    if raw.is_empty() {
        return Err(Rejection::PhoneRequired);
    }

    let normalized = normalize_phone(raw);
    if normalized.is_empty() {
        return Err(Rejection::PhoneRequired);
    }

    if !MOBILE_PATTERN.is_match(&normalized) {
        return Err(Rejection::PhoneFormat);
    }

    let phone = NormalizedPhone(normalized);
    if virtual_prefixes.contains(phone.prefix()) {
        return Err(Rejection::PhoneVirtual);
    }

    Ok(phone)
}

pub fn default_virtual_prefixes() -> BTreeSet<String> {
    DEFAULT_VIRTUAL_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}
