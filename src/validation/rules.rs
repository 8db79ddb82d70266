//! Declarative per-field rules.
//!
//! A rule is a predicate paired with the [`Rejection`] it reports. Rules carry
//! no knowledge of any UI binding; [`FieldRules::describe`] exposes them as
//! plain data so a front end can map them onto its own form library.

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::messages::{Locale, Rejection};

pub type CustomCheck = Arc<dyn Fn(&str) -> Result<(), Rejection> + Send + Sync>;

#[derive(Clone)]
pub enum Rule {
    /// At least `n` characters.
    MinLength(usize, Rejection),
    /// At most `n` characters.
    MaxLength(usize, Rejection),
    /// The pattern must match somewhere in the value; anchor it for a full match.
    Pattern(Regex, Rejection),
    /// At least one character of the set must appear.
    AnyOf(String, Rejection),
    /// Must equal the value of another field in the same form.
    Matches(&'static str, Rejection),
    /// Named check that picks its own rejection.
    Custom(&'static str, CustomCheck),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::MinLength(n, r) => f.debug_tuple("MinLength").field(n).field(r).finish(),
            Rule::MaxLength(n, r) => f.debug_tuple("MaxLength").field(n).field(r).finish(),
            Rule::Pattern(re, r) => f.debug_tuple("Pattern").field(&re.as_str()).field(r).finish(),
            Rule::AnyOf(set, r) => f.debug_tuple("AnyOf").field(set).field(r).finish(),
            Rule::Matches(other, r) => f.debug_tuple("Matches").field(other).field(r).finish(),
            Rule::Custom(name, _) => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

impl Rule {
    pub fn custom<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Rule::Custom(name, Arc::new(check))
    }

    pub fn check(&self, value: &str, form: &FieldValues) -> Result<(), Rejection> {
        match self {
            Rule::MinLength(min, rejection) => {
                if value.chars().count() < *min {
                    return Err(*rejection);
                }
            }
            Rule::MaxLength(max, rejection) => {
                if value.chars().count() > *max {
                    return Err(*rejection);
                }
            }
            Rule::Pattern(re, rejection) => {
                if !re.is_match(value) {
                    return Err(*rejection);
                }
            }
            Rule::AnyOf(set, rejection) => {
                if !value.chars().any(|c| set.contains(c)) {
                    return Err(*rejection);
                }
            }
            Rule::Matches(other, rejection) => {
                if value != form.get(other) {
                    return Err(*rejection);
                }
            }
            Rule::Custom(_, check) => check(value)?,
        }
        Ok(())
    }

    pub fn describe(&self, locale: Locale) -> RuleDescription {
        let (rule, value, rejection) = match self {
            Rule::MinLength(n, r) => ("min_length", json!(n), Some(r)),
            Rule::MaxLength(n, r) => ("max_length", json!(n), Some(r)),
            Rule::Pattern(re, r) => ("pattern", json!(re.as_str()), Some(r)),
            Rule::AnyOf(set, r) => ("any_of", json!(set), Some(r)),
            Rule::Matches(other, r) => ("matches", json!(other), Some(r)),
            Rule::Custom(name, _) => ("custom", json!(name), None),
        };
        RuleDescription {
            rule,
            value,
            reason: rejection.copied(),
            message: rejection.map(|r| r.message(locale)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleDescription {
    pub rule: &'static str,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The rules of one form field.
///
/// An empty value short-circuits: it yields only the `required` rejection when
/// one is set, nothing when the field is optional, and otherwise falls through
/// to the ordinary rules.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: &'static str,
    required: Option<Rejection>,
    optional: bool,
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            required: None,
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self, rejection: Rejection) -> Self {
        self.required = Some(rejection);
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = None;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Evaluates every rule and returns all failures in declaration order.
    pub fn evaluate(&self, value: &str, form: &FieldValues) -> Vec<Rejection> {
        if value.is_empty() {
            if let Some(required) = self.required {
                return vec![required];
            }
            if self.optional {
                return Vec::new();
            }
        }

        self.rules
            .iter()
            .filter_map(|rule| rule.check(value, form).err())
            .collect()
    }

    pub fn describe(&self, locale: Locale) -> Value {
        json!({
            "field": self.field,
            "required": self.required.map(|r| json!({
                "reason": r,
                "message": r.message(locale),
            })),
            "optional": self.optional,
            "rules": self.rules.iter().map(|r| r.describe(locale)).collect::<Vec<_>>(),
        })
    }
}

/// Raw string values of a submitted form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>")]
pub struct FieldValues(BTreeMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Missing fields read as empty, the same as an absent form input.
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }
}

impl TryFrom<BTreeMap<String, Value>> for FieldValues {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let mut values = BTreeMap::new();
        for (field, value) in raw {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!("Field '{}' must be a scalar value", field));
                }
            };
            values.insert(field, text);
        }
        Ok(FieldValues(values))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        FieldValues(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
