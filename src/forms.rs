//! Form payloads and the rule table for each form.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::validation::fields::EMAIL_PATTERN;
use crate::validation::{FieldRules, FieldValues, Locale, Rejection, Rule, Validator};

const FULL_NAME_MAX_LENGTH: usize = 30;
const PHONE_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Login,
    Register,
    Signup,
    PasswordRecovery,
    PasswordResetConfirm,
    Item,
    UserUpdate,
    SmsCode,
}

impl FormKind {
    pub const ALL: [FormKind; 8] = [
        FormKind::Login,
        FormKind::Register,
        FormKind::Signup,
        FormKind::PasswordRecovery,
        FormKind::PasswordResetConfirm,
        FormKind::Item,
        FormKind::UserUpdate,
        FormKind::SmsCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Login => "login",
            FormKind::Register => "register",
            FormKind::Signup => "signup",
            FormKind::PasswordRecovery => "password-recovery",
            FormKind::PasswordResetConfirm => "password-reset-confirm",
            FormKind::Item => "item",
            FormKind::UserUpdate => "user-update",
            FormKind::SmsCode => "sms-code",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown form '{}'", s))
    }
}

/// Rejections collected for a form, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<(&'static str, Rejection)>);

impl Violations {
    pub fn push(&mut self, field: &'static str, rejection: Rejection) {
        self.0.push((field, rejection));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str, rejection: Rejection) -> bool {
        self.0.iter().any(|(f, r)| *f == field && *r == rejection)
    }

    pub fn for_field(&self, field: &str) -> Vec<Rejection> {
        self.0
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Rejection)> {
        self.0.iter()
    }

    /// Renders the rejections into the caller-facing field → messages map.
    pub fn localize(&self, locale: Locale) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for (field, rejection) in &self.0 {
            errors.add(field, rejection.message(locale));
        }
        errors
    }
}

/// Field name → human readable reasons. Empty means every field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// The ordered field rules of one form.
#[derive(Debug, Clone)]
pub struct FormSchema {
    kind: FormKind,
    fields: Vec<FieldRules>,
}

impl FormSchema {
    pub fn build(kind: FormKind, validator: &Validator) -> Self {
        let email = || Rule::Pattern(EMAIL_PATTERN.clone(), Rejection::EmailInvalid);
        let password = validator.password_policy().rules();

        let fields = match kind {
            FormKind::Login => vec![
                FieldRules::new("username").required(Rejection::UsernameRequired),
                FieldRules::new("password").required(Rejection::PasswordRequired),
            ],
            FormKind::Register => vec![
                FieldRules::new("email").rule(email()),
                FieldRules::new("password").rules(password),
            ],
            FormKind::Signup => vec![
                FieldRules::new("full_name").required(Rejection::FullNameRequired),
                FieldRules::new("email")
                    .required(Rejection::EmailRequired)
                    .rule(email()),
                FieldRules::new("phone")
                    .required(Rejection::PhoneRequired)
                    .rule(validator.phone_rule()),
                FieldRules::new("password")
                    .required(Rejection::PasswordRequired)
                    .rules(password),
                FieldRules::new("confirm_password")
                    .required(Rejection::ConfirmationRequired)
                    .rule(Rule::Matches("password", Rejection::PasswordMismatch)),
                FieldRules::new("sms_code").required(Rejection::SmsCodeRequired),
            ],
            FormKind::PasswordRecovery => vec![FieldRules::new("email")
                .required(Rejection::EmailRequired)
                .rule(email())],
            FormKind::PasswordResetConfirm => vec![
                FieldRules::new("token").required(Rejection::TokenRequired),
                FieldRules::new("password").rules(password),
                FieldRules::new("password_confirm")
                    .rule(Rule::Matches("password", Rejection::PasswordMismatch)),
            ],
            FormKind::Item => vec![
                FieldRules::new("name").required(Rejection::NameRequired),
                FieldRules::new("description").required(Rejection::DescriptionRequired),
                FieldRules::new("quantity")
                    .required(Rejection::QuantityRequired)
                    .rule(Rule::custom("positive_integer", |value| {
                        crate::validation::validate_quantity(value).map(|_| ())
                    })),
            ],
            FormKind::UserUpdate => vec![
                FieldRules::new("full_name").optional().rule(Rule::MaxLength(
                    FULL_NAME_MAX_LENGTH,
                    Rejection::FieldTooLong {
                        max: FULL_NAME_MAX_LENGTH,
                    },
                )),
                FieldRules::new("email")
                    .required(Rejection::EmailRequired)
                    .rule(email()),
                FieldRules::new("phone")
                    .optional()
                    .rule(Rule::MaxLength(
                        PHONE_MAX_LENGTH,
                        Rejection::FieldTooLong {
                            max: PHONE_MAX_LENGTH,
                        },
                    ))
                    .rule(validator.phone_rule()),
            ],
            FormKind::SmsCode => vec![FieldRules::new("phone")
                .required(Rejection::PhoneRequired)
                .rule(validator.phone_rule())],
        };

        Self { kind, fields }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    pub fn evaluate(&self, values: &FieldValues) -> Violations {
        let mut violations = Violations::default();
        for field in &self.fields {
            for rejection in field.evaluate(values.get(field.field()), values) {
                violations.push(field.field(), rejection);
            }
        }
        violations
    }

    pub fn describe(&self, locale: Locale) -> Value {
        json!({
            "form": self.kind,
            "fields": self.fields.iter().map(|f| f.describe(locale)).collect::<Vec<_>>(),
        })
    }
}

/// A typed form whose raw values can be checked against its [`FormSchema`].
pub trait FormInput {
    const KIND: FormKind;

    fn field_values(&self) -> FieldValues;
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl FormInput for LoginForm {
    const KIND: FormKind = FormKind::Login;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("username", self.username.as_str())
            .with("password", self.password.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

impl FormInput for RegisterForm {
    const KIND: FormKind = FormKind::Register;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("email", self.email.as_str())
            .with("password", self.password.as_str())
    }
}

/// Phone sign-up with an SMS verification code.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub sms_code: String,
}

impl FormInput for SignupForm {
    const KIND: FormKind = FormKind::Signup;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("full_name", self.full_name.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.as_str())
            .with("password", self.password.as_str())
            .with("confirm_password", self.confirm_password.as_str())
            .with("sms_code", self.sms_code.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordRecoveryForm {
    pub email: String,
}

impl FormInput for PasswordRecoveryForm {
    const KIND: FormKind = FormKind::PasswordRecovery;

    fn field_values(&self) -> FieldValues {
        FieldValues::new().with("email", self.email.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordResetConfirmForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

impl FormInput for PasswordResetConfirmForm {
    const KIND: FormKind = FormKind::PasswordResetConfirm;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("token", self.token.as_str())
            .with("password", self.password.as_str())
            .with("password_confirm", self.password_confirm.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub quantity: String,
}

impl FormInput for ItemForm {
    const KIND: FormKind = FormKind::Item;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("quantity", self.quantity.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserUpdateForm {
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

impl FormInput for UserUpdateForm {
    const KIND: FormKind = FormKind::UserUpdate;

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("full_name", self.full_name.as_deref().unwrap_or(""))
            .with("email", self.email.as_str())
            .with("phone", self.phone.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SmsCodeRequest {
    pub phone: String,
}

impl FormInput for SmsCodeRequest {
    const KIND: FormKind = FormKind::SmsCode;

    fn field_values(&self) -> FieldValues {
        FieldValues::new().with("phone", self.phone.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::default()
    }

    #[test]
    fn test_form_kind_names() {
        for kind in FormKind::ALL {
            assert_eq!(kind.as_str().parse::<FormKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.as_str().to_string())
            );
        }
        assert!("dashboard".parse::<FormKind>().is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let violations = validator().validate(&LoginForm::default());
        assert!(violations.contains("username", Rejection::UsernameRequired));
        assert!(violations.contains("password", Rejection::PasswordRequired));
        assert_eq!(violations.len(), 2);

        let ok = LoginForm {
            username: "alice@example.com".to_string(),
            password: "x".to_string(),
        };
        assert!(validator().validate(&ok).is_empty());
    }

    #[test]
    fn test_whitespace_counts_as_input() {
        let form = LoginForm {
            username: "alice".to_string(),
            password: "   ".to_string(),
        };
        assert!(validator().validate(&form).is_empty());

        let signup = SignupForm {
            phone: "   ".to_string(),
            ..SignupForm::default()
        };
        assert_eq!(
            validator().validate(&signup).for_field("phone"),
            vec![Rejection::PhoneRequired]
        );

        let update = UserUpdateForm {
            full_name: Some(" ".to_string()),
            email: "user@example.com".to_string(),
            phone: Some(" ".to_string()),
        };
        assert_eq!(
            validator().validate(&update).for_field("phone"),
            vec![Rejection::PhoneRequired]
        );
        assert!(validator().validate(&update).for_field("full_name").is_empty());
    }

    #[test]
    fn test_register_reports_all_password_failures() {
        let form = RegisterForm {
            email: "not-an-email".to_string(),
            password: "abcdefgh".to_string(),
        };
        let violations = validator().validate(&form);
        assert_eq!(violations.for_field("email"), vec![Rejection::EmailInvalid]);
        assert_eq!(
            violations.for_field("password"),
            vec![Rejection::PasswordUppercase, Rejection::PasswordSpecial]
        );
    }

    #[test]
    fn test_signup() {
        let mut form = SignupForm {
            full_name: "张三".to_string(),
            email: "zhang@example.cn".to_string(),
            phone: "+86 139 1234 5678".to_string(),
            password: "Abcdefg!".to_string(),
            confirm_password: "Abcdefg!".to_string(),
            sms_code: "123456".to_string(),
        };
        assert!(validator().validate(&form).is_empty());

        form.phone = "17012345678".to_string();
        form.confirm_password = "Abcdefg".to_string();
        form.sms_code.clear();
        let violations = validator().validate(&form);
        assert_eq!(violations.for_field("phone"), vec![Rejection::PhoneVirtual]);
        assert_eq!(
            violations.for_field("confirm_password"),
            vec![Rejection::PasswordMismatch]
        );
        assert_eq!(
            violations.for_field("sms_code"),
            vec![Rejection::SmsCodeRequired]
        );
    }

    #[test]
    fn test_signup_empty_fields_only_report_required() {
        let violations = validator().validate(&SignupForm::default());
        assert_eq!(violations.for_field("phone"), vec![Rejection::PhoneRequired]);
        assert_eq!(
            violations.for_field("password"),
            vec![Rejection::PasswordRequired]
        );
        assert_eq!(
            violations.for_field("confirm_password"),
            vec![Rejection::ConfirmationRequired]
        );
        assert_eq!(violations.len(), 6);
    }

    #[test]
    fn test_password_reset_confirm_mismatch() {
        let form = PasswordResetConfirmForm {
            token: "reset-token".to_string(),
            password: "Abcdefg!".to_string(),
            password_confirm: "Abcdefg?".to_string(),
        };
        let violations = validator().validate(&form);
        assert_eq!(violations.len(), 1);
        assert!(violations.contains("password_confirm", Rejection::PasswordMismatch));
    }

    #[test]
    fn test_item_quantity() {
        let mut form = ItemForm {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            quantity: "3".to_string(),
        };
        assert!(validator().validate(&form).is_empty());

        form.quantity = "0".to_string();
        assert_eq!(
            validator().validate(&form).for_field("quantity"),
            vec![Rejection::QuantityNotPositive]
        );

        form.quantity = String::new();
        assert_eq!(
            validator().validate(&form).for_field("quantity"),
            vec![Rejection::QuantityRequired]
        );
    }

    #[test]
    fn test_user_update_optional_phone() {
        let mut form = UserUpdateForm {
            full_name: None,
            email: "user@example.com".to_string(),
            phone: None,
        };
        assert!(validator().validate(&form).is_empty());

        form.phone = Some("12345".to_string());
        assert_eq!(
            validator().validate(&form).for_field("phone"),
            vec![Rejection::PhoneFormat]
        );

        form.phone = Some("13912345678".to_string());
        form.full_name = Some("x".repeat(31));
        assert_eq!(
            validator().validate(&form).for_field("full_name"),
            vec![Rejection::FieldTooLong { max: 30 }]
        );
    }

    #[test]
    fn test_localized_field_errors() {
        let errors = validator()
            .validate(&SmsCodeRequest {
                phone: "16612345678".to_string(),
            })
            .localize(Locale::ZhCn);
        assert_eq!(
            errors.get("phone").unwrap(),
            &["虚拟号码不被允许".to_string()]
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["phone"]);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, json!({"phone": ["虚拟号码不被允许"]}));
    }

    #[test]
    fn test_schema_description() {
        let description = validator().schema(FormKind::Signup).describe(Locale::En);
        assert_eq!(description["form"], "signup");
        let fields = description["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[2]["field"], "phone");
        assert_eq!(fields[2]["rules"][0]["rule"], "custom");
        assert_eq!(fields[2]["rules"][0]["value"], "china_mobile");
    }
}
