use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used to render rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN", alias = "zh", alias = "zh-cn")]
    ZhCn,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh-CN",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts a BCP 47 style tag; only the primary language and script matter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('_', "-");
        let primary = tag.split('-').next().unwrap_or("");
        match primary {
            "en" => Ok(Locale::En),
            "zh" if !tag.contains("hant") && !tag.ends_with("-tw") && !tag.ends_with("-hk") => {
                Ok(Locale::ZhCn)
            }
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

/// Whether an input failed on its shape or on a business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionKind {
    Format,
    Policy,
}

/// Why an input value was rejected.
///
/// Each variant is a stable code; the human readable text comes from
/// [`Rejection::message`] so the same rule can be shown in any [`Locale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Rejection {
    PhoneRequired,
    PhoneFormat,
    PhoneVirtual,
    PasswordRequired,
    PasswordTooShort { min: usize },
    PasswordUppercase,
    PasswordSpecial,
    ConfirmationRequired,
    PasswordMismatch,
    EmailRequired,
    EmailInvalid,
    UsernameRequired,
    FullNameRequired,
    TokenRequired,
    NameRequired,
    DescriptionRequired,
    QuantityRequired,
    QuantityNotPositive,
    SmsCodeRequired,
    FieldTooLong { max: usize },
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::PhoneVirtual => RejectionKind::Policy,
            _ => RejectionKind::Format,
        }
    }

    pub fn message(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.message_en(),
            Locale::ZhCn => self.message_zh_cn(),
        }
    }

    fn message_en(&self) -> String {
        match self {
            Rejection::PhoneRequired => "Phone number is required".to_string(),
            Rejection::PhoneFormat => {
                "Invalid phone number format. Must be 11 digits starting with 1 and second digit 3-9"
                    .to_string()
            }
            Rejection::PhoneVirtual => "Virtual numbers are not allowed".to_string(),
            Rejection::PasswordRequired => "Password is required".to_string(),
            Rejection::PasswordTooShort { min } => {
                format!("Password should be at least {} characters.", min)
            }
            Rejection::PasswordUppercase => {
                "Password should contain at least one uppercase letter.".to_string()
            }
            Rejection::PasswordSpecial => {
                "Password should contain at least one special character.".to_string()
            }
            Rejection::ConfirmationRequired => "Password confirmation is required".to_string(),
            Rejection::PasswordMismatch => "Passwords must match.".to_string(),
            Rejection::EmailRequired => "Email is required".to_string(),
            Rejection::EmailInvalid => "Invalid email address".to_string(),
            Rejection::UsernameRequired => "Username is required".to_string(),
            Rejection::FullNameRequired => "Full name is required".to_string(),
            Rejection::TokenRequired => "Token is required".to_string(),
            Rejection::NameRequired => "Name is required".to_string(),
            Rejection::DescriptionRequired => "Description is required".to_string(),
            Rejection::QuantityRequired => "Quantity is required".to_string(),
            Rejection::QuantityNotPositive => "Quantity must be a positive integer".to_string(),
            Rejection::SmsCodeRequired => "Please enter the verification code".to_string(),
            Rejection::FieldTooLong { max } => format!("Must be at most {} characters", max),
        }
    }

    fn message_zh_cn(&self) -> String {
        match self {
            Rejection::PhoneRequired => "必须填写手机号".to_string(),
            Rejection::PhoneFormat => {
                "电话号码格式无效。必须是 11 位数字，从 1 开始，第二位数字为 3-9".to_string()
            }
            Rejection::PhoneVirtual => "虚拟号码不被允许".to_string(),
            Rejection::PasswordRequired => "必须填写密码".to_string(),
            Rejection::PasswordTooShort { min } => format!("密码长度至少为 {} 个字符", min),
            Rejection::PasswordUppercase => "密码必须包含至少一个大写字母".to_string(),
            Rejection::PasswordSpecial => "密码必须包含至少一个特殊字符".to_string(),
            Rejection::ConfirmationRequired => "必须填写密码确认".to_string(),
            Rejection::PasswordMismatch => "密码不匹配".to_string(),
            Rejection::EmailRequired => "必须填写邮箱地址".to_string(),
            Rejection::EmailInvalid => "邮件地址错误".to_string(),
            Rejection::UsernameRequired | Rejection::FullNameRequired => {
                "必须填写用户名".to_string()
            }
            Rejection::TokenRequired => "必须提供重置令牌".to_string(),
            Rejection::NameRequired => "必须填写名称".to_string(),
            Rejection::DescriptionRequired => "必须填写描述".to_string(),
            Rejection::QuantityRequired => "必须填写数量".to_string(),
            Rejection::QuantityNotPositive => "数量必须是正整数".to_string(),
            Rejection::SmsCodeRequired => "请输入验证码".to_string(),
            Rejection::FieldTooLong { max } => format!("长度不能超过 {} 个字符", max),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message(Locale::En))
    }
}

impl std::error::Error for Rejection {}
