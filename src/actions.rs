//! Form submission pipeline: validate locally, call the remote API, and hand
//! the navigation decision back to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

use crate::forms::{
    FieldErrors, FormInput, ItemForm, LoginForm, PasswordRecoveryForm, PasswordResetConfirmForm,
    RegisterForm, SignupForm, SmsCodeRequest, UserUpdateForm, Violations,
};
use crate::validation::{validate_quantity, Locale, NormalizedPhone, Rejection, Validator};

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";
pub const NO_ACCESS_TOKEN: &str = "No access token found";

/// Failure reported by the remote API client.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The API answered with an error body; `detail` is its `detail` member.
    Rejected { status: u16, detail: Value },
    /// The request never produced an answer.
    Transport(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rejected { status, detail } => {
                write!(f, "API rejected request ({}): {}", status, error_message(detail))
            }
            ApiError::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// Extracts a displayable message from an API error `detail`.
pub fn error_message(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("reason") {
            Some(Value::String(reason)) => reason.clone(),
            _ => UNKNOWN_ERROR.to_string(),
        },
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: NormalizedPhone,
    pub password: String,
    pub sms_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<NormalizedPhone>,
}

/// The remote REST API. Only already-validated values reach it.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, ApiError>;

    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    async fn register(&self, email: &str, password: &str) -> Result<(), ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;

    async fn send_sms_code(&self, phone: &NormalizedPhone) -> Result<(), ApiError>;

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;

    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError>;

    async fn create_item(&self, token: &str, item: &NewItem) -> Result<(), ApiError>;

    async fn delete_item(&self, token: &str, item_id: &str) -> Result<(), ApiError>;

    async fn update_me(&self, token: &str, update: &UserUpdate) -> Result<(), ApiError>;
}

/// What the caller should do after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    /// Local validation failed; nothing was sent.
    Invalid { errors: FieldErrors },
    ServerValidationError { message: String },
    ServerError { message: String },
    Message { message: String },
    Redirect { to: String },
    /// Logged in; the caller stores the token and navigates.
    Authenticated {
        access_token: String,
        redirect_to: String,
    },
}

impl ActionState {
    fn redirect(to: &str) -> Self {
        ActionState::Redirect { to: to.to_string() }
    }

    fn message(message: &str) -> Self {
        ActionState::Message {
            message: message.to_string(),
        }
    }
}

/// Runs form submissions against an [`ApiClient`].
pub struct Actions<C: ?Sized> {
    validator: Arc<Validator>,
    locale: Locale,
    client: Arc<C>,
}

impl<C: ApiClient + ?Sized> Actions<C> {
    pub fn new(client: Arc<C>, validator: Arc<Validator>) -> Self {
        let locale = validator.locale();
        Self {
            validator,
            locale,
            client,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    fn check<F: FormInput>(&self, action: &str, form: &F) -> Option<ActionState> {
        let violations = self.validator.validate(form);
        if violations.is_empty() {
            return None;
        }
        debug!(
            action,
            form = F::KIND.as_str(),
            rejected = violations.len(),
            "form rejected before submission"
        );
        Some(ActionState::Invalid {
            errors: violations.localize(self.locale),
        })
    }

    fn reject_field(&self, field: &'static str, rejection: Rejection) -> ActionState {
        let mut violations = Violations::default();
        violations.push(field, rejection);
        ActionState::Invalid {
            errors: violations.localize(self.locale),
        }
    }

    fn failed(&self, action: &str, err: ApiError) -> ActionState {
        match err {
            ApiError::Rejected { status, detail } => {
                debug!(action, status, "API rejected submission");
                ActionState::ServerValidationError {
                    message: error_message(&detail),
                }
            }
            ApiError::Transport(e) => {
                error!(action, "{} error: {}", action, e);
                ActionState::ServerError {
                    message: UNEXPECTED_ERROR.to_string(),
                }
            }
        }
    }

    fn token<'a>(&self, action: &str, token: Option<&'a str>) -> Result<&'a str, ActionState> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => Ok(token),
            None => {
                debug!(action, "missing access token");
                Err(ActionState::message(NO_ACCESS_TOKEN))
            }
        }
    }

    pub async fn login(&self, form: &LoginForm) -> ActionState {
        if let Some(invalid) = self.check("login", form) {
            return invalid;
        }
        match self.client.login(&form.username, &form.password).await {
            Ok(token) => ActionState::Authenticated {
                access_token: token.access_token,
                redirect_to: "/dashboard".to_string(),
            },
            Err(e) => self.failed("login", e),
        }
    }

    pub async fn logout(&self, token: Option<&str>) -> ActionState {
        let token = match self.token("logout", token) {
            Ok(token) => token,
            Err(state) => return state,
        };
        match self.client.logout(token).await {
            Ok(()) => ActionState::redirect("/login"),
            Err(e) => self.failed("logout", e),
        }
    }

    pub async fn register(&self, form: &RegisterForm) -> ActionState {
        if let Some(invalid) = self.check("register", form) {
            return invalid;
        }
        match self.client.register(&form.email, &form.password).await {
            Ok(()) => ActionState::redirect("/login"),
            Err(e) => self.failed("register", e),
        }
    }

    pub async fn send_sms_code(&self, request: &SmsCodeRequest) -> ActionState {
        let phone = match self.validator.validate_phone(&request.phone) {
            Ok(phone) => phone,
            Err(rejection) => {
                debug!(action = "send_sms_code", "phone rejected before sending code");
                return self.reject_field("phone", rejection);
            }
        };
        match self.client.send_sms_code(&phone).await {
            Ok(()) => ActionState::message("Code sent"),
            Err(e) => self.failed("send_sms_code", e),
        }
    }

    pub async fn signup(&self, form: &SignupForm) -> ActionState {
        if let Some(invalid) = self.check("signup", form) {
            return invalid;
        }
        let phone = match self.validator.validate_phone(&form.phone) {
            Ok(phone) => phone,
            Err(rejection) => return self.reject_field("phone", rejection),
        };
        let request = SignupRequest {
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            phone,
            password: form.password.clone(),
            sms_code: form.sms_code.trim().to_string(),
        };
        match self.client.signup(&request).await {
            Ok(()) => ActionState::redirect("/login"),
            Err(e) => self.failed("signup", e),
        }
    }

    pub async fn request_password_reset(&self, form: &PasswordRecoveryForm) -> ActionState {
        if let Some(invalid) = self.check("request_password_reset", form) {
            return invalid;
        }
        match self.client.forgot_password(&form.email).await {
            Ok(()) => ActionState::message("Password reset instructions sent to your email."),
            Err(e) => self.failed("request_password_reset", e),
        }
    }

    pub async fn confirm_password_reset(&self, form: &PasswordResetConfirmForm) -> ActionState {
        if let Some(invalid) = self.check("confirm_password_reset", form) {
            return invalid;
        }
        match self.client.reset_password(&form.token, &form.password).await {
            Ok(()) => ActionState::redirect("/login"),
            Err(e) => self.failed("confirm_password_reset", e),
        }
    }

    pub async fn add_item(&self, token: Option<&str>, form: &ItemForm) -> ActionState {
        let token = match self.token("add_item", token) {
            Ok(token) => token,
            Err(state) => return state,
        };
        if let Some(invalid) = self.check("add_item", form) {
            return invalid;
        }
        let quantity = match validate_quantity(&form.quantity) {
            Ok(quantity) => quantity,
            Err(rejection) => return self.reject_field("quantity", rejection),
        };
        let item = NewItem {
            name: form.name.clone(),
            description: form.description.clone(),
            quantity,
        };
        match self.client.create_item(token, &item).await {
            Ok(()) => ActionState::redirect("/dashboard"),
            Err(e) => self.failed("add_item", e),
        }
    }

    pub async fn remove_item(&self, token: Option<&str>, item_id: &str) -> ActionState {
        let token = match self.token("remove_item", token) {
            Ok(token) => token,
            Err(state) => return state,
        };
        match self.client.delete_item(token, item_id).await {
            Ok(()) => ActionState::redirect("/dashboard"),
            Err(e) => self.failed("remove_item", e),
        }
    }

    pub async fn update_profile(&self, token: Option<&str>, form: &UserUpdateForm) -> ActionState {
        let token = match self.token("update_profile", token) {
            Ok(token) => token,
            Err(state) => return state,
        };
        if let Some(invalid) = self.check("update_profile", form) {
            return invalid;
        }
        let phone = match self
            .validator
            .validate_optional_phone(form.phone.as_deref().unwrap_or(""))
        {
            Ok(phone) => phone,
            Err(rejection) => return self.reject_field("phone", rejection),
        };
        let update = UserUpdate {
            full_name: form.full_name.clone().filter(|n| !n.is_empty()),
            email: form.email.clone(),
            phone,
        };
        match self.client.update_me(token, &update).await {
            Ok(()) => ActionState::message("User updated successfully."),
            Err(e) => self.failed("update_profile", e),
        }
    }
}
