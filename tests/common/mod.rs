#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use form_validator::actions::{AccessToken, ApiClient, ApiError, NewItem, SignupRequest, UserUpdate};
use form_validator::config::{AppConfig, ServerConfig, ValidationConfig};
use form_validator::startup::build_app;
use form_validator::validation::NormalizedPhone;
use std::sync::Mutex;

pub fn create_test_app_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        validation: ValidationConfig::default(),
    }
}

pub fn setup_test_app(app_config: AppConfig) -> Router {
    build_app(app_config)
}

/// Records every call and answers with a preset result.
pub struct MockApiClient {
    pub calls: Mutex<Vec<String>>,
    pub failure: Option<ApiError>,
    pub token: String,
}

impl MockApiClient {
    pub fn ok() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
            token: "test-access-token".to_string(),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn login(&self, username: &str, _password: &str) -> Result<AccessToken, ApiError> {
        self.record(format!("login:{}", username))?;
        Ok(AccessToken {
            access_token: self.token.clone(),
        })
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.record(format!("logout:{}", token))
    }

    async fn register(&self, email: &str, _password: &str) -> Result<(), ApiError> {
        self.record(format!("register:{}", email))
    }

    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        self.record(format!("signup:{}:{}", request.email, request.phone))
    }

    async fn send_sms_code(&self, phone: &NormalizedPhone) -> Result<(), ApiError> {
        self.record(format!("send_sms_code:{}", phone))
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.record(format!("forgot_password:{}", email))
    }

    async fn reset_password(&self, token: &str, _password: &str) -> Result<(), ApiError> {
        self.record(format!("reset_password:{}", token))
    }

    async fn create_item(&self, token: &str, item: &NewItem) -> Result<(), ApiError> {
        self.record(format!("create_item:{}:{}:{}", token, item.name, item.quantity))
    }

    async fn delete_item(&self, token: &str, item_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_item:{}:{}", token, item_id))
    }

    async fn update_me(&self, token: &str, update: &UserUpdate) -> Result<(), ApiError> {
        let phone = update
            .phone
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_default();
        self.record(format!("update_me:{}:{}:{}", token, update.email, phone))
    }
}
