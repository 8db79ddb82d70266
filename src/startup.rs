use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::config::AppConfig;
use crate::logging::logging_middleware;
use crate::routes::{self, AppState};

pub const API_PREFIX: &str = "/api/v1";

/// Builds the HTTP application for the given configuration.
pub fn build_app(config: AppConfig) -> Router {
    let state = AppState::new(config);

    info!(
        locale = %state.validator.locale(),
        virtual_prefixes = state.validator.virtual_prefixes().len(),
        min_password_length = state.validator.password_policy().min_length,
        "validation rules loaded"
    );

    Router::new()
        .route("/health", get(routes::health))
        .route(&format!("{}/rules", API_PREFIX), get(routes::rules))
        .route(
            &format!("{}/validate/{{form}}", API_PREFIX),
            post(routes::validate_form),
        )
        .route(
            &format!("{}/phone/normalize", API_PREFIX),
            post(routes::normalize_phone_number),
        )
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
