use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::extractors::FormPayload;
use crate::forms::FormKind;
use crate::validation::{normalize_phone, FieldValues, Locale, Validator};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub validator: Arc<Validator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let validator = Validator::new(&config.validation);
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
        }
    }

    fn locale(&self, query: &LocaleQuery) -> AppResult<Locale> {
        match &query.locale {
            Some(tag) => tag.parse().map_err(AppError::BadRequest),
            None => Ok(self.validator.locale()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every form's rule table, for front ends that bind rules themselves.
pub async fn rules(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> AppResult<Json<Value>> {
    let locale = state.locale(&query)?;
    let forms: Vec<Value> = FormKind::ALL
        .iter()
        .map(|kind| state.validator.schema(*kind).describe(locale))
        .collect();

    Ok(Json(json!({
        "locale": locale,
        "virtual_prefixes": state.validator.virtual_prefixes(),
        "password": state.validator.password_policy(),
        "forms": forms,
    })))
}

/// The form name is resolved before the body is read, so an unknown form is
/// 404 whatever its payload.
pub async fn validate_form(
    State(state): State<AppState>,
    Path(form): Path<String>,
    Query(query): Query<LocaleQuery>,
    request: Request,
) -> AppResult<Response> {
    let kind: FormKind = form.parse().map_err(AppError::NotFound)?;
    let locale = state.locale(&query)?;
    let FormPayload(values) = FormPayload::<FieldValues>::from_request(request, &state).await?;

    let violations = state.validator.validate_values(kind, &values);
    if violations.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(json!({ "valid": true, "errors": {} })),
        )
            .into_response());
    }

    debug!(form = kind.as_str(), rejected = violations.len(), "form rejected");
    let errors = violations.localize(locale);
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "valid": false, "errors": errors })),
    )
        .into_response())
}

pub async fn normalize_phone_number(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    FormPayload(values): FormPayload<FieldValues>,
) -> AppResult<Json<Value>> {
    let locale = state.locale(&query)?;
    let phone = values.get("phone");

    let body = match state.validator.validate_phone(phone) {
        Ok(phone) => json!({
            "normalized": phone,
            "valid": true,
            "errors": [],
        }),
        Err(rejection) => json!({
            "normalized": normalize_phone(phone),
            "valid": false,
            "kind": rejection.kind(),
            "errors": [rejection.message(locale)],
        }),
    };

    Ok(Json(body))
}
