use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest, Request,
    },
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Request body extractor that accepts both JSON and HTML form submissions.
pub struct FormPayload<T>(pub T);

impl<T, S> FromRequest<S> for FormPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = FormPayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let media_type = match req.headers().get(header::CONTENT_TYPE) {
            Some(content_type) => {
                let content_type_str = content_type
                    .to_str()
                    .map_err(|_| FormPayloadRejection::InvalidContentType)?;

                // Drop parameters such as charset
                content_type_str
                    .split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_lowercase()
            }
            None => return Err(FormPayloadRejection::InvalidContentType),
        };

        match media_type.as_str() {
            "application/json" => match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => Ok(FormPayload(value)),
                Err(rejection) => Err(FormPayloadRejection::Json(rejection)),
            },
            "application/x-www-form-urlencoded" => match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => Ok(FormPayload(value)),
                Err(rejection) => Err(FormPayloadRejection::Form(rejection)),
            },
            _ => Err(FormPayloadRejection::InvalidContentType),
        }
    }
}

#[derive(Debug)]
pub enum FormPayloadRejection {
    InvalidContentType,
    Json(JsonRejection),
    Form(FormRejection),
}

impl From<FormPayloadRejection> for AppError {
    fn from(rejection: FormPayloadRejection) -> Self {
        match rejection {
            FormPayloadRejection::InvalidContentType => AppError::UnsupportedMediaType(
                "Content-Type must be application/json or application/x-www-form-urlencoded"
                    .to_string(),
            ),
            FormPayloadRejection::Json(rejection) => {
                AppError::BadRequest(format!("Invalid JSON: {}", rejection))
            }
            FormPayloadRejection::Form(rejection) => {
                AppError::BadRequest(format!("Invalid form data: {}", rejection))
            }
        }
    }
}

impl IntoResponse for FormPayloadRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
