use super::handlers::ParseGeneratePostersHttpRequestError;
use crate::domain::models::GeneratePostersError;

use poster_core::GenerationError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// A successful response whose body is `data` serialized as JSON.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1.0 == other.1.0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub(super) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Every failure answers with `{"error": message}` and no results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    UnprocessableEntity(String),
    BadGateway(String),
    InternalServerError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ApiErrorData {
    error: String,
}

impl From<anyhow::Error> for ApiError {
    fn from(cause: anyhow::Error) -> Self {
        tracing::error!("{:#}", cause);
        Self::InternalServerError(INTERNAL_SERVER_ERROR_MESSAGE.to_owned())
    }
}

impl From<ParseGeneratePostersHttpRequestError> for ApiError {
    fn from(err: ParseGeneratePostersHttpRequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<GeneratePostersError> for ApiError {
    fn from(err: GeneratePostersError) -> Self {
        match err {
            GeneratePostersError::Generation(err) => {
                let message = err.to_string();
                match err {
                    GenerationError::Validation(_) => Self::BadRequest(message),
                    GenerationError::Geocoding { .. } => Self::BadGateway(message),
                    _ => Self::UnprocessableEntity(message),
                }
            }
            GeneratePostersError::Unknown(cause) => cause.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::InternalServerError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(ApiErrorData { error })).into_response()
    }
}
