use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{
    store::StorageError,
    telemetry::{FieldError, TelemetryError, ValidationError},
    weather::WeatherError,
};

/// Every way a handler can fail, mapped onto an HTTP status.
#[derive(Debug)]
pub enum AppError {
    /// Field-level validation failure (400).
    Validation(Vec<FieldError>),
    /// Unparseable body or query (400).
    BadRequest(String),
    /// Upstream rejected our credentials (401).
    Unauthorized(String),
    /// Anything else (500). The message is returned to the caller.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation failed", "fields": fields }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.fields)
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        error!(error = %e, "Storage failure");
        Self::Internal(e.to_string())
    }
}

impl From<TelemetryError> for AppError {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::Validation(v) => v.into(),
            TelemetryError::Storage(s) => s.into(),
        }
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::InvalidApiKey => Self::Unauthorized(e.to_string()),
            other => {
                error!(error = %other, "Weather proxy failure");
                Self::Internal(other.to_string())
            }
        }
    }
}
