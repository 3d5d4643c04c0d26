//! JSON error responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parla_core::error::ParlaError;
use serde::Serialize;

/// An error answered as `{error, details}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    details: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: details.into(),
        }
    }

    /// Map an assistant error onto a status code.
    ///
    /// `summary` names the failed operation and is only used for 500s; client
    /// errors carry their own message.
    pub fn from_core(summary: &str, err: ParlaError) -> Self {
        match err {
            ParlaError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, message.clone(), message)
            }
            ParlaError::UserNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "User not found", err.to_string())
            }
            other => {
                tracing::error!(error = %other, "{}", summary);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, summary, other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.error,
            details: &self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
