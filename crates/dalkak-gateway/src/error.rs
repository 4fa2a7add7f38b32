use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use dalkak_core::error::FlowError;

/// Error returned by gateway handlers, rendered as `{ "error": .., "details": .. }`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: &'a Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn invalid_json(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid JSON body").with_details(vec![reason.into()])
    }

    pub fn validation(details: Vec<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation failed").with_details(details)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Validation(details) => Self::validation(details),
            cycle @ FlowError::Cycle { .. } => Self::validation(vec![cycle.to_string()]),
            FlowError::Json(e) => Self::invalid_json(e.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            details: &self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
