//! Defines the `ApiError` type for the status API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::AggregatorError;

/// An error that converts directly into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong admin credentials.
    Unauthorized,

    /// A resource that does not exist; carries a message and a machine-readable code.
    NotFound { message: String, code: &'static str },

    /// A forced check outlasted its deadline. The cycle keeps running.
    Timeout,

    /// Anything else; logged, never detailed to the caller.
    Internal(String),
}

impl From<AggregatorError> for ApiError {
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::UnknownService(_) => ApiError::NotFound {
                message: "Service not found".to_string(),
                code: "SERVICE_NOT_FOUND",
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), "UNAUTHORIZED")
            }
            ApiError::NotFound { message, code } => (StatusCode::NOT_FOUND, message, code),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Health check did not finish in time".to_string(),
                "HEALTH_CHECK_TIMEOUT",
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        (status, Json(json!({ "error": true, "message": message, "code": code }))).into_response()
    }
}
