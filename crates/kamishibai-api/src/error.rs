//! Kamishibai — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kamishibai_core::error::PlayerError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable or config file is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `PlayerError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub PlayerError);

impl From<PlayerError> for ApiError {
    fn from(err: PlayerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            PlayerError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            PlayerError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            PlayerError::ScenarioUnavailable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "scenario_unavailable")
            }
            PlayerError::MissingElements(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "missing_elements")
            }
            PlayerError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
