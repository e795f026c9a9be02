//! API error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use podium_core::CoreError;
use podium_engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::Core(CoreError::InvalidScore(_) | CoreError::InvalidWindow(_)) => {
                ApiError::BadRequest(err.to_string())
            }
            EngineError::Core(CoreError::GameNotFound(_) | CoreError::UserNotFoundInView(_)) => {
                ApiError::NotFound(err.to_string())
            }
            EngineError::InvalidLimit(_) => ApiError::BadRequest(err.to_string()),
            EngineError::Persistence(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
