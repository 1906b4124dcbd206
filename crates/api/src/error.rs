//! API error handling
//!
//! Errors raised before a request reaches the pipeline. Pipeline outcomes
//! are mapped in `reply`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Structured JSON error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Path names a source the relay does not serve
    UnknownSource(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, response) = match self {
            ApiError::UnknownSource(source) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: format!("unknown source: {}", source),
                    code: "unknown_source".to_string(),
                },
            ),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
