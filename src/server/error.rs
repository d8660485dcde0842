//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::acquire::AcquireError;
use crate::pipeline::PipelineError;

use super::routes::ApiResponse;

/// Request-level failure, mapped onto an HTTP status plus the standard
/// `{success, message}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Acquire(AcquireError::TranscriptNotFound) => StatusCode::NOT_FOUND,
            ApiError::Acquire(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(_) => {
                // Generation failures always produce a response; see
                // DESIGN.md for the contract note.
                tracing::error!(error = %self, "generation backend failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ApiResponse {
            success: false,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
