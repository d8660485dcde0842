//! Request handlers for the HTTP surface.

use axum::Json;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::acquire::{self, SourceRequest};

use super::AppState;
use super::error::ApiError;

/// Greeting served at the root path.
pub const WELCOME_MESSAGE: &str = "Welcome to the AI Text Generation API";

/// Standard response body for `POST /text`, success and failure alike.
///
/// One consistent `success` key on both paths; see DESIGN.md for the
/// compatibility note on clients that keyed on a misspelled flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// Handles `GET /` with a plain-text liveness greeting.
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// Handles `POST /text`: a multipart form with `text`, `file`, and `url`
/// fields.
///
/// Resolves the input text, runs the summarization pipeline, and answers
/// with the final summary.
pub async fn summarize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut request = SourceRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("text") => {
                request.text = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
                request.file = Some(bytes.to_vec());
            }
            Some("url") => {
                request.url = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            }
            _ => {}
        }
    }

    let request_id = Uuid::new_v4();
    let summary = async {
        tracing::info!(
            has_file = request.file.is_some(),
            text_bytes = request.text.len(),
            url = %request.url,
            "resolving request input"
        );
        let normalized = acquire::resolve(request, state.transcripts.as_ref()).await?;
        Ok::<_, ApiError>(state.summarizer.summarize(&normalized).await?)
    }
    .instrument(tracing::info_span!("summarize", %request_id))
    .await?;

    Ok(Json(ApiResponse {
        success: true,
        message: summary,
    }))
}
