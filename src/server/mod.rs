//! HTTP surface: router assembly and serving.
//!
//! The router is built from injected collaborators so tests can stand up
//! the full application with mock backends and drive it over a local
//! listener.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use miette::Diagnostic;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::acquire::TranscriptFetcher;
use crate::pipeline::Summarizer;

pub use error::ApiError;
pub use routes::{ApiResponse, WELCOME_MESSAGE};

/// Uploaded PDFs are buffered in memory; cap the request body well above
/// typical document sizes.
const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state: the pipeline plus the transcript seam.
///
/// Everything inside is immutable once constructed; handlers share it by
/// cheap clone.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
}

/// Failures while binding or serving.
#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error("failed to bind or serve: {0}")]
    #[diagnostic(code(gistsmith::server::io))]
    Io(#[from] std::io::Error),
}

/// Assembles the application router.
///
/// The consumer is a browser extension, so CORS stays fully permissive.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::welcome))
        .route("/text", post(routes::summarize))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `port` on all interfaces and serves until shutdown.
pub async fn serve(state: AppState, port: u16) -> Result<(), ServerError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("server is running on port {}", listener.local_addr()?.port());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
