//! Text acquisition: resolve request input into one normalized text.
//!
//! The helpers in this module provide three capabilities:
//!
//! * [`pdf`] — PDF buffer to plain text extraction.
//! * [`youtube`] — transcript scraping through a remote browser, behind the
//!   [`TranscriptFetcher`] seam.
//! * [`resolve`] — the source-priority policy plus whitespace
//!   normalization shared by every source.

pub mod cdp;
pub mod pdf;
pub mod youtube;

pub use pdf::PdfError;
pub use youtube::{
    BrowserlessFetcher, MockTranscriptFetcher, TranscriptError, TranscriptFetcher, is_watch_url,
};

use miette::Diagnostic;
use thiserror::Error;

/// Raw material of one summarization request.
///
/// At most one of the three sources is meaningfully populated; [`resolve`]
/// applies the priority policy (file over text over URL) rather than
/// rejecting over-specified requests.
#[derive(Debug, Default, Clone)]
pub struct SourceRequest {
    /// Inline text, possibly empty.
    pub text: String,
    /// Uploaded file bytes, when a file field was attached.
    pub file: Option<Vec<u8>>,
    /// Source URL, possibly empty.
    pub url: String,
}

/// Failures while resolving the input text.
#[derive(Debug, Error, Diagnostic)]
pub enum AcquireError {
    /// The uploaded file could not be parsed as a PDF. Fatal: the request
    /// does not fall back to the other sources.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pdf(#[from] PdfError),

    /// The transcript scrape failed outright.
    #[error("error fetching YouTube transcript: {0}")]
    #[diagnostic(transparent)]
    Transcript(#[from] TranscriptError),

    /// The scrape succeeded but the video has no transcript.
    #[error("No transcript found for the provided YouTube video.")]
    #[diagnostic(code(gistsmith::acquire::no_transcript))]
    TranscriptNotFound,
}

/// Resolves a request to normalized text.
///
/// Policy, in order:
/// 1. An attached file is extracted as PDF; extraction failure is fatal.
/// 2. When the text so far is empty and the URL carries the YouTube watch
///    marker, the transcript is fetched. An empty transcript is reported as
///    [`AcquireError::TranscriptNotFound`] rather than passed downstream.
/// 3. Otherwise the inline text stands, whatever the URL says.
///
/// Whatever the source, the result has every whitespace run collapsed to a
/// single space and both ends trimmed.
pub async fn resolve(
    request: SourceRequest,
    transcripts: &dyn TranscriptFetcher,
) -> Result<String, AcquireError> {
    let mut text = request.text;

    if let Some(bytes) = &request.file {
        tracing::debug!(bytes = bytes.len(), "extracting text from uploaded PDF");
        text = pdf::extract_text(bytes)?;
    }

    // The emptiness check runs on the text as resolved so far, before
    // normalization: whitespace-only inline text counts as present.
    if text.is_empty() && is_watch_url(&request.url) {
        let transcript = transcripts.fetch_transcript(&request.url).await?;
        if transcript.is_empty() {
            return Err(AcquireError::TranscriptNotFound);
        }
        text = transcript;
    }

    Ok(normalize(&text))
}

/// Collapses whitespace runs to single spaces and trims both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
