//! Two-pass map-reduce summarization.
//!
//! The normalized input is chunked, each chunk is summarized by the
//! generation backend one call at a time, and the per-chunk summaries are
//! consolidated by a final call whose output is the response payload.
//!
//! Chunk calls are issued strictly sequentially, each awaited before the
//! next begins. Callers and tests rely on that exact external call order;
//! do not parallelize this loop.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::chunker::{self, DEFAULT_MAX_CHUNK_SIZE};
use crate::genai::{GenAiError, TextGenerator};

/// Instruction prefixed to every per-chunk call.
pub const CHUNK_PROMPT_PREFIX: &str =
    "Summarize the following text with focus on important details only: ";

/// Instruction prefixed to the consolidation call.
pub const CONSOLIDATE_PROMPT_PREFIX: &str =
    "Give Summary In points very nice and clean and cover each and everything properly\n";

/// Failure of either summarization pass.
///
/// Any failing generation call aborts the request: per-chunk summaries
/// already computed are discarded, and nothing is retried.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] GenAiError),
}

/// Summarization pipeline over an injected generation backend.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gistsmith::genai::MockGenerator;
/// use gistsmith::pipeline::Summarizer;
///
/// # async fn demo() {
/// let generator = Arc::new(MockGenerator::new());
/// let summarizer = Summarizer::new(generator.clone());
/// let summary = summarizer.summarize("Short text.").await.unwrap();
/// // One chunk call plus one consolidation call.
/// assert_eq!(generator.call_count(), 2);
/// assert_eq!(summary, "mock-summary-2");
/// # }
/// ```
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    max_chunk_size: usize,
}

impl Summarizer {
    /// Creates a pipeline with the default 4000-byte chunk window.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }

    /// Overrides the chunk window. Tests use small windows to exercise the
    /// multi-chunk path with short fixtures.
    #[must_use]
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Produces the final summary for already-normalized text.
    pub async fn summarize(&self, normalized_text: &str) -> Result<String, PipelineError> {
        let chunks = chunker::chunk(normalized_text, self.max_chunk_size);
        tracing::info!(
            chunk_count = chunks.len(),
            input_bytes = normalized_text.len(),
            "starting summarization"
        );

        let mut summaries = Vec::with_capacity(chunks.len());
        for (index, chunk_text) in chunks.iter().enumerate() {
            let summary = self
                .generator
                .generate(&format!("{CHUNK_PROMPT_PREFIX}{chunk_text}"))
                .await?;
            tracing::debug!(index, "chunk summarized");
            summaries.push(summary);
        }

        let final_summary = self
            .generator
            .generate(&format!(
                "{CONSOLIDATE_PROMPT_PREFIX}{}",
                summaries.join("\n")
            ))
            .await?;

        tracing::info!(summary_bytes = final_summary.len(), "summarization complete");
        Ok(final_summary)
    }
}
