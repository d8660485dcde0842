//! # Gistsmith: chunked map-reduce text summarization service
//!
//! Gistsmith resolves input text from one of three sources (inline text,
//! an uploaded PDF, or a YouTube video URL), normalizes it, and produces a
//! bulleted summary through two rounds of calls to the Gemini
//! `generateContent` API: one summary per bounded chunk, then a single
//! consolidation pass over the joined chunk summaries.
//!
//! ## Request Flow
//!
//! ```text
//! POST /text (multipart: text | file | url)
//!        │
//!        ▼
//! acquire::resolve ──► pdf::extract_text          (file present)
//!        │         └─► youtube::TranscriptFetcher (empty text + watch URL)
//!        ▼
//! NormalizedText ──► chunker::chunk (≤ 4000 bytes, sentence-aligned)
//!        │
//!        ▼
//! pipeline::Summarizer ──► genai::TextGenerator   (N chunk calls + 1 final)
//!        │
//!        ▼
//! { "success": true, "message": <final summary> }
//! ```
//!
//! ## Design Notes
//!
//! - Chunk summarization is strictly sequential: one outstanding
//!   generation call at a time. Tests assert the exact external call
//!   order; do not parallelize the loop.
//! - All collaborators are injected ([`genai::TextGenerator`],
//!   [`acquire::TranscriptFetcher`]); there are no module-level globals.
//! - Every entity is request-scoped. Nothing is persisted and no state is
//!   shared across requests beyond immutable configuration.
//!
//! ## Module Guide
//!
//! - [`chunker`] - Sentence-boundary-aware text windowing
//! - [`acquire`] - Source resolution: inline text, PDF, YouTube transcript
//! - [`genai`] - Gemini client, wire types, and the generation trait seam
//! - [`pipeline`] - Map-reduce summarization over the generation backend
//! - [`server`] - axum router, handlers, and error-to-status mapping
//! - [`config`] - Environment-derived settings, loaded once at startup

pub mod acquire;
pub mod chunker;
pub mod config;
pub mod genai;
pub mod pipeline;
pub mod server;
