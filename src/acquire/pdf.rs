//! PDF text extraction.
//!
//! Thin wrapper over the `pdf-extract` crate. The upload arrives fully
//! buffered, so extraction works on the in-memory bytes directly.

use miette::Diagnostic;
use thiserror::Error;

/// Extraction failure, carrying the underlying parser message.
#[derive(Debug, Error, Diagnostic)]
#[error("error parsing PDF file: {message}")]
#[diagnostic(
    code(gistsmith::acquire::pdf),
    help("The upload may be malformed or not a PDF at all.")
)]
pub struct PdfError {
    message: String,
}

/// Extracts plain text from a PDF held in memory.
///
/// Any parser failure is fatal to the surrounding request; the caller must
/// not fall through to another text source.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|err| PdfError {
        message: err.to_string(),
    })
}
