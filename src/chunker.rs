//! Sentence-boundary-aware text chunking.
//!
//! The summarization pipeline cannot hand an arbitrarily long document to the
//! generation backend in one request, so input text is split into bounded
//! windows first. Each window prefers to end just past a period so chunks
//! line up with sentence boundaries; when no period falls inside the window
//! the raw size cut is used and the chunk ends mid-sentence.
//!
//! # Examples
//!
//! ```
//! use gistsmith::chunker::chunk;
//!
//! let chunks = chunk("First sentence. Second sentence.", 20);
//! assert_eq!(chunks, vec!["First sentence.", "Second sentence."]);
//!
//! // Short input comes back whole, trimmed.
//! assert_eq!(chunk("  hello  ", 4000), vec!["hello"]);
//!
//! // Empty input produces no chunks at all.
//! assert!(chunk("", 4000).is_empty());
//! ```

/// Window size used by the summarization pipeline.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;

/// Splits `text` into ordered chunks of at most `max_size` bytes.
///
/// Starting at the front of the text, each iteration takes a candidate cut at
/// `start + max_size`. If that cut lands before the end of the text, the
/// window is shortened to end just past the last period at or before the
/// cut, provided that period sits strictly after `start`; otherwise the raw
/// cut stands. Every emitted chunk is trimmed of surrounding whitespace, but
/// the next window begins at the *untrimmed* boundary, so the chunks rejoin
/// to the original text up to whitespace lost at the seams.
///
/// A window that covers only whitespace trims down to an empty chunk; that
/// chunk is still emitted. Callers that feed chunks onward as prompts see
/// the empty prompt rather than a silently skipped window.
pub fn chunk(text: &str, max_size: usize) -> Vec<String> {
    debug_assert!(max_size > 0, "chunk window must be at least one byte");

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let candidate = start.saturating_add(max_size);
        let mut end = if candidate < text.len() {
            match last_period_at_or_before(text, candidate) {
                Some(period) if period > start => period + 1,
                _ => floor_char_boundary(text, candidate),
            }
        } else {
            text.len()
        };

        // A character wider than the window must still advance the cursor.
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }

        chunks.push(text[start..end].trim().to_string());
        start = end;
    }

    chunks
}

/// Byte offset of the last `.` at or before `idx`, if any.
///
/// `.` is a single ASCII byte and UTF-8 continuation bytes are all >= 0x80,
/// so a byte scan cannot land inside a multi-byte character.
fn last_period_at_or_before(text: &str, idx: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let upper = idx.min(bytes.len() - 1);
    bytes[..=upper].iter().rposition(|&b| b == b'.')
}

/// Largest char boundary less than or equal to `idx`.
fn floor_char_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary greater than or equal to `idx`.
fn ceil_char_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
