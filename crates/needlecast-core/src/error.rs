//! Error types for per-file indexing failures.
//!
//! The error surface is deliberately small: needle generators are total
//! over well-formed input (missing attributes skip a single needle, kind
//! mismatches filter), so the only fatal conditions are a malformed span
//! reaching the line folder and an undecodable analyzer payload. Both fail
//! the one file they belong to; the build driver owns batch policy.

use thiserror::Error;

use crate::span::Span;

/// Failure while indexing one file.
///
/// A value of this type invalidates that file's output only. Other files in
/// the batch are unaffected; the driver reports which files failed and why.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A needle span violates the span contract: inverted offsets or an end
    /// offset past the end of the file. Producing a clipped highlight would
    /// point at the wrong characters, so the whole file's fold fails.
    #[error("malformed span {span}: file is {file_len} bytes")]
    MalformedSpan { span: Span, file_len: usize },

    /// The analyzer's fact payload could not be decoded.
    #[error("invalid analysis facts: {0}")]
    InvalidFacts(#[from] serde_json::Error),
}

impl IndexError {
    /// Create a malformed-span error.
    pub fn malformed_span(span: Span, file_len: usize) -> Self {
        IndexError::MalformedSpan { span, file_len }
    }
}
