//! Errors and diagnostics raised while decoding actuator payloads
//!
//! Two severities:
//! - `DecodeError`: the payload is unusable, nothing is returned
//! - `Diagnostic`: one dynamic entry was skipped, the rest of the snapshot stands

use serde::Serialize;
use thiserror::Error;

/// Bytes shown on each side of the failure position
const EXCERPT_RADIUS: usize = 24;

/// Malformed JSON, a non-object top level, or a fixed key of the wrong type
#[derive(Debug, Error)]
#[error("invalid actuator payload near `{excerpt}`: {source}")]
pub struct DecodeError {
    /// One-based line of the failure (0 when unknown)
    pub line: usize,
    /// One-based column of the failure (0 when unknown)
    pub column: usize,
    /// Lossy UTF-8 window of the bytes around the failure
    pub excerpt: String,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    pub(crate) fn new(source: serde_json::Error, bytes: &[u8]) -> Self {
        let line = source.line();
        let column = source.column();
        let offset = byte_offset(bytes, line, column);
        let start = offset.saturating_sub(EXCERPT_RADIUS);
        let end = (offset + EXCERPT_RADIUS).min(bytes.len());

        Self {
            line,
            column,
            excerpt: String::from_utf8_lossy(&bytes[start..end]).into_owned(),
            source,
        }
    }

    /// True when the input ended before the JSON value was complete
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }
}

/// Converts serde_json's line/column pair back into an index into `bytes`
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }

    let line_start: usize = bytes
        .split(|b| *b == b'\n')
        .take(line - 1)
        .map(|l| l.len() + 1)
        .sum();

    (line_start + column.saturating_sub(1)).min(bytes.len())
}

/// A dynamic metric whose value is not a number
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("metric `{key}` holds a {found} value, expected a number")]
pub struct TypeMismatchError {
    pub key: String,
    /// JSON kind actually found (`string`, `bool`, `null`, `array`, `object`)
    pub found: &'static str,
}

/// A dynamic metric whose name does not follow its family layout
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("metric `{key}` does not follow its family layout: {reason}")]
pub struct SchemaViolationError {
    pub key: String,
    pub reason: &'static str,
}

/// Non-fatal anomaly reported next to a best-effort snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),
    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolationError),
}

impl Diagnostic {
    /// Raw payload key the diagnostic is about
    pub fn key(&self) -> &str {
        match self {
            Diagnostic::TypeMismatch(e) => &e.key,
            Diagnostic::SchemaViolation(e) => &e.key,
        }
    }
}
