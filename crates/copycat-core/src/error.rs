//! Core error types.
//!
//! Roster and partner lookups never fail; they degrade to absent values.
//! These errors only cover producing and persisting report documents, so
//! callers can tell a serialization bug from a storage failure without
//! string matching.

use thiserror::Error;

/// Errors raised while serializing, parsing, or persisting cluster reports.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The report could not be encoded as JSON.
    #[error("failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A report document was not a valid cluster array.
    #[error("malformed report document: {0}")]
    MalformedReport(#[source] serde_json::Error),

    /// A cluster position past the end of its report.
    #[error("report has {len} clusters, no cluster #{pos}")]
    NoSuchCluster { pos: usize, len: usize },

    /// The report writer could not persist the document.
    #[error("failed to write report {assignment}/{filename}: {message}")]
    WriteFailed {
        assignment: String,
        filename: String,
        message: String,
    },
}

impl CoreError {
    /// Returns `true` if the failure came from the storage side rather than
    /// from the report contents.
    pub fn is_storage(&self) -> bool {
        matches!(self, CoreError::WriteFailed { .. })
    }
}
