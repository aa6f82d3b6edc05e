//! Corpus error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or preparing a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A file or directory could not be accessed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A roster line did not have the `student,semester` shape.
    #[error("malformed roster line {line}: {content:?}")]
    RosterLine { line: usize, content: String },

    /// The configured archive kind cannot be unpacked.
    #[error("unsupported input type: {0}")]
    UnsupportedInput(String),

    /// The archive tool exited unsuccessfully.
    #[error("failed to extract {}: {message}", archive.display())]
    ExtractionFailed { archive: PathBuf, message: String },

    /// The archive tool did not finish in time.
    #[error("extracting {} timed out after {secs}s", archive.display())]
    ExtractionTimeout { archive: PathBuf, secs: u64 },

    /// The assignment is not listed in the configuration.
    #[error("assignment not configured: {0}")]
    UnknownAssignment(String),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }
}
