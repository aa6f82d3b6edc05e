//! Filesystem side of copycat.
//!
//! Implements the core's collaborator traits over a corpus directory,
//! loads the roster and configuration, and unpacks student submissions.

pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod roster;

pub use config::{load_config, load_config_from, AssignmentConfig, CopycatConfig};
pub use error::CorpusError;
pub use layout::{make_filename_safe, CorpusLayout, FsAssignmentReader, FsReportWriter};
pub use roster::{load_students, CsvRoster};
