//! Collaborator traits consumed by the cluster model.
//!
//! The core never touches the filesystem or a roster database directly.
//! Lookups are injected through these traits; `copycat-corpus` implements
//! them over a corpus directory and tests implement them over plain maps.

use std::collections::HashMap;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Maps students to the academic term they were enrolled in.
pub trait Roster {
    /// The semester of `student`, or `None` if the student is unknown.
    fn semester(&self, student: &str) -> Option<String>;
}

impl Roster for HashMap<String, String> {
    fn semester(&self, student: &str) -> Option<String> {
        self.get(student).cloned()
    }
}

// ---------------------------------------------------------------------------
// Assignment text
// ---------------------------------------------------------------------------

/// Reads the raw partner declaration a student filed for an assignment.
pub trait AssignmentTextReader {
    /// Raw declaration text, or `None` if the student filed nothing.
    fn read_partner_declaration(&self, student: &str, assignment: &str) -> Option<String>;
}

/// Keyed by `(student, assignment)`.
impl AssignmentTextReader for HashMap<(String, String), String> {
    fn read_partner_declaration(&self, student: &str, assignment: &str) -> Option<String> {
        self.get(&(student.to_string(), assignment.to_string()))
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

/// Persists a serialized cheating report.
pub trait ReportWriter {
    /// Store `json` as the report `filename` of `assignment`.
    fn write(&self, json: &str, assignment: &str, filename: &str) -> Result<(), CoreError>;
}
