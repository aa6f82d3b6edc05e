//! Semester roster and student list.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::Path;

use copycat_core::traits::Roster;

use crate::error::CorpusError;

/// Roster loaded from `student,semester` lines.
#[derive(Debug, Clone, Default)]
pub struct CsvRoster {
    semesters: HashMap<String, String>,
}

impl CsvRoster {
    /// Parse roster text. Blank lines and `#` comments are ignored; columns
    /// past the second are ignored.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let mut semesters = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split(',').map(str::trim);
            let (Some(student), Some(semester)) = (fields.next(), fields.next()) else {
                return Err(CorpusError::RosterLine {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            };
            if student.is_empty() || semester.is_empty() {
                return Err(CorpusError::RosterLine {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            }

            if let Some(previous) = semesters.insert(student.to_string(), semester.to_string()) {
                if previous != semester {
                    tracing::warn!(
                        student,
                        previous = %previous,
                        semester,
                        "student listed twice in roster, keeping the later semester"
                    );
                }
            }
        }

        Ok(Self { semesters })
    }

    /// Load a roster file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let text = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        let roster = Self::parse(&text)?;
        tracing::info!(path = %path.display(), students = roster.len(), "loaded roster");
        Ok(roster)
    }

    /// Load a roster file, treating a missing file as an empty roster.
    pub fn load_or_empty(path: &Path) -> Result<Self, CorpusError> {
        match Self::load(path) {
            Err(CorpusError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "roster {} not found, every semester will be unknown",
                    path.display()
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Students on the roster, sorted.
    pub fn students(&self) -> Vec<String> {
        let mut students: Vec<String> = self.semesters.keys().cloned().collect();
        students.sort();
        students
    }

    /// Number of students enrolled in each semester.
    pub fn enrolled_per_semester(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for semester in self.semesters.values() {
            *counts.entry(semester.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.semesters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }
}

impl Roster for CsvRoster {
    fn semester(&self, student: &str) -> Option<String> {
        self.semesters.get(student).cloned()
    }
}

/// Load the corpus student list, one identifier per line. Falls back to the
/// roster's students when the file does not exist.
pub fn load_students(path: &Path, roster: &CsvRoster) -> Result<Vec<String>, CorpusError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(
                "{} not found, using roster students",
                path.display()
            );
            Ok(roster.students())
        }
        Err(e) => Err(CorpusError::io(path, e)),
    }
}
