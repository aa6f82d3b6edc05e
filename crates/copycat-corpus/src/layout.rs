//! Corpus directory layout and the filesystem collaborators.
//!
//! ```text
//! <corpus>/<assignment>/<student>_<n>.tar      raw submissions
//! <corpus>/<assignment>/<student>/             extracted submission
//! <corpus>/<assignment>/<student>/partners.txt partner declaration
//! <output>/<assignment>/<report>               cheating reports
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use copycat_core::analysis::LoadedReport;
use copycat_core::error::CoreError;
use copycat_core::report::load_report;
use copycat_core::traits::{AssignmentTextReader, ReportWriter};

use crate::error::CorpusError;

/// `derp.ext` -> `derp_ext_`
pub fn make_filename_safe(filename: &str) -> String {
    format!("{}_", filename.replace('.', "_"))
}

/// Paths inside a corpus.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    root: PathBuf,
    output_root: PathBuf,
    partner_file: String,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>, output_root: impl Into<PathBuf>, partner_file: &str) -> Self {
        Self {
            root: root.into(),
            output_root: output_root.into(),
            partner_file: partner_file.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn assignment_dir(&self, assignment: &str) -> PathBuf {
        self.root.join(assignment)
    }

    pub fn student_dir(&self, student: &str, assignment: &str) -> PathBuf {
        self.assignment_dir(assignment).join(student)
    }

    pub fn partner_path(&self, student: &str, assignment: &str) -> PathBuf {
        self.student_dir(student, assignment).join(&self.partner_file)
    }

    pub fn report_path(&self, assignment: &str, filename: &str) -> PathBuf {
        self.output_root.join(assignment).join(filename)
    }

    /// Read a file from a student's extracted submission.
    ///
    /// Missing files are `Ok(None)`. Invalid UTF-8 is replaced rather than
    /// rejected, since student files come in every encoding.
    pub fn read_student_file(
        &self,
        student: &str,
        assignment: &str,
        filename: &str,
    ) -> Result<Option<String>, CorpusError> {
        let path = self.student_dir(student, assignment).join(filename);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CorpusError::io(path, e)),
        }
    }

    /// Every `(assignment, report filename, path)` in the output tree, sorted.
    pub fn report_files(&self) -> Result<Vec<(String, String, PathBuf)>> {
        let mut found = Vec::new();
        if !self.output_root.is_dir() {
            return Ok(found);
        }

        for entry in std::fs::read_dir(&self.output_root)
            .with_context(|| format!("failed to read directory: {}", self.output_root.display()))?
        {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let assignment = entry.file_name().to_string_lossy().into_owned();

            for report in std::fs::read_dir(entry.path())
                .with_context(|| format!("failed to read directory: {}", entry.path().display()))?
            {
                let report = report?;
                let path = report.path();
                if path.is_file() {
                    let filename = report.file_name().to_string_lossy().into_owned();
                    found.push((assignment.clone(), filename, path));
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Load every report in the output tree. Unparseable files are skipped
    /// with a warning.
    pub fn load_reports(&self) -> Result<Vec<LoadedReport>> {
        let mut loaded = Vec::new();
        for (assignment, detector, path) in self.report_files()? {
            match load_report(&path) {
                Ok(clusters) => loaded.push(LoadedReport {
                    assignment,
                    detector,
                    clusters,
                }),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
        Ok(loaded)
    }
}

/// Reads partner declarations from student directories.
#[derive(Debug, Clone)]
pub struct FsAssignmentReader {
    layout: CorpusLayout,
}

impl FsAssignmentReader {
    pub fn new(layout: CorpusLayout) -> Self {
        Self { layout }
    }
}

impl AssignmentTextReader for FsAssignmentReader {
    fn read_partner_declaration(&self, student: &str, assignment: &str) -> Option<String> {
        let filename = &self.layout.partner_file;
        match self.layout.read_student_file(student, assignment, filename) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("treating partner declaration as absent: {e}");
                None
            }
        }
    }
}

/// Writes reports under the output root.
#[derive(Debug, Clone)]
pub struct FsReportWriter {
    layout: CorpusLayout,
}

impl FsReportWriter {
    pub fn new(layout: CorpusLayout) -> Self {
        Self { layout }
    }
}

impl ReportWriter for FsReportWriter {
    fn write(&self, json: &str, assignment: &str, filename: &str) -> Result<(), CoreError> {
        let path = self.layout.report_path(assignment, filename);
        let failed = |e: std::io::Error| CoreError::WriteFailed {
            assignment: assignment.to_string(),
            filename: filename.to_string(),
            message: format!("{}: {e}", path.display()),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(failed)?;
        }
        std::fs::write(&path, json).map_err(failed)?;

        tracing::debug!(path = %path.display(), bytes = json.len(), "report written");
        Ok(())
    }
}
