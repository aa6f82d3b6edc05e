//! Unpacking raw submissions into per-student directories.
//!
//! Students may submit several times; archives are named
//! `<student>_<n>...<ext>` and the one with the largest `n` is used.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::CorpusError;
use crate::layout::CorpusLayout;

/// How archives are unpacked.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Archive extension without the dot, e.g. `tar`.
    pub input: String,
    /// Upper bound for one archive.
    pub timeout: Duration,
}

/// What happened for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub student: String,
    /// The archive that was unpacked, if the student submitted anything.
    pub archive: Option<PathBuf>,
    /// Configured files present after extraction.
    pub files_found: Vec<String>,
    /// Configured files still missing after extraction.
    pub files_missing: Vec<String>,
    /// Why extraction failed, if it did.
    pub error: Option<String>,
}

/// Submission number encoded in an archive name, if `name` belongs to
/// `student` and has the expected extension.
pub fn submission_number(student: &str, name: &str, input: &str) -> Option<u64> {
    let rest = name.strip_prefix(student)?.strip_prefix('_')?;
    if !name.ends_with(&format!(".{input}")) {
        return None;
    }
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Pick the newest submission of `student` among `names`.
pub fn newest_submission<'a, I>(student: &str, names: I, input: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut newest: Option<(u64, &'a str)> = None;
    for name in names {
        let Some(n) = submission_number(student, name, input) else {
            continue;
        };
        if newest.map_or(true, |(best, _)| n > best) {
            newest = Some((n, name));
        }
    }
    newest.map(|(_, name)| name)
}

fn list_file_names(dir: &Path) -> Result<Vec<String>, CorpusError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CorpusError::io(dir, e))? {
        let entry = entry.map_err(|e| CorpusError::io(dir, e))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Unpack `archive` into `dest` with `tar`.
pub async fn unpack(archive: &Path, dest: &Path, options: &ExtractOptions) -> Result<(), CorpusError> {
    if options.input != "tar" {
        return Err(CorpusError::UnsupportedInput(options.input.clone()));
    }

    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| CorpusError::io(dest, e))?;

    let mut cmd = Command::new("tar");
    cmd.arg("xf")
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(options.timeout, cmd.output())
        .await
        .map_err(|_| CorpusError::ExtractionTimeout {
            archive: archive.to_path_buf(),
            secs: options.timeout.as_secs(),
        })?
        .map_err(|e| CorpusError::io(archive, e))?;

    if !output.status.success() {
        return Err(CorpusError::ExtractionFailed {
            archive: archive.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Extract the newest submission of `student` out of `archives` (file
/// names inside the assignment directory).
pub async fn extract_submission(
    layout: &CorpusLayout,
    assignment: &str,
    student: &str,
    archives: &[String],
    files: &[String],
    options: &ExtractOptions,
) -> Result<ExtractOutcome, CorpusError> {
    let mut outcome = ExtractOutcome {
        student: student.to_string(),
        ..Default::default()
    };

    let student_dir = layout.student_dir(student, assignment);
    let newest = newest_submission(student, archives.iter().map(String::as_str), &options.input);

    match newest {
        Some(name) => {
            let archive = layout.assignment_dir(assignment).join(name);
            unpack(&archive, &student_dir, options).await?;
            tracing::debug!(student, archive = %archive.display(), "unpacked submission");
            outcome.archive = Some(archive);
        }
        None => {
            tracing::debug!(student, assignment, "no submission found");
        }
    }

    for file in files {
        if student_dir.join(file).is_file() {
            outcome.files_found.push(file.clone());
        } else {
            outcome.files_missing.push(file.clone());
        }
    }

    Ok(outcome)
}

/// Extract every student's newest submission for one assignment.
///
/// A failure for one student is recorded in its outcome and does not stop
/// the others. Unsupported input types fail up front.
pub async fn extract_assignment(
    layout: &CorpusLayout,
    assignment: &str,
    students: &[String],
    files: &[String],
    options: &ExtractOptions,
) -> Result<Vec<ExtractOutcome>, CorpusError> {
    if options.input != "tar" {
        return Err(CorpusError::UnsupportedInput(options.input.clone()));
    }

    let archives = list_file_names(&layout.assignment_dir(assignment))?;
    let mut outcomes = Vec::with_capacity(students.len());

    for student in students {
        match extract_submission(layout, assignment, student, &archives, files, options).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                tracing::warn!(student = %student, assignment, "extraction failed: {e}");
                outcomes.push(ExtractOutcome {
                    student: student.clone(),
                    files_missing: files.to_vec(),
                    error: Some(e.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    let extracted = outcomes.iter().filter(|o| o.archive.is_some()).count();
    tracing::info!(assignment, students = students.len(), extracted, "extraction complete");

    Ok(outcomes)
}
