//! copycat configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CorpusError;
use crate::extract::ExtractOptions;
use crate::layout::CorpusLayout;

/// Per-assignment settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// Whether two-person collaboration is allowed.
    #[serde(default)]
    pub allow_partners: bool,
    /// Source files expected in each submission.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Top-level copycat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopycatConfig {
    /// Root of the corpus: one directory per assignment.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,
    /// Where reports are written. Defaults to `<corpus>/.copycat/postprocessed`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// `student,semester` roster, relative to the corpus.
    #[serde(default = "default_roster_file")]
    pub roster_file: String,
    /// One student per line, relative to the corpus.
    #[serde(default = "default_students_file")]
    pub students_file: String,
    /// Name of the partner declaration inside a student's directory.
    #[serde(default = "default_partner_file")]
    pub partner_file: String,
    /// Archive extension of raw submissions.
    #[serde(default = "default_input")]
    pub input: String,
    /// Timeout for unpacking one archive.
    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,
    /// Assignments keyed by name.
    #[serde(default)]
    pub assignments: BTreeMap<String, AssignmentConfig>,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from(".")
}
fn default_roster_file() -> String {
    "semesters.csv".to_string()
}
fn default_students_file() -> String {
    "students.txt".to_string()
}
fn default_partner_file() -> String {
    "partners.txt".to_string()
}
fn default_input() -> String {
    "tar".to_string()
}
fn default_extract_timeout() -> u64 {
    60
}

impl Default for CopycatConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            output_dir: None,
            roster_file: default_roster_file(),
            students_file: default_students_file(),
            partner_file: default_partner_file(),
            input: default_input(),
            extract_timeout_secs: default_extract_timeout(),
            assignments: BTreeMap::new(),
        }
    }
}

impl CopycatConfig {
    pub fn output_root(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.corpus_path.join(".copycat").join("postprocessed"))
    }

    pub fn roster_path(&self) -> PathBuf {
        self.corpus_path.join(&self.roster_file)
    }

    pub fn students_path(&self) -> PathBuf {
        self.corpus_path.join(&self.students_file)
    }

    pub fn layout(&self) -> CorpusLayout {
        CorpusLayout::new(&self.corpus_path, self.output_root(), &self.partner_file)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            input: self.input.clone(),
            timeout: Duration::from_secs(self.extract_timeout_secs),
        }
    }

    /// Look up a configured assignment.
    pub fn assignment(&self, name: &str) -> Result<&AssignmentConfig, CorpusError> {
        self.assignments
            .get(name)
            .ok_or_else(|| CorpusError::UnknownAssignment(name.to_string()))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again, so a value containing `${...}`
/// is kept literally. Unknown variables expand to nothing.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `copycat.toml` in the current directory
/// 2. `~/.config/copycat/config.toml`
///
/// `COPYCAT_CORPUS` overrides `corpus_path`.
pub fn load_config() -> Result<CopycatConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CopycatConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("copycat.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CopycatConfig::default(),
    };

    if let Ok(corpus) = std::env::var("COPYCAT_CORPUS") {
        config.corpus_path = PathBuf::from(corpus);
    }

    config.corpus_path = resolve_path(&config.corpus_path);
    config.output_dir = config.output_dir.as_deref().map(resolve_path);

    tracing::debug!(
        source = ?config_path,
        corpus = %config.corpus_path.display(),
        assignments = config.assignments.len(),
        "loaded config"
    );

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<CopycatConfig> {
    let config: CopycatConfig = toml::from_str(content)?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("copycat"))
}

/// A warning from config validation.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The assignment (if applicable).
    pub assignment: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a config against the corpus on disk.
pub fn validate_config(config: &CopycatConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if !config.corpus_path.is_dir() {
        warnings.push(ConfigWarning {
            assignment: None,
            message: format!("corpus path is not a directory: {}", config.corpus_path.display()),
        });
    }

    if !config.roster_path().is_file() {
        warnings.push(ConfigWarning {
            assignment: None,
            message: format!(
                "roster not found: {} (semesters and partners will be unresolved)",
                config.roster_path().display()
            ),
        });
    }

    if config.assignments.is_empty() {
        warnings.push(ConfigWarning {
            assignment: None,
            message: "no assignments configured".into(),
        });
    }

    if config.input != "tar" {
        warnings.push(ConfigWarning {
            assignment: None,
            message: format!("input type '{}' cannot be extracted", config.input),
        });
    }

    let layout = config.layout();
    for (name, assignment) in &config.assignments {
        if !layout.assignment_dir(name).is_dir() {
            warnings.push(ConfigWarning {
                assignment: Some(name.clone()),
                message: format!(
                    "assignment directory missing: {}",
                    layout.assignment_dir(name).display()
                ),
            });
        }
        if assignment.files.is_empty() {
            warnings.push(ConfigWarning {
                assignment: Some(name.clone()),
                message: "no files listed".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
corpus_path = "/srv/corpus"
partner_file = "PARTNERS"

[assignments.hw1]
allow_partners = true
files = ["main.c", "util.c"]

[assignments.essay]
files = ["essay.txt"]
"#;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_COPYCAT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_COPYCAT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_COPYCAT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_COPYCAT_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_COPYCAT_SELF_REF", "/srv/${_COPYCAT_SELF_REF}");
        assert_eq!(
            resolve_env_vars("${_COPYCAT_SELF_REF}/hw1"),
            "/srv/${_COPYCAT_SELF_REF}/hw1"
        );
        std::env::remove_var("_COPYCAT_SELF_REF");
    }

    #[test]
    fn resolve_env_vars_keeps_unterminated_reference() {
        assert_eq!(resolve_env_vars("/srv/${HOME"), "/srv/${HOME");
        assert_eq!(resolve_env_vars("${_COPYCAT_UNSET_VAR}/x"), "/x");
    }

    #[test]
    fn default_config() {
        let config = CopycatConfig::default();
        assert_eq!(config.roster_file, "semesters.csv");
        assert_eq!(config.partner_file, "partners.txt");
        assert_eq!(config.input, "tar");
        assert_eq!(
            config.output_root(),
            PathBuf::from("./.copycat/postprocessed")
        );
    }

    #[test]
    fn parse_assignments() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.corpus_path, PathBuf::from("/srv/corpus"));
        assert_eq!(config.partner_file, "PARTNERS");
        assert!(config.assignment("hw1").unwrap().allow_partners);
        assert!(!config.assignment("essay").unwrap().allow_partners);
        assert_eq!(config.assignment("hw1").unwrap().files, vec!["main.c", "util.c"]);
    }

    #[test]
    fn unknown_assignment_is_error() {
        let config = parse_config(SAMPLE).unwrap();
        let err = config.assignment("hw9").unwrap_err();
        assert!(matches!(err, CorpusError::UnknownAssignment(ref a) if a == "hw9"));
    }

    #[test]
    fn explicit_output_dir_wins() {
        let config = parse_config("output_dir = \"/tmp/out\"\n").unwrap();
        assert_eq!(config.output_root(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn missing_explicit_config_is_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/copycat.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn validate_flags_missing_pieces() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("hw1")).unwrap();

        let mut config = CopycatConfig {
            corpus_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        config.assignments.insert(
            "hw1".into(),
            AssignmentConfig {
                allow_partners: true,
                files: vec!["main.c".into()],
            },
        );
        config.assignments.insert("hw2".into(), AssignmentConfig::default());

        let warnings = validate_config(&config);
        assert!(warnings.iter().any(|w| w.message.contains("roster not found")));
        assert!(warnings
            .iter()
            .any(|w| w.assignment.as_deref() == Some("hw2") && w.message.contains("missing")));
        assert!(warnings
            .iter()
            .any(|w| w.assignment.as_deref() == Some("hw2") && w.message.contains("no files")));
        assert!(!warnings.iter().any(|w| w.assignment.as_deref() == Some("hw1")));
    }
}
