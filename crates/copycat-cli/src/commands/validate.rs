//! The `copycat validate` command.

use std::path::PathBuf;

use anyhow::Result;

use copycat_corpus::config::{load_config_from, validate_config};
use copycat_corpus::CsvRoster;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    println!(
        "Corpus: {} ({} assignments)",
        config.corpus_path.display(),
        config.assignments.len()
    );

    // A malformed roster is fatal; a missing one is only a warning.
    if config.roster_path().is_file() {
        let roster = CsvRoster::load(&config.roster_path())?;
        println!("Roster: {} students", roster.len());
    }

    let warnings = validate_config(&config);
    for w in &warnings {
        let prefix = w
            .assignment
            .as_ref()
            .map(|a| format!("  [{a}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Config valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
