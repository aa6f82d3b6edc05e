//! The `copycat analyze` command.

use std::path::PathBuf;

use anyhow::Result;

use copycat_core::analysis::analyze;
use copycat_corpus::config::load_config_from;
use copycat_corpus::{load_students, CsvRoster};

pub fn execute(format: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let roster = CsvRoster::load_or_empty(&config.roster_path())?;
    let students = load_students(&config.students_path(), &roster)?;

    let reports = config.layout().load_reports()?;
    if reports.is_empty() {
        eprintln!(
            "No reports found under {}. Run `copycat cluster` first.",
            config.output_root().display()
        );
    }

    let analysis = analyze(&reports, students.len(), &roster.enrolled_per_semester());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&analysis)?),
        "text" => print!("{}", analysis.to_text()),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}
