//! The `copycat extract` command.

use std::path::PathBuf;

use anyhow::Result;

use copycat_corpus::config::load_config_from;
use copycat_corpus::extract::{extract_assignment, ExtractOutcome};
use copycat_corpus::{load_students, CsvRoster};

pub async fn execute(assignment: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let roster = CsvRoster::load_or_empty(&config.roster_path())?;
    let students = load_students(&config.students_path(), &roster)?;
    anyhow::ensure!(!students.is_empty(), "no students found in roster or student list");

    let names: Vec<String> = match assignment {
        Some(name) => {
            config.assignment(&name)?;
            vec![name]
        }
        None => config.assignments.keys().cloned().collect(),
    };
    anyhow::ensure!(!names.is_empty(), "no assignments configured");

    let layout = config.layout();
    let options = config.extract_options();

    for name in &names {
        let files = &config.assignment(name)?.files;
        eprintln!("Extracting {name} for {} students...", students.len());

        let outcomes = extract_assignment(&layout, name, &students, files, &options).await?;
        print_outcomes(name, &outcomes);
    }

    Ok(())
}

fn print_outcomes(assignment: &str, outcomes: &[ExtractOutcome]) {
    use comfy_table::{Cell, Table};

    let extracted = outcomes.iter().filter(|o| o.archive.is_some()).count();
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    let mut table = Table::new();
    table.set_header(vec!["Student", "Archive", "Missing files", "Error"]);
    let mut rows = 0;

    for o in outcomes {
        // Only students that need attention are listed.
        if o.archive.is_some() && o.files_missing.is_empty() {
            continue;
        }
        let archive = o
            .archive
            .as_ref()
            .and_then(|a| a.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&o.student),
            Cell::new(archive),
            Cell::new(o.files_missing.join(", ")),
            Cell::new(o.error.as_deref().unwrap_or("")),
        ]);
        rows += 1;
    }

    println!(
        "{assignment}: {extracted}/{} extracted, {failed} failed",
        outcomes.len()
    );
    if rows > 0 {
        println!("{table}");
    }
}
