//! The `copycat cluster` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use copycat_core::grouping::{group_candidates, load_candidates};
use copycat_core::report::{write_cheating_report, ReportSummary};
use copycat_corpus::config::load_config_from;
use copycat_corpus::{CsvRoster, FsAssignmentReader, FsReportWriter};

pub fn execute(
    assignment: String,
    candidates_path: PathBuf,
    output: String,
    allow_partners_flag: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(!output.trim().is_empty(), "output name must not be empty");

    let config = load_config_from(config_path.as_deref())?;
    let allow_partners = match config.assignments.get(&assignment) {
        Some(a) => a.allow_partners || allow_partners_flag,
        None => {
            tracing::warn!("assignment '{assignment}' is not configured, using defaults");
            allow_partners_flag
        }
    };

    let roster = CsvRoster::load_or_empty(&config.roster_path())?;
    let groups = load_candidates(&candidates_path)?;

    let layout = config.layout();
    let reader = FsAssignmentReader::new(layout.clone());
    let writer = FsReportWriter::new(layout.clone());

    let clusters = group_candidates(&assignment, allow_partners, &groups, &roster, &reader);
    let summary = ReportSummary::from_clusters(&clusters);

    write_cheating_report(&clusters, &assignment, &output, &writer)
        .context("failed to save cheating report")?;

    print_summary(&assignment, allow_partners, &summary);
    eprintln!(
        "Report saved to: {}",
        layout.report_path(&assignment, &output).display()
    );

    Ok(())
}

fn print_summary(assignment: &str, allow_partners: bool, summary: &ReportSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Assignment",
        "Partners",
        "Clusters",
        "Matched",
        "Flagged",
        "Cleared pairs",
        "Students",
    ]);
    table.add_row(vec![
        Cell::new(assignment),
        Cell::new(if allow_partners { "allowed" } else { "no" }),
        Cell::new(summary.clusters),
        Cell::new(summary.matched),
        Cell::new(summary.flagged),
        Cell::new(summary.cleared_partners),
        Cell::new(summary.implicated_students),
    ]);

    println!("{table}");
}
