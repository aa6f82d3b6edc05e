//! The `copycat evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use copycat_core::index::StudentIndex;
use copycat_core::report::{load_report, set_evaluation, to_json, Evaluation};
use copycat_core::ReportWriter;
use copycat_corpus::config::load_config_from;
use copycat_corpus::FsReportWriter;

pub fn execute(
    assignment: String,
    report: String,
    index: usize,
    verdict: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let evaluation = match verdict.as_str() {
        "cheating" => Evaluation::Cheating,
        "clear" => Evaluation::Clear,
        other => anyhow::bail!("unknown verdict: {other} (expected cheating or clear)"),
    };

    let config = load_config_from(config_path.as_deref())?;
    let layout = config.layout();

    let path = layout.report_path(&assignment, &report);
    let mut clusters = load_report(&path)?;
    let mut students = StudentIndex::confirmed(&layout.load_reports()?);

    let cluster = set_evaluation(&mut clusters, index, evaluation)
        .with_context(|| format!("cannot evaluate {assignment}/{report}"))?
        .clone();
    students.apply_evaluation(&assignment, &report, index, &cluster, evaluation);

    let writer = FsReportWriter::new(layout.clone());
    writer.write(&to_json(&clusters)?, &assignment, &report)?;
    tracing::info!(assignment = %assignment, report = %report, index, ?evaluation, "recorded evaluation");

    let label = match evaluation {
        Evaluation::Cheating => "cheating",
        Evaluation::Clear => "clear",
    };
    println!("Marked {assignment}/{report} #{index} as {label}.");

    // A cleared cluster does not clear a student other confirmed clusters still name.
    for name in cluster.implicated() {
        let confirmed: Vec<String> = students
            .query_assignment(name, &assignment)
            .into_iter()
            .flatten()
            .flat_map(|(detector, positions)| positions.iter().map(move |p| format!("{detector} #{p}")))
            .collect();

        if confirmed.is_empty() {
            println!("  {name}: no confirmed clusters in {assignment}");
        } else {
            println!("  {name}: implicated by {}", confirmed.join(", "));
        }
    }

    Ok(())
}
