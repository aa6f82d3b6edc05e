//! The `copycat student` command.

use std::path::PathBuf;

use anyhow::Result;

use copycat_core::index::StudentIndex;
use copycat_core::report::Evaluation;
use copycat_corpus::config::load_config_from;

pub fn execute(id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let reports = config.layout().load_reports()?;

    let mut index = StudentIndex::new();
    for r in &reports {
        index.add_report(&r.assignment, &r.detector, &r.clusters);
    }

    let Some(by_assignment) = index.query(&id) else {
        println!("No flagged clusters for {id}.");
        return Ok(());
    };

    println!("{id}:");
    for (assignment, by_detector) in by_assignment {
        for (detector, positions) in by_detector {
            let Some(loaded) = reports
                .iter()
                .find(|r| &r.assignment == assignment && &r.detector == detector)
            else {
                continue;
            };
            for &pos in positions {
                let cluster = &loaded.clusters[pos];
                let members: Vec<String> = cluster
                    .members
                    .iter()
                    .map(|m| match &m.partner {
                        Some(p) => format!("{} (partner {p})", m.student),
                        None => m.student.clone(),
                    })
                    .collect();
                let status = match cluster.evaluation {
                    Some(Evaluation::Cheating) => "confirmed",
                    Some(Evaluation::Clear) => "cleared",
                    None => "unreviewed",
                };
                println!(
                    "  {assignment}/{detector} #{pos}: {} @ {:.2} -> {} [{status}]",
                    cluster.file,
                    cluster.score,
                    members.join(", ")
                );
            }
        }
    }

    Ok(())
}
