//! Cheating report records and assembly.
//!
//! The report is a JSON array of cluster records. Field names and nesting
//! are consumed by the review viewer and must not change:
//!
//! ```json
//! [{"allowPartners": true, "file": "essay_hw1_", "score": 0.95,
//!   "members": [{"student": "alice", "partner": "bob", "semester": "F23"}]}]
//! ```
//!
//! Once a reviewer has looked at a cluster, its record also carries
//! `"evaluation": 1` (cheating) or `"evaluation": 2` (cleared). Unreviewed
//! clusters omit the field.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Cluster;
use crate::traits::ReportWriter;

/// Serialized form of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReport {
    pub student: String,
    pub partner: Option<String>,
    pub semester: Option<String>,
}

/// A reviewer's verdict on a stored cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Evaluation {
    Cheating,
    Clear,
}

impl From<Evaluation> for u8 {
    fn from(evaluation: Evaluation) -> u8 {
        match evaluation {
            Evaluation::Cheating => 1,
            Evaluation::Clear => 2,
        }
    }
}

impl TryFrom<u8> for Evaluation {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Evaluation::Cheating),
            2 => Ok(Evaluation::Clear),
            other => Err(format!("unknown evaluation code {other}, expected 1 or 2")),
        }
    }
}

/// Serialized form of a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    #[serde(rename = "allowPartners")]
    pub allow_partners: bool,
    pub file: String,
    pub score: f64,
    pub members: Vec<MemberReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

impl ClusterReport {
    /// Students and declared partners named by this cluster, deduplicated.
    pub fn implicated(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        for m in &self.members {
            names.insert(m.student.as_str());
            if let Some(p) = &m.partner {
                names.insert(p.as_str());
            }
        }
        names
    }
}

/// Record a reviewer's verdict on cluster `pos` of a loaded report.
pub fn set_evaluation(
    reports: &mut [ClusterReport],
    pos: usize,
    evaluation: Evaluation,
) -> Result<&ClusterReport, CoreError> {
    let len = reports.len();
    let cluster = reports
        .get_mut(pos)
        .ok_or(CoreError::NoSuchCluster { pos, len })?;
    cluster.evaluation = Some(evaluation);
    Ok(cluster)
}

/// Reports of exactly the clusters flagged as cheating, in input order.
pub fn build_cheating_report(clusters: &[Cluster]) -> Vec<ClusterReport> {
    clusters
        .iter()
        .filter(|c| c.is_cheating())
        .map(Cluster::to_report)
        .collect()
}

/// Encode a report as a JSON document.
pub fn to_json(reports: &[ClusterReport]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(reports).map_err(CoreError::Serialize)
}

/// Decode a JSON report document.
pub fn parse_report(json: &str) -> Result<Vec<ClusterReport>, CoreError> {
    serde_json::from_str(json).map_err(CoreError::MalformedReport)
}

/// Build the cheating report for `clusters` and hand it to `writer`.
///
/// Returns the number of clusters written.
pub fn write_cheating_report(
    clusters: &[Cluster],
    assignment: &str,
    filename: &str,
    writer: &dyn ReportWriter,
) -> Result<usize, CoreError> {
    let reports = build_cheating_report(clusters);
    let json = to_json(&reports)?;
    writer.write(&json, assignment, filename)?;

    tracing::info!(
        assignment,
        filename,
        flagged = reports.len(),
        total = clusters.len(),
        "wrote cheating report"
    );

    Ok(reports.len())
}

/// Load a report document from disk.
pub fn load_report(path: &Path) -> Result<Vec<ClusterReport>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report from {}", path.display()))?;
    let reports =
        parse_report(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(reports)
}

/// Counts describing one run of report assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Clusters produced by grouping.
    pub clusters: usize,
    /// Clusters with at least two members.
    pub matched: usize,
    /// Clusters flagged as cheating.
    pub flagged: usize,
    /// Pairs cleared by a mutual partner declaration.
    pub cleared_partners: usize,
    /// Distinct students and partners named by flagged clusters.
    pub implicated_students: usize,
}

impl ReportSummary {
    pub fn from_clusters(clusters: &[Cluster]) -> Self {
        let mut implicated = BTreeSet::new();
        let mut summary = ReportSummary {
            clusters: clusters.len(),
            ..Default::default()
        };

        for cluster in clusters {
            if cluster.len() >= 2 {
                summary.matched += 1;
            }
            if cluster.is_cheating() {
                summary.flagged += 1;
                for m in cluster.members() {
                    implicated.insert(m.student().to_string());
                    if let Some(p) = m.partner() {
                        implicated.insert(p.to_string());
                    }
                }
            } else if cluster.len() == 2 {
                summary.cleared_partners += 1;
            }
        }

        summary.implicated_students = implicated.len();
        summary
    }
}
