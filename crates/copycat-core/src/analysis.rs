//! Corpus-wide statistics over stored cheating reports.
//!
//! A stored cluster counts as cheating when a reviewer confirmed it, or when
//! it is unreviewed and one of its students is implicated by a confirmed
//! cluster of the same assignment. See [`StudentIndex::has_cheating`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::index::StudentIndex;
use crate::report::{ClusterReport, Evaluation};

/// Semester label used for members the roster did not know.
pub const UNKNOWN_SEMESTER: &str = "unknown";

/// A report file loaded from the output tree.
#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub assignment: String,
    /// Name of the report file, which identifies the detector/file it covers.
    pub detector: String,
    pub clusters: Vec<ClusterReport>,
}

/// Statistics for one report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub assignment: String,
    pub detector: String,
    pub clusters: usize,
    pub unique_students: usize,
    pub cheaters: usize,
    /// Clusters a reviewer confirmed as cheating.
    pub direct: usize,
    /// Unreviewed clusters implicated through a confirmed one.
    pub auto_implicated: usize,
    /// Clusters a reviewer cleared.
    pub false_positives: usize,
    /// Unreviewed clusters nothing implicates yet.
    pub unreviewed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemesterStats {
    pub cheaters: usize,
    pub enrolled: usize,
}

/// Results of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusAnalysis {
    pub total_students: usize,
    pub cheaters: usize,
    pub reports: Vec<ReportStats>,
    /// Unique cheaters per assignment.
    pub per_assignment: BTreeMap<String, usize>,
    pub per_semester: BTreeMap<String, SemesterStats>,
    pub intra_semester_clusters: usize,
    pub inter_semester_clusters: usize,
    /// Number of students implicated in exactly `k` assignments, keyed by `k`.
    pub offense_counts: BTreeMap<usize, usize>,
}

/// Compute corpus statistics.
///
/// `enrolled` maps each semester to its roster size; `total_students` is the
/// size of the whole corpus.
pub fn analyze(
    reports: &[LoadedReport],
    total_students: usize,
    enrolled: &BTreeMap<String, usize>,
) -> CorpusAnalysis {
    let index = StudentIndex::confirmed(reports);
    let mut all_cheaters: BTreeSet<String> = BTreeSet::new();
    let mut per_assignment: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut stats = Vec::with_capacity(reports.len());
    let mut intra = 0;
    let mut inter = 0;

    for loaded in reports {
        let mut unique: BTreeSet<&str> = BTreeSet::new();
        let mut cheaters: BTreeSet<&str> = BTreeSet::new();
        let mut direct = 0;
        let mut auto_implicated = 0;
        let mut false_positives = 0;
        let mut unreviewed = 0;

        for report in &loaded.clusters {
            let implicated = report.implicated();
            unique.extend(implicated.iter().copied());

            if !index.has_cheating(report, &loaded.assignment) {
                match report.evaluation {
                    Some(Evaluation::Clear) => false_positives += 1,
                    _ => unreviewed += 1,
                }
                continue;
            }
            match report.evaluation {
                Some(Evaluation::Cheating) => direct += 1,
                _ => auto_implicated += 1,
            }

            cheaters.extend(implicated.iter().copied());
            if is_intra_semester(report) {
                intra += 1;
            } else {
                inter += 1;
            }
        }

        let assignment_cheaters = per_assignment.entry(loaded.assignment.clone()).or_default();
        for c in &cheaters {
            all_cheaters.insert(c.to_string());
            assignment_cheaters.insert(c.to_string());
        }

        stats.push(ReportStats {
            assignment: loaded.assignment.clone(),
            detector: loaded.detector.clone(),
            clusters: loaded.clusters.len(),
            unique_students: unique.len(),
            cheaters: cheaters.len(),
            direct,
            auto_implicated,
            false_positives,
            unreviewed,
        });
    }

    let mut offenses: BTreeMap<&str, usize> = BTreeMap::new();
    for students in per_assignment.values() {
        for s in students {
            *offenses.entry(s.as_str()).or_default() += 1;
        }
    }
    let mut offense_counts: BTreeMap<usize, usize> = BTreeMap::new();
    for count in offenses.values() {
        *offense_counts.entry(*count).or_default() += 1;
    }

    let per_semester = semester_breakdown(reports, &all_cheaters, enrolled);

    CorpusAnalysis {
        total_students,
        cheaters: all_cheaters.len(),
        reports: stats,
        per_assignment: per_assignment
            .into_iter()
            .map(|(a, s)| (a, s.len()))
            .collect(),
        per_semester,
        intra_semester_clusters: intra,
        inter_semester_clusters: inter,
        offense_counts,
    }
}

// Partners are attributed to the semester of the member who named them.
fn semester_breakdown(
    reports: &[LoadedReport],
    cheaters: &BTreeSet<String>,
    enrolled: &BTreeMap<String, usize>,
) -> BTreeMap<String, SemesterStats> {
    let mut seen: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

    for report in reports.iter().flat_map(|r| &r.clusters) {
        for m in &report.members {
            let semester = m
                .semester
                .clone()
                .unwrap_or_else(|| UNKNOWN_SEMESTER.to_string());
            let names = seen.entry(semester).or_default();
            for name in std::iter::once(m.student.as_str()).chain(m.partner.as_deref()) {
                if cheaters.contains(name) {
                    names.insert(name);
                }
            }
        }
    }

    let mut out: BTreeMap<String, SemesterStats> = enrolled
        .iter()
        .map(|(s, &n)| {
            (
                s.clone(),
                SemesterStats {
                    cheaters: 0,
                    enrolled: n,
                },
            )
        })
        .collect();
    for (semester, names) in seen {
        out.entry(semester).or_default().cheaters = names.len();
    }
    out
}

fn is_intra_semester(report: &ClusterReport) -> bool {
    match report.members.split_first() {
        Some((first, rest)) => rest.iter().all(|m| m.semester == first.semester),
        None => true,
    }
}

fn percent(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64 * 100.0
    }
}

impl CorpusAnalysis {
    /// Share of all students implicated in at least one cheating cluster.
    pub fn cheater_percent(&self) -> f64 {
        percent(self.cheaters, self.total_students)
    }

    /// Human-readable summary.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "There are {} total students in the corpus.",
            self.total_students
        );
        let _ = writeln!(
            out,
            "Of which, {} or {:.2}% were found to be cheating.\n",
            self.cheaters,
            self.cheater_percent()
        );

        out.push_str("Results per report:\n\n");
        for r in &self.reports {
            let _ = writeln!(out, "For {}/{}:", r.assignment, r.detector);
            let _ = writeln!(out, "  Total clusters -> {}", r.clusters);
            let _ = writeln!(out, "  Unique students in clusters -> {}", r.unique_students);
            let _ = writeln!(out, "  Unique students found cheating -> {}", r.cheaters);
            let _ = writeln!(out, "  Directly implicated clusters -> {}", r.direct);
            let _ = writeln!(out, "  Auto-implicated clusters -> {}", r.auto_implicated);
            let _ = writeln!(out, "  False positive clusters -> {}", r.false_positives);
            let _ = writeln!(out, "  Unreviewed clusters -> {}", r.unreviewed);
            let assignment_total = self.per_assignment.get(&r.assignment).copied().unwrap_or(0);
            let _ = writeln!(
                out,
                "  Share of this assignment's cheaters: {:.2}%\n",
                percent(r.cheaters, assignment_total)
            );
        }

        out.push_str("Results per assignment:\n\n");
        for (assignment, count) in &self.per_assignment {
            let _ = writeln!(
                out,
                "{assignment}: {count} cheaters, or {:.2}% of total students.",
                percent(*count, self.total_students)
            );
        }
        out.push('\n');

        out.push_str("Results per semester:\n\n");
        let _ = writeln!(
            out,
            "Intra-semester cheating clusters -> {}",
            self.intra_semester_clusters
        );
        let _ = writeln!(
            out,
            "Inter-semester cheating clusters -> {}",
            self.inter_semester_clusters
        );
        for (semester, s) in &self.per_semester {
            let _ = writeln!(
                out,
                "{semester}: {} cheaters of {}, or {:.2}%.",
                s.cheaters,
                s.enrolled,
                percent(s.cheaters, s.enrolled)
            );
        }
        out.push('\n');

        out.push_str("Number of assignments students cheated on:\n\n");
        for (k, n) in &self.offense_counts {
            let _ = writeln!(out, "{k}: {n} or {:.2}%.", percent(*n, self.cheaters));
        }

        out
    }
}
