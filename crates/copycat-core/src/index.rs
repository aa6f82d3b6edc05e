//! Inverted index from students to the flagged clusters naming them.
//!
//! Reports are stored per assignment and per detector (the report filename).
//! A student is indexed under every cluster in which they appear as a member
//! or as someone's declared partner.
//!
//! Built with [`StudentIndex::confirmed`], the index only holds clusters a
//! reviewer marked as cheating. An unreviewed cluster then counts as cheating
//! when any of its students is already implicated in the same assignment.

use std::collections::BTreeMap;

use crate::analysis::LoadedReport;
use crate::report::{ClusterReport, Evaluation, MemberReport};

/// Position of a cluster inside the report it was loaded from.
pub type ClusterPos = usize;

pub type DetectorMap = BTreeMap<String, Vec<ClusterPos>>;
pub type AssignmentMap = BTreeMap<String, DetectorMap>;

#[derive(Debug, Clone, Default)]
pub struct StudentIndex {
    index: BTreeMap<String, AssignmentMap>,
}

impl StudentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the clusters reviewers confirmed as cheating.
    pub fn confirmed(reports: &[LoadedReport]) -> Self {
        let mut index = Self::new();
        index.rebuild(reports);
        index
    }

    /// Drop everything and index the confirmed clusters of `reports`.
    pub fn rebuild(&mut self, reports: &[LoadedReport]) {
        self.reset();
        for loaded in reports {
            for (pos, cluster) in loaded.clusters.iter().enumerate() {
                if cluster.evaluation == Some(Evaluation::Cheating) {
                    self.add_cluster(&loaded.assignment, &loaded.detector, pos, cluster);
                }
            }
        }
    }

    /// Index every cluster of one report, reviewed or not.
    pub fn add_report(&mut self, assignment: &str, detector: &str, reports: &[ClusterReport]) {
        for (pos, cluster) in reports.iter().enumerate() {
            self.add_cluster(assignment, detector, pos, cluster);
        }
    }

    /// Index cluster `pos` under each of its members and partners.
    pub fn add_cluster(&mut self, assignment: &str, detector: &str, pos: ClusterPos, cluster: &ClusterReport) {
        for name in cluster.implicated() {
            self.add(name, assignment, detector, pos);
        }
    }

    pub fn remove_cluster(
        &mut self,
        assignment: &str,
        detector: &str,
        pos: ClusterPos,
        cluster: &ClusterReport,
    ) {
        for name in cluster.implicated() {
            self.remove(name, assignment, detector, pos);
        }
    }

    /// Keep the index in step with a reviewer's verdict on one cluster.
    pub fn apply_evaluation(
        &mut self,
        assignment: &str,
        detector: &str,
        pos: ClusterPos,
        cluster: &ClusterReport,
        evaluation: Evaluation,
    ) {
        match evaluation {
            Evaluation::Cheating => self.add_cluster(assignment, detector, pos, cluster),
            Evaluation::Clear => self.remove_cluster(assignment, detector, pos, cluster),
        }
    }

    /// Verdict for a stored cluster: the reviewer's evaluation if there is
    /// one, otherwise whether any of its students is implicated elsewhere
    /// in the assignment.
    pub fn has_cheating(&self, cluster: &ClusterReport, assignment: &str) -> bool {
        match cluster.evaluation {
            Some(Evaluation::Cheating) => true,
            Some(Evaluation::Clear) => false,
            None => !self.detectors_for(&cluster.members, assignment).is_empty(),
        }
    }

    /// Record that `student` is implicated in cluster `pos`.
    pub fn add(&mut self, student: &str, assignment: &str, detector: &str, pos: ClusterPos) {
        let positions = self
            .index
            .entry(student.to_string())
            .or_default()
            .entry(assignment.to_string())
            .or_default()
            .entry(detector.to_string())
            .or_default();
        if !positions.contains(&pos) {
            positions.push(pos);
        }
    }

    /// Drop a single cluster reference. Empty entries are kept so a reviewer
    /// can still see that the student was considered.
    pub fn remove(&mut self, student: &str, assignment: &str, detector: &str, pos: ClusterPos) {
        if let Some(positions) = self
            .index
            .get_mut(student)
            .and_then(|a| a.get_mut(assignment))
            .and_then(|d| d.get_mut(detector))
        {
            positions.retain(|&p| p != pos);
        }
    }

    /// Everything recorded for a student.
    pub fn query(&self, student: &str) -> Option<&AssignmentMap> {
        self.index.get(student)
    }

    /// A student's detectors for one assignment.
    pub fn query_assignment(&self, student: &str, assignment: &str) -> Option<&DetectorMap> {
        self.index.get(student)?.get(assignment)
    }

    /// Cluster positions for one student, assignment, and detector.
    pub fn clusters_for(&self, student: &str, assignment: &str, detector: &str) -> &[ClusterPos] {
        self.query_assignment(student, assignment)
            .and_then(|d| d.get(detector))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Detectors with at least one cluster implicating any of `members` or
    /// their partners. Members are visited in order; each one's detectors
    /// come in name order, and a detector is listed once.
    pub fn detectors_for(&self, members: &[MemberReport], assignment: &str) -> Vec<String> {
        let mut detectors: Vec<String> = Vec::new();

        let names = members
            .iter()
            .flat_map(|m| std::iter::once(m.student.as_str()).chain(m.partner.as_deref()));

        for name in names {
            let Some(by_detector) = self.query_assignment(name, assignment) else {
                continue;
            };
            for (detector, positions) in by_detector {
                if !positions.is_empty() && !detectors.contains(detector) {
                    detectors.push(detector.clone());
                }
            }
        }

        detectors
    }

    /// Number of indexed students.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn reset(&mut self) {
        self.index.clear();
    }
}
