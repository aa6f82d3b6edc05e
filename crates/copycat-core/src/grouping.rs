//! Turning detector output into clusters.
//!
//! The similarity detector reports candidate groups: students whose copies
//! of `file` matched with the same `score`. Groups sharing a `(file, score)`
//! key are merged into one cluster, in the order their keys first appear.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Cluster, ClusterBuilder, Member};
use crate::traits::{AssignmentTextReader, Roster};

/// One group of matching submissions as emitted by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGroup {
    pub file: String,
    pub score: f64,
    pub students: Vec<String>,
}

/// Load candidate groups from a JSON array on disk.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateGroup>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates from {}", path.display()))?;
    let groups: Vec<CandidateGroup> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse candidates in {}", path.display()))?;
    Ok(groups)
}

/// Clusters for one assignment, keyed by `(file, score)`.
pub struct ClusterSet<'a> {
    assignment: String,
    allow_partners: bool,
    roster: &'a dyn Roster,
    reader: &'a dyn AssignmentTextReader,
    keys: HashMap<(String, u64), usize>,
    builders: Vec<ClusterBuilder>,
}

impl<'a> ClusterSet<'a> {
    pub fn new(
        assignment: impl Into<String>,
        allow_partners: bool,
        roster: &'a dyn Roster,
        reader: &'a dyn AssignmentTextReader,
    ) -> Self {
        Self {
            assignment: assignment.into(),
            allow_partners,
            roster,
            reader,
            keys: HashMap::new(),
            builders: Vec::new(),
        }
    }

    /// Place `student` in the cluster for `(file, score)`, creating it if
    /// needed. Returns `false` if the student was already there.
    pub fn add(&mut self, file: &str, score: f64, student: &str) -> bool {
        let slot = self.slot(file, score);
        let builder = &mut self.builders[slot];
        if builder.contains(student) {
            return false;
        }
        let member = Member::resolve(student, &self.assignment, self.roster, self.reader);
        builder.add(member)
    }

    /// Add every student of a candidate group.
    pub fn add_group(&mut self, group: &CandidateGroup) {
        // An empty group still reserves its key so cluster order follows the input.
        self.slot(&group.file, group.score);
        for student in &group.students {
            self.add(&group.file, group.score, student);
        }
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Freeze every cluster, in first-seen key order.
    pub fn finish(self) -> Vec<Cluster> {
        tracing::debug!(
            assignment = %self.assignment,
            clusters = self.builders.len(),
            "grouping complete"
        );
        self.builders.into_iter().map(ClusterBuilder::finish).collect()
    }

    fn slot(&mut self, file: &str, score: f64) -> usize {
        let key = (file.to_string(), score.to_bits());
        if let Some(&slot) = self.keys.get(&key) {
            return slot;
        }
        let slot = self.builders.len();
        self.builders
            .push(ClusterBuilder::new(self.allow_partners, file, score));
        self.keys.insert(key, slot);
        slot
    }
}

/// Group all candidates for an assignment into finished clusters.
pub fn group_candidates(
    assignment: &str,
    allow_partners: bool,
    groups: &[CandidateGroup],
    roster: &dyn Roster,
    reader: &dyn AssignmentTextReader,
) -> Vec<Cluster> {
    let mut set = ClusterSet::new(assignment, allow_partners, roster, reader);
    for group in groups {
        set.add_group(group);
    }
    set.finish()
}
