//! Member and cluster types, and the cheating policy.
//!
//! A [`Cluster`] is the set of students whose submissions an upstream
//! detector matched under one `(file, score)` key. Clusters are assembled
//! through a [`ClusterBuilder`] and become read-only once finished; the
//! cheating verdict is only available on the finished value.

use crate::partner::resolve_partner;
use crate::report::{ClusterReport, MemberReport};
use crate::traits::{AssignmentTextReader, Roster};

/// One student's presence in a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    student: String,
    semester: Option<String>,
    partner: Option<String>,
}

impl Member {
    /// Build a member by looking up the student's semester and declared
    /// partner. Never fails: missing data becomes `None`.
    pub fn resolve(
        student: &str,
        assignment: &str,
        roster: &dyn Roster,
        reader: &dyn AssignmentTextReader,
    ) -> Self {
        let semester = roster.semester(student);
        let partner = resolve_partner(student, assignment, semester.as_deref(), roster, reader);

        tracing::debug!(
            student,
            assignment,
            semester = semester.as_deref().unwrap_or("-"),
            partner = partner.as_deref().unwrap_or("-"),
            "resolved member"
        );

        Self {
            student: student.to_string(),
            semester,
            partner,
        }
    }

    /// Build a member from already-resolved values, e.g. when reloading a
    /// report. The caller vouches that `partner` shares `semester`.
    pub fn from_parts(
        student: impl Into<String>,
        semester: Option<String>,
        partner: Option<String>,
    ) -> Self {
        Self {
            student: student.into(),
            semester,
            partner,
        }
    }

    pub fn student(&self) -> &str {
        &self.student
    }

    pub fn semester(&self) -> Option<&str> {
        self.semester.as_deref()
    }

    pub fn partner(&self) -> Option<&str> {
        self.partner.as_deref()
    }

    /// Serializable form; absent values stay as explicit nulls.
    pub fn to_report(&self) -> MemberReport {
        MemberReport {
            student: self.student.clone(),
            partner: self.partner.clone(),
            semester: self.semester.clone(),
        }
    }
}

/// Accumulates members for one `(file, score)` key.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    members: Vec<Member>,
    allow_partners: bool,
    file: String,
    score: f64,
}

impl ClusterBuilder {
    pub fn new(allow_partners: bool, file: impl Into<String>, score: f64) -> Self {
        Self {
            members: Vec::new(),
            allow_partners,
            file: file.into(),
            score,
        }
    }

    /// Append `member` unless a member with the same student is already
    /// present. Returns `true` if the member was inserted.
    pub fn add(&mut self, member: Member) -> bool {
        if self.contains(member.student()) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn contains(&self, student: &str) -> bool {
        self.members.iter().any(|m| m.student == student)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Freeze the membership.
    pub fn finish(self) -> Cluster {
        Cluster {
            members: self.members,
            allow_partners: self.allow_partners,
            file: self.file,
            score: self.score,
        }
    }
}

/// A finished, read-only cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    members: Vec<Member>,
    allow_partners: bool,
    file: String,
    score: f64,
}

impl Cluster {
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn allow_partners(&self) -> bool {
        self.allow_partners
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether this cluster should be flagged for review.
    ///
    /// - fewer than two members: never cheating;
    /// - a pair on an assignment that allows partners: cheating unless both
    ///   declared each other;
    /// - anything else: cheating.
    pub fn is_cheating(&self) -> bool {
        match self.members.as_slice() {
            [] | [_] => false,
            [first, second] if self.allow_partners => !is_mutual_pair(first, second),
            _ => true,
        }
    }

    /// Serializable form with members in insertion order.
    pub fn to_report(&self) -> ClusterReport {
        ClusterReport {
            allow_partners: self.allow_partners,
            file: self.file.clone(),
            score: self.score,
            members: self.members.iter().map(Member::to_report).collect(),
            evaluation: None,
        }
    }
}

// A pair where either side declared nobody is never mutual.
fn is_mutual_pair(a: &Member, b: &Member) -> bool {
    match (a.partner(), b.partner()) {
        (Some(pa), Some(pb)) => pa == b.student && pb == a.student,
        _ => false,
    }
}
