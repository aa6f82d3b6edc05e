//! Partner declaration parsing and resolution.
//!
//! Students name their partner in a free-form text file. Each line
//! contributes at most one candidate (its first token); commas count as
//! whitespace. A candidate is only trusted when the roster places it in the
//! same semester as the declaring student, and the first such candidate
//! wins.

use crate::traits::{AssignmentTextReader, Roster};

/// A parsed partner declaration: candidate identifiers in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerDeclaration {
    candidates: Vec<String>,
}

impl PartnerDeclaration {
    /// Tokenize raw declaration text.
    pub fn parse(text: &str) -> Self {
        let normalized = text.replace(',', " ");
        let candidates = normalized
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();

        Self { candidates }
    }

    /// Every candidate, including ones that will later be rejected.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidates that could name a partner of `student`.
    ///
    /// Drops the student's own identifier and single-character tokens, which
    /// are list bullets or stray punctuation rather than identifiers.
    pub fn plausible_for<'a>(&'a self, student: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.candidates
            .iter()
            .map(String::as_str)
            .filter(move |c| c.chars().count() > 1 && *c != student)
    }
}

/// Resolve the declared partner of `student` for `assignment`.
///
/// Returns `None` when the student filed no declaration, when the student's
/// own semester is unknown, or when no candidate shares that semester.
pub fn resolve_partner(
    student: &str,
    assignment: &str,
    semester: Option<&str>,
    roster: &dyn Roster,
    reader: &dyn AssignmentTextReader,
) -> Option<String> {
    let semester = semester?;
    let text = reader.read_partner_declaration(student, assignment)?;
    let declaration = PartnerDeclaration::parse(&text);

    let partner = declaration
        .plausible_for(student)
        .find(|candidate| roster.semester(candidate).as_deref() == Some(semester))
        .map(str::to_string);

    if partner.is_none() && !declaration.candidates().is_empty() {
        tracing::debug!(
            student,
            assignment,
            candidates = ?declaration.candidates(),
            "no declared partner shares the student's semester"
        );
    }

    partner
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn roster(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect()
    }

    fn texts(entries: &[(&str, &str, &str)]) -> HashMap<(String, String), String> {
        entries
            .iter()
            .map(|(s, a, t)| ((s.to_string(), a.to_string()), t.to_string()))
            .collect()
    }

    #[test]
    fn parse_takes_first_token_per_line() {
        let decl = PartnerDeclaration::parse("bob smith\n  carol   \n\ndave, eve\n");
        assert_eq!(decl.candidates(), &["bob", "carol", "dave"]);
    }

    #[test]
    fn parse_treats_commas_as_whitespace() {
        let decl = PartnerDeclaration::parse(",bob,carol");
        assert_eq!(decl.candidates(), &["bob"]);
    }

    #[test]
    fn parse_handles_crlf() {
        let decl = PartnerDeclaration::parse("bob\r\ncarol\r\n");
        assert_eq!(decl.candidates(), &["bob", "carol"]);
    }

    #[test]
    fn plausible_skips_self_and_single_chars() {
        let decl = PartnerDeclaration::parse("alice\n-\nbob\n");
        let found: Vec<&str> = decl.plausible_for("alice").collect();
        assert_eq!(found, vec!["bob"]);
    }

    #[test]
    fn resolves_same_semester_partner() {
        let roster = roster(&[("alice", "F23"), ("bob", "F23")]);
        let reader = texts(&[("alice", "hw1", "bob\n")]);

        let partner = resolve_partner("alice", "hw1", Some("F23"), &roster, &reader);
        assert_eq!(partner.as_deref(), Some("bob"));
    }

    #[test]
    fn rejects_partner_from_other_semester() {
        let roster = roster(&[("alice", "F23"), ("bob", "S23")]);
        let reader = texts(&[("alice", "hw1", "bob\n")]);

        assert_eq!(
            resolve_partner("alice", "hw1", Some("F23"), &roster, &reader),
            None
        );
    }

    #[test]
    fn first_qualifying_candidate_wins() {
        let roster = roster(&[("alice", "F23"), ("bob", "S23"), ("carol", "F23"), ("dave", "F23")]);
        let reader = texts(&[("alice", "hw1", "bob\ncarol\ndave\n")]);

        let partner = resolve_partner("alice", "hw1", Some("F23"), &roster, &reader);
        assert_eq!(partner.as_deref(), Some("carol"));
    }

    #[test]
    fn unknown_candidate_is_skipped() {
        let roster = roster(&[("alice", "F23")]);
        let reader = texts(&[("alice", "hw1", "ghost\n")]);

        assert_eq!(
            resolve_partner("alice", "hw1", Some("F23"), &roster, &reader),
            None
        );
    }

    #[test]
    fn missing_declaration_is_absent() {
        let roster = roster(&[("alice", "F23"), ("bob", "F23")]);
        let reader = texts(&[]);

        assert_eq!(
            resolve_partner("alice", "hw1", Some("F23"), &roster, &reader),
            None
        );
    }

    #[test]
    fn unknown_own_semester_never_matches() {
        let roster = roster(&[("bob", "F23")]);
        let reader = texts(&[("alice", "hw1", "bob\n")]);

        assert_eq!(resolve_partner("alice", "hw1", None, &roster, &reader), None);
    }

    #[test]
    fn declaration_for_other_assignment_is_ignored() {
        let roster = roster(&[("alice", "F23"), ("bob", "F23")]);
        let reader = texts(&[("alice", "hw2", "bob\n")]);

        assert_eq!(
            resolve_partner("alice", "hw1", Some("F23"), &roster, &reader),
            None
        );
    }
}
