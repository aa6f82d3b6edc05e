//! Cheating-cluster model, partner resolution, and reports.
//!
//! This crate defines the member/cluster data model, the cheating policy,
//! and the JSON report contract that the rest of copycat builds on.

pub mod analysis;
pub mod error;
pub mod grouping;
pub mod index;
pub mod model;
pub mod partner;
pub mod report;
pub mod traits;

pub use error::CoreError;
pub use index::StudentIndex;
pub use model::{Cluster, ClusterBuilder, Member};
pub use report::{
    build_cheating_report, write_cheating_report, ClusterReport, Evaluation, MemberReport,
};
pub use traits::{AssignmentTextReader, ReportWriter, Roster};
