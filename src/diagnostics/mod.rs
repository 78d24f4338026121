//! Validation issue reporting.
//!
//! Every pipeline stage reports problems as [`ValidationIssue`]s appended to
//! an [`IssueCollector`] owned by a single compile invocation. Issues are
//! immutable once built and are never discarded.

mod collector;
mod issue;
mod suggest;

pub mod codes;

pub use codes::IssueCategory;
pub use collector::IssueCollector;
pub use issue::{Severity, ValidationIssue};
pub use suggest::{did_you_mean, similar_names};
