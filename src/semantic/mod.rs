//! Semantic validation
//!
//! Checks that need the whole resolved batch: variant styling against
//! declared props, enum contents, pattern and `componentRef` targets,
//! duplicate names across documents and structural cycles.

mod checker;

pub use checker::SemanticChecker;

use crate::diagnostics::ValidationIssue;
use crate::graph::DependencyGraph;
use crate::model::{ComponentSpec, PatternSpec};

/// Run every semantic check over a resolved batch.
pub fn check(
    components: &[ComponentSpec],
    patterns: &[PatternSpec],
    graph: &DependencyGraph,
) -> Vec<ValidationIssue> {
    let mut checker = SemanticChecker::new(components, patterns, graph);
    checker.check_all();
    checker.into_issues()
}
