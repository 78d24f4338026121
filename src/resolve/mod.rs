//! Reference resolution
//!
//! Token documents are merged into one [`TokenNamespace`]; the [`Resolver`]
//! then turns every reference into a literal, for tokens and for the style
//! and prop values of components and patterns. The written expressions are
//! left untouched; results land in `Token::resolved_value` and
//! `BoundValue::resolved`.

mod namespace;
mod resolver;

pub use namespace::TokenNamespace;
pub use resolver::Resolver;

use crate::config::CompilerConfig;
use crate::diagnostics::ValidationIssue;
use crate::model::{ComponentSpec, PatternSpec};

/// Resolve tokens, component styling and pattern props in one pass.
pub fn resolve_all(
    namespace: &mut TokenNamespace,
    components: &mut [ComponentSpec],
    patterns: &mut [PatternSpec],
    config: &CompilerConfig,
) -> Vec<ValidationIssue> {
    let (resolved, issues) = {
        let mut resolver = Resolver::new(namespace, config);
        let resolved = resolver.resolve_tokens();
        for component in components.iter_mut() {
            resolver.resolve_component(component);
        }
        for pattern in patterns.iter_mut() {
            resolver.resolve_pattern(pattern);
        }
        (resolved, resolver.into_issues())
    };
    namespace.apply_resolved(resolved);
    issues
}
