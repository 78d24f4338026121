//! The design-system IR
//!
//! [`DesignSystemIR`] is the only artifact generators consume. It is built
//! once per compile and never mutated afterwards; every token, style value
//! and node prop that resolved carries its literal value alongside the
//! expression as written.

mod tokens;

pub use tokens::TokenCollections;

use crate::base::SchemaVersion;
use crate::diagnostics::{Severity, ValidationIssue};
use crate::graph::DependencyGraph;
use crate::model::{ComponentSpec, PatternSpec, Token};

/// Resolved tokens, components and patterns plus every issue of the compile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "camelCase"))]
pub struct DesignSystemIR {
    pub schema_version: SchemaVersion,
    pub tokens: TokenCollections,
    pub components: Vec<ComponentSpec>,
    pub patterns: Vec<PatternSpec>,
    pub issues: Vec<ValidationIssue>,
}

impl DesignSystemIR {
    /// Assemble the IR. Always succeeds; a failed compile still gets a
    /// best-effort IR.
    pub fn assemble(
        schema_version: SchemaVersion,
        tokens: Vec<Token>,
        components: Vec<ComponentSpec>,
        patterns: Vec<PatternSpec>,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        Self {
            schema_version,
            tokens: TokenCollections::from_tokens(tokens),
            components,
            patterns,
            issues,
        }
    }

    /// No issue has error severity.
    pub fn success(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn pattern(&self, name: &str) -> Option<&PatternSpec> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Build a fresh dependency graph over this IR.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let tokens: Vec<Token> = self.tokens.iter().cloned().collect();
        DependencyGraph::build(&tokens, &self.components, &self.patterns)
    }

    /// Pretty-printed JSON rendering of the whole IR.
    #[cfg(feature = "interchange")]
    pub fn to_json(&self) -> Result<String, crate::interchange::InterchangeError> {
        use crate::interchange::{IrFormat, Json};

        let bytes = Json.write(self)?;
        String::from_utf8(bytes).map_err(|e| crate::interchange::InterchangeError::json(e.to_string()))
    }
}
