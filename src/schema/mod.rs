//! Schema validation
//!
//! Projects a (possibly migrated) raw tree into typed documents for its
//! kind, collecting every violated constraint as a separate issue with the
//! exact field path. A document with any error-severity issue does not
//! proceed to reference resolution.
//!
//! ```text
//! RawNode ──kind──► tokens      → TokensDocument
//!                 ├ components  → ComponentsDocument
//!                 └ patterns    → PatternsDocument
//! ```

mod components;
mod context;
mod literals;
mod patterns;
mod tokens;

use std::fmt;
use std::sync::Arc;

use crate::base::constants::{KIND_FIELD, SCHEMA_VERSION_FIELD};
use crate::config::CompilerConfig;
use crate::diagnostics::{ValidationIssue, codes, did_you_mean};
use crate::parser::RawNode;

pub use components::ComponentsDocument;
pub use literals::{is_color, parse_dimension, parse_duration};
pub use patterns::PatternsDocument;
pub use tokens::TokensDocument;

use context::Projector;

/// Kind of a source document, from its `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Tokens,
    Components,
    Patterns,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Tokens, Self::Components, Self::Patterns];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Components => "components",
            Self::Patterns => "patterns",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Top-level key holding the document's entries.
    pub fn collection_key(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that passed schema projection.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedDocument {
    Tokens(TokensDocument),
    Components(ComponentsDocument),
    Patterns(PatternsDocument),
}

impl ValidatedDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Tokens(_) => DocumentKind::Tokens,
            Self::Components(_) => DocumentKind::Components,
            Self::Patterns(_) => DocumentKind::Patterns,
        }
    }

    pub fn file(&self) -> &Arc<str> {
        match self {
            Self::Tokens(d) => &d.file,
            Self::Components(d) => &d.file,
            Self::Patterns(d) => &d.file,
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone)]
pub struct SchemaOutcome {
    /// Projected document; present whenever the kind could be determined,
    /// even if errors were found.
    pub document: Option<ValidatedDocument>,
    pub issues: Vec<ValidationIssue>,
}

impl SchemaOutcome {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    /// The document, only if it may proceed to resolution.
    pub fn into_valid(self) -> Option<ValidatedDocument> {
        if self.has_errors() {
            None
        } else {
            self.document
        }
    }
}

/// Validate a document against the current schema for its kind.
pub fn validate_document(root: &RawNode, file: &Arc<str>, config: &CompilerConfig) -> SchemaOutcome {
    let mut p = Projector::new(file.clone(), config);
    let document = project(&mut p, root);
    SchemaOutcome {
        document,
        issues: p.into_issues(),
    }
}

fn project(p: &mut Projector<'_>, root: &RawNode) -> Option<ValidatedDocument> {
    let map = p.expect_map(root)?;
    let kind_name = p.required_str(map, KIND_FIELD, &root.location)?;
    let Some(kind) = DocumentKind::from_name(kind_name) else {
        let location = map.get(KIND_FIELD).map_or(&root.location, |n| &n.location);
        let mut issue = ValidationIssue::error(
            codes::INVALID_ENUM_VALUE,
            format!("'{kind_name}' is not a document kind (expected tokens, components or patterns)"),
        )
        .with_location(location.clone());
        if let Some(hint) = did_you_mean(kind_name, DocumentKind::ALL.iter().map(DocumentKind::as_str)) {
            issue = issue.with_suggestion(hint);
        }
        p.enter(KIND_FIELD, |p| p.report(issue));
        return None;
    };

    p.check_fields(
        map,
        &[
            "$schema",
            SCHEMA_VERSION_FIELD,
            KIND_FIELD,
            "name",
            "description",
            kind.collection_key(),
        ],
    );
    p.optional_str(map, "name");
    p.optional_str(map, "description");

    Some(match kind {
        DocumentKind::Tokens => ValidatedDocument::Tokens(tokens::project_tokens(p, map, root)),
        DocumentKind::Components => {
            ValidatedDocument::Components(components::project_components(p, map, root))
        }
        DocumentKind::Patterns => {
            ValidatedDocument::Patterns(patterns::project_patterns(p, map, root))
        }
    })
}
