//! Document parser
//!
//! Turns raw document text into a located [`RawNode`] tree:
//! - **logos** for fast lexing of JSON-family documents
//! - hand-written recursive descent with error recovery
//! - **serde_yaml** for YAML documents (feature `yaml`)
//!
//! ## Architecture
//!
//! ```text
//! SourceDocument (text + format)
//!     ↓
//! Lexer (logos) → Tokens
//!     ↓
//! Parser (recursive descent) → RawNode tree + syntax issues
//! ```
//!
//! Parsing is a pure function per document, so a batch can be parsed in
//! parallel. A syntax error only ever affects its own document.

mod json;
mod lexer;
mod raw;
mod render;
#[cfg(feature = "yaml")]
mod yaml;

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::base::constants::{JSON_EXT, JSONC_EXT, YAML_EXT, YML_EXT};
use crate::base::SourceLocation;
use crate::diagnostics::{ValidationIssue, codes};

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use raw::{RawEntry, RawMap, RawNode, RawValue};

/// Declared syntax of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            JSON_EXT | JSONC_EXT => Some(Self::Json),
            YAML_EXT | YML_EXT => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A document loaded into memory, ready to parse.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: Arc<str>,
    pub text: Arc<str>,
    pub format: DocumentFormat,
}

impl SourceDocument {
    pub fn new(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>, format: DocumentFormat) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            format,
        }
    }

    pub fn json(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(path, text, DocumentFormat::Json)
    }

    pub fn yaml(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(path, text, DocumentFormat::Yaml)
    }
}

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub file: Arc<str>,
    /// Partial or complete tree; `None` when nothing could be recovered.
    pub root: Option<RawNode>,
    pub issues: Vec<ValidationIssue>,
}

impl ParsedDocument {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }
}

/// Parse a single document.
pub fn parse_document(document: &SourceDocument) -> ParsedDocument {
    let file = document.path.clone();
    let (root, issues) = match document.format {
        DocumentFormat::Json => json::parse_json(&file, &document.text),
        DocumentFormat::Yaml => parse_yaml_document(&file, &document.text),
    };
    ParsedDocument { file, root, issues }
}

/// Parse a batch of documents, optionally on the rayon pool.
///
/// Results are returned in input order either way.
pub fn parse_documents(documents: &[SourceDocument], parallel: bool) -> Vec<ParsedDocument> {
    if parallel {
        documents.par_iter().map(parse_document).collect()
    } else {
        documents.iter().map(parse_document).collect()
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml_document(file: &Arc<str>, text: &str) -> (Option<RawNode>, Vec<ValidationIssue>) {
    if text.trim().is_empty() {
        let issue = ValidationIssue::error(codes::SYNTAX_ERROR, "document is empty")
            .with_location(SourceLocation::file_start(file.clone()));
        return (None, vec![issue]);
    }
    yaml::parse_yaml(file, text)
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml_document(file: &Arc<str>, _text: &str) -> (Option<RawNode>, Vec<ValidationIssue>) {
    let issue = ValidationIssue::error(
        codes::SYNTAX_ERROR,
        "YAML documents require the `yaml` feature",
    )
    .with_location(SourceLocation::file_start(file.clone()));
    (None, vec![issue])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("JSONC"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("yml"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_extension("toml"), None);
    }

    #[test]
    fn test_parse_batch_keeps_order_and_isolates_errors() {
        let docs = vec![
            SourceDocument::json("a.json", r#"{"ok": 1}"#),
            SourceDocument::json("b.json", r#"{"broken": }"#),
            SourceDocument::json("c.json", r#"{"ok": 3}"#),
        ];
        let parsed = parse_documents(&docs, true);
        let files: Vec<_> = parsed.iter().map(|p| &*p.file).collect();
        assert_eq!(files, vec!["a.json", "b.json", "c.json"]);
        assert!(!parsed[0].has_errors());
        assert!(parsed[1].has_errors());
        assert!(!parsed[2].has_errors());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_empty_yaml_is_an_error() {
        let parsed = parse_document(&SourceDocument::yaml("e.yaml", "  \n"));
        assert!(parsed.root.is_none());
        assert!(parsed.has_errors());
    }
}
