//! # specforge-base
//!
//! Core library for design-system spec documents: parsing, schema
//! migration, token resolution, semantic validation and IR assembly.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → Directory loading
//!   ↓
//! compiler    → Pipeline driver, CompileResult
//!   ↓
//! ir          → DesignSystemIR handed to generators
//!   ↓
//! semantic    → Cross-entity checks over the resolved batch
//!   ↓
//! graph       → Token/component/pattern dependency graph
//!   ↓
//! resolve     → Token namespace, reference resolution
//!   ↓
//! schema      → Per-kind validation and typed projection
//!   ↓
//! migrate     → Version checks, migration registry
//!   ↓
//! model       → Tokens, components, patterns, values
//!   ↓
//! parser      → Logos lexer, located JSON and YAML trees
//!   ↓
//! diagnostics → ValidationIssue, codes, collectors
//!   ↓
//! base        → Primitives (SourceLocation, LineIndex, SchemaVersion)
//! ```

// ============================================================================
// MODULES (dependency order: base → diagnostics → parser → … → compiler)
// ============================================================================

/// Foundation types: SourceLocation, LineIndex, SchemaVersion
pub mod base;

/// Issues, issue codes and collectors shared by every stage
pub mod diagnostics;

/// Parser: Logos lexer, JSON and YAML into located raw trees
pub mod parser;

/// Typed model of tokens, components and patterns
pub mod model;

/// Compiler options
pub mod config;

/// Schema versions and document migrations
pub mod migrate;

/// Schema validation and projection into the model
pub mod schema;

/// Token namespace and reference resolution
pub mod resolve;

/// Dependency graph and impact analysis
pub mod graph;

/// Whole-batch semantic checks
pub mod semantic;

/// The design-system IR
pub mod ir;

/// The compile pipeline
pub mod compiler;

/// Loading documents from disk
pub mod project;

/// IR serialization: JSON, YAML
#[cfg(feature = "interchange")]
pub mod interchange;

// Re-export the pipeline surface
pub use compiler::{CompileResult, Compiler, DocumentStage, DocumentStatus};
pub use config::CompilerConfig;
pub use ir::DesignSystemIR;
pub use parser::{DocumentFormat, SourceDocument};

// Re-export foundation types
pub use base::{LineIndex, Position, SchemaVersion, SourceLocation};
pub use diagnostics::{Severity, ValidationIssue};
