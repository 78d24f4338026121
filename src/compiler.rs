//! The compile pipeline.
//!
//! ```text
//! parse (parallel) → version check / migrate → schema
//!   → merge + resolve → dependency graph → semantic checks → IR
//! ```
//!
//! Parse, version and schema failures drop only the document they occur
//! in. Everything from resolution onwards works on the merged batch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::base::SchemaVersion;
use crate::config::CompilerConfig;
use crate::diagnostics::{IssueCollector, ValidationIssue};
use crate::graph::DependencyGraph;
use crate::ir::DesignSystemIR;
use crate::migrate::{MigrationManager, MigrationRegistry};
use crate::model::{ComponentSpec, PatternSpec, Token};
use crate::parser::{ParsedDocument, SourceDocument, parse_documents};
use crate::resolve::{TokenNamespace, resolve_all};
use crate::schema::{DocumentKind, ValidatedDocument, validate_document};
use crate::semantic;

/// How far a document got through the per-document stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStage {
    /// Syntax errors; nothing else ran.
    Parse,
    /// Missing, malformed or unsupported `schemaVersion`.
    Version,
    /// Schema errors; excluded from resolution.
    Schema,
    /// Merged into the batch.
    Accepted,
}

/// Per-document outcome of a compile.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStatus {
    pub file: Arc<str>,
    pub stage: DocumentStage,
    pub kind: Option<DocumentKind>,
    pub declared_version: Option<SchemaVersion>,
    /// Whether migrations ran on the document.
    pub migrated: bool,
}

impl DocumentStatus {
    pub fn accepted(&self) -> bool {
        self.stage == DocumentStage::Accepted
    }
}

/// Everything a compile produces.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub ir: DesignSystemIR,
    pub graph: DependencyGraph,
    pub documents: Vec<DocumentStatus>,
    pub success: bool,
}

impl CompileResult {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.ir.issues
    }

    pub fn document(&self, file: &str) -> Option<&DocumentStatus> {
        self.documents.iter().find(|d| &*d.file == file)
    }
}

/// Validated documents sorted by kind.
#[derive(Default)]
struct Batch {
    tokens: Vec<Vec<Token>>,
    components: Vec<ComponentSpec>,
    patterns: Vec<PatternSpec>,
}

/// Compiles source documents into a [`DesignSystemIR`].
///
/// Holds only immutable configuration, so one compiler may serve any number
/// of concurrent compiles.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
    migrations: MigrationManager,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` instead of the built-in migration chain.
    pub fn with_registry(mut self, registry: MigrationRegistry) -> Self {
        self.migrations = MigrationManager::new(registry)
            .with_reference_sigil(self.config.reference_sigil);
        self
    }

    /// The manager's reference sigil is replaced by the configured one.
    pub fn with_migration_manager(mut self, migrations: MigrationManager) -> Self {
        self.migrations = migrations.with_reference_sigil(self.config.reference_sigil);
        self
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.migrations = self.migrations.with_reference_sigil(config.reference_sigil);
        self.config = config;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn migrations(&self) -> &MigrationManager {
        &self.migrations
    }

    /// Run the full pipeline over one batch of documents.
    pub fn compile(&self, documents: &[SourceDocument]) -> CompileResult {
        let mut collector = IssueCollector::new();

        let parsed = parse_documents(documents, self.config.parallel_parse);
        debug!(documents = parsed.len(), "parsed documents");

        let mut batch = Batch::default();
        let statuses: Vec<DocumentStatus> = parsed
            .into_iter()
            .map(|document| self.admit(document, &mut batch, &mut collector))
            .collect();
        let accepted = statuses.iter().filter(|s| s.accepted()).count();
        debug!(
            accepted,
            rejected = statuses.len() - accepted,
            "validated documents"
        );

        let (mut namespace, duplicates) = TokenNamespace::build(batch.tokens);
        collector.extend(duplicates);
        let mut components = batch.components;
        let mut patterns = batch.patterns;
        collector.extend(resolve_all(
            &mut namespace,
            &mut components,
            &mut patterns,
            &self.config,
        ));

        let tokens = namespace.into_tokens();
        let graph = DependencyGraph::build(&tokens, &components, &patterns);
        collector.extend(semantic::check(&components, &patterns, &graph));

        let ir = DesignSystemIR::assemble(
            self.migrations.current_version(),
            tokens,
            components,
            patterns,
            collector.into_issues(),
        );
        let success = ir.success();
        debug!(
            success,
            errors = ir.errors().count(),
            warnings = ir.warnings().count(),
            "assembled IR"
        );

        CompileResult {
            ir,
            graph,
            documents: statuses,
            success,
        }
    }

    /// Version check, migration and schema validation for one document.
    fn admit(
        &self,
        document: ParsedDocument,
        batch: &mut Batch,
        collector: &mut IssueCollector,
    ) -> DocumentStatus {
        let mut status = DocumentStatus {
            file: document.file.clone(),
            stage: DocumentStage::Parse,
            kind: None,
            declared_version: None,
            migrated: false,
        };

        let mark = collector.len();
        collector.extend(document.issues);
        let Some(mut root) = document.root else {
            warn!(file = %status.file, "dropping document: no parse tree");
            return status;
        };
        if collector.has_errors_since(mark) {
            warn!(file = %status.file, "dropping document: syntax errors");
            return status;
        }

        status.stage = DocumentStage::Version;
        let (declared, check) = self.migrations.check_document(&root);
        status.declared_version = declared;
        collector.extend(check.issues);
        let Some(declared) = declared.filter(|_| check.supported) else {
            warn!(file = %status.file, "dropping document: unsupported schema version");
            return status;
        };
        if check.needs_migration {
            let outcome =
                self.migrations
                    .apply_migrations(root, declared, self.migrations.current_version());
            debug!(file = %status.file, applied = outcome.applied.len(), "migrated document");
            let failed = outcome.has_errors();
            collector.extend(outcome.issues);
            if failed {
                warn!(file = %status.file, "dropping document: incomplete migration chain");
                return status;
            }
            root = outcome.document;
            status.migrated = true;
        }

        status.stage = DocumentStage::Schema;
        let outcome = validate_document(&root, &status.file, &self.config);
        status.kind = outcome.document.as_ref().map(ValidatedDocument::kind);
        let has_errors = outcome.has_errors();
        collector.extend(outcome.issues);
        let validated = match outcome.document {
            Some(validated) if !has_errors => validated,
            _ => {
                warn!(file = %status.file, "dropping document: schema errors");
                return status;
            }
        };

        status.stage = DocumentStage::Accepted;
        match validated {
            ValidatedDocument::Tokens(doc) => batch.tokens.push(doc.tokens),
            ValidatedDocument::Components(doc) => batch.components.extend(doc.components),
            ValidatedDocument::Patterns(doc) => batch.patterns.extend(doc.patterns),
        }
        status
    }
}
