//! Version checks and schema migrations
//!
//! Documents declare the schema version they were written against. Versions
//! below [`MIN_SUPPORTED_VERSION`] or above the current version are fatal for
//! that document; anything in between is brought forward by running the
//! registered [`Migration`]s in ascending order.
//!
//! Migrations are idempotent: running the chain again on a migrated document
//! changes nothing and reports nothing.

mod builtin;
mod registry;

use std::sync::Arc;

use crate::base::constants::{MIN_SUPPORTED_VERSION, REFERENCE_SIGIL, SCHEMA_VERSION_FIELD};
use crate::base::{SchemaVersion, SourceLocation};
use crate::diagnostics::{ValidationIssue, codes};
use crate::parser::{RawNode, RawValue, SourceDocument, parse_document};

pub use registry::{MigrationRegistry, RegistryError};

/// A deterministic rewrite of a raw document from one schema version to the
/// next.
pub trait Migration: Send + Sync {
    fn from_version(&self) -> SchemaVersion;

    fn to_version(&self) -> SchemaVersion;

    fn description(&self) -> &str;

    /// Rewrite `document` in place, reporting what changed.
    ///
    /// Must be idempotent: a second application reports and changes nothing.
    fn apply(&self, document: &mut RawNode, context: &MigrationContext) -> Vec<ValidationIssue>;
}

/// Settings a migration may need to produce current-version syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationContext {
    /// Sigil that rewritten references are given.
    pub reference_sigil: char,
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self {
            reference_sigil: REFERENCE_SIGIL,
        }
    }
}

/// Outcome of comparing a declared version with the supported range.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionCheck {
    pub supported: bool,
    pub needs_migration: bool,
    pub issues: Vec<ValidationIssue>,
}

/// A migrated document and the warnings collected on the way.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub document: RawNode,
    pub issues: Vec<ValidationIssue>,
    /// Descriptions of the migrations that ran, in order.
    pub applied: Vec<String>,
}

impl MigrationOutcome {
    /// Whether the document could not be brought to the target version.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }
}

/// Result of migrating a source document for write-back.
#[derive(Debug, Clone)]
pub struct MigratedSource {
    /// New document text; `None` when the document could not be migrated.
    pub text: Option<String>,
    /// Whether the text differs from the input.
    pub changed: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Checks versions and applies migrations from a [`MigrationRegistry`].
#[derive(Debug, Clone)]
pub struct MigrationManager {
    registry: Arc<MigrationRegistry>,
    min_supported: SchemaVersion,
    context: MigrationContext,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new(MigrationRegistry::builtin())
    }
}

impl MigrationManager {
    pub fn new(registry: MigrationRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            min_supported: MIN_SUPPORTED_VERSION,
            context: MigrationContext::default(),
        }
    }

    pub fn with_min_supported(mut self, version: SchemaVersion) -> Self {
        self.min_supported = version;
        self
    }

    /// Sigil that migrations write into rewritten references.
    pub fn with_reference_sigil(mut self, sigil: char) -> Self {
        self.context.reference_sigil = sigil;
        self
    }

    pub fn context(&self) -> &MigrationContext {
        &self.context
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn current_version(&self) -> SchemaVersion {
        self.registry.current_version()
    }

    pub fn min_supported_version(&self) -> SchemaVersion {
        self.min_supported
    }

    /// Compare a declared version with the supported range.
    pub fn check_version(&self, declared: SchemaVersion) -> VersionCheck {
        let current = self.current_version();
        if declared < self.min_supported {
            return VersionCheck {
                supported: false,
                needs_migration: false,
                issues: vec![
                    ValidationIssue::error(
                        codes::VERSION_TOO_OLD,
                        format!(
                            "schema version {declared} is older than the minimum supported version {}",
                            self.min_supported
                        ),
                    )
                    .with_path([SCHEMA_VERSION_FIELD]),
                ],
            };
        }
        if declared > current {
            return VersionCheck {
                supported: false,
                needs_migration: false,
                issues: vec![
                    ValidationIssue::error(
                        codes::VERSION_TOO_NEW,
                        format!("schema version {declared} is newer than the supported version {current}"),
                    )
                    .with_path([SCHEMA_VERSION_FIELD])
                    .with_suggestion("upgrade the compiler to read this document"),
                ],
            };
        }
        VersionCheck {
            supported: true,
            needs_migration: declared < current,
            issues: Vec::new(),
        }
    }

    /// Read `schemaVersion` from a document root.
    pub fn read_declared_version(&self, root: &RawNode) -> Result<SchemaVersion, ValidationIssue> {
        let Some(node) = root.get(SCHEMA_VERSION_FIELD) else {
            return Err(ValidationIssue::error(
                codes::MISSING_SCHEMA_VERSION,
                format!("document does not declare '{SCHEMA_VERSION_FIELD}'"),
            )
            .with_path([SCHEMA_VERSION_FIELD])
            .with_location(root.location.clone())
            .with_suggestion(format!(
                "add \"{SCHEMA_VERSION_FIELD}\": \"{}\"",
                self.current_version()
            )));
        };
        let parsed = match &node.value {
            RawValue::String(text) => SchemaVersion::parse_lenient(text),
            RawValue::Number(n) => SchemaVersion::from_number(*n),
            _ => {
                return Err(invalid_version(
                    format!("'{SCHEMA_VERSION_FIELD}' must be a string or number, found {}", node.type_name()),
                    &node.location,
                ));
            }
        };
        parsed.map_err(|e| invalid_version(e.to_string(), &node.location))
    }

    /// Read and check the version of a parsed document, locating any issue
    /// at the `schemaVersion` value.
    pub fn check_document(&self, root: &RawNode) -> (Option<SchemaVersion>, VersionCheck) {
        let declared = match self.read_declared_version(root) {
            Ok(version) => version,
            Err(issue) => {
                let check = VersionCheck {
                    supported: false,
                    needs_migration: false,
                    issues: vec![issue],
                };
                return (None, check);
            }
        };
        let location = root
            .get(SCHEMA_VERSION_FIELD)
            .map_or_else(|| root.location.clone(), |n| n.location.clone());
        let mut check = self.check_version(declared);
        check.issues = check
            .issues
            .into_iter()
            .map(|issue| issue.with_location(location.clone()))
            .collect();
        (Some(declared), check)
    }

    /// Run every registered migration whose target lies in `(from, to]`, then
    /// stamp `schemaVersion = to`.
    ///
    /// When the registered migrations do not connect `from` to `to`, nothing
    /// runs, the document comes back untouched and the outcome carries a
    /// `MIGRATION_GAP` error.
    pub fn apply_migrations(
        &self,
        mut document: RawNode,
        from: SchemaVersion,
        to: SchemaVersion,
    ) -> MigrationOutcome {
        let chain = match self.registry.chain(from, to) {
            Ok(chain) => chain,
            Err(error) => {
                tracing::warn!(%from, %to, "cannot migrate: {error}");
                let issue = ValidationIssue::error(codes::MIGRATION_GAP, error.to_string())
                    .with_path([SCHEMA_VERSION_FIELD])
                    .with_location(
                        document
                            .get(SCHEMA_VERSION_FIELD)
                            .map_or_else(|| document.location.clone(), |n| n.location.clone()),
                    )
                    .with_suggestion("register a migration covering the missing range");
                return MigrationOutcome {
                    document,
                    issues: vec![issue],
                    applied: Vec::new(),
                };
            }
        };

        let mut issues = Vec::new();
        let mut applied = Vec::new();
        for migration in chain {
            tracing::debug!(
                from = %migration.from_version(),
                to = %migration.to_version(),
                "applying migration: {}",
                migration.description()
            );
            issues.extend(migration.apply(&mut document, &self.context));
            applied.push(migration.description().to_string());
        }

        if from < to {
            let location = document.location.clone();
            if let Some(root) = document.as_map_mut() {
                let stamp = RawNode::string(to.to_string(), location.clone());
                match root.get_mut(SCHEMA_VERSION_FIELD) {
                    Some(existing) => *existing = stamp,
                    None => {
                        root.insert(SCHEMA_VERSION_FIELD, location, stamp);
                    }
                }
            }
        }

        MigrationOutcome {
            document,
            issues,
            applied,
        }
    }

    /// Parse, migrate to the current version and re-render a document, for
    /// writing it back to disk.
    pub fn migrate_source(&self, source: &SourceDocument) -> MigratedSource {
        let parsed = parse_document(source);
        let mut issues = parsed.issues;
        let failed = |issues| MigratedSource {
            text: None,
            changed: false,
            issues,
        };

        let Some(root) = parsed.root else {
            return failed(issues);
        };
        if issues.iter().any(ValidationIssue::is_error) {
            return failed(issues);
        }

        let (declared, check) = self.check_document(&root);
        issues.extend(check.issues);
        let Some(declared) = declared.filter(|_| check.supported) else {
            return failed(issues);
        };
        if !check.needs_migration {
            return MigratedSource {
                text: Some(source.text.to_string()),
                changed: false,
                issues,
            };
        }

        let outcome = self.apply_migrations(root, declared, self.current_version());
        let failed_migration = outcome.has_errors();
        issues.extend(outcome.issues);
        if failed_migration {
            return failed(issues);
        }
        MigratedSource {
            text: Some(outcome.document.to_json_pretty()),
            changed: true,
            issues,
        }
    }
}

fn invalid_version(message: String, location: &SourceLocation) -> ValidationIssue {
    ValidationIssue::error(codes::INVALID_SCHEMA_VERSION, message)
        .with_path([SCHEMA_VERSION_FIELD])
        .with_location(location.clone())
}
