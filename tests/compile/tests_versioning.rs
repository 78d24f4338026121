#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use rstest::rstest;
use specforge::diagnostics::codes;
use specforge::migrate::{Migration, MigrationContext, MigrationManager, MigrationRegistry};
use specforge::parser::{RawNode, parse_document};
use specforge::{Compiler, CompilerConfig, DocumentStage, SchemaVersion, SourceDocument, ValidationIssue};

use crate::helpers::fixtures::{compile_json, tokens_doc};
use crate::helpers::issue_assertions::{codes_of, with_code};

#[test]
fn test_version_zero_is_fatal_for_its_document() {
    let result = compile_json(&[(
        "ancient.json",
        r##"{"schemaVersion": 0, "kind": "tokens", "tokens": {"color": {"x": {"value": "not-a-color"}}}}"##
            .to_string(),
    )]);

    assert!(!result.success);
    // Nothing past the version check ran: the bad color is never reported.
    assert_eq!(codes_of(result.issues()), vec![codes::VERSION_TOO_OLD]);
    assert_eq!(result.documents[0].stage, DocumentStage::Version);
    assert!(result.ir.tokens.is_empty());
}

#[test]
fn test_unsupported_document_does_not_block_others() {
    let result = compile_json(&[
        ("future.json", r#"{"schemaVersion": "9.0.0", "kind": "tokens", "tokens": {}}"#.to_string()),
        ("current.json", tokens_doc(r##"{"color": {"ink": {"value": "#111"}}}"##)),
    ]);

    assert_eq!(codes_of(result.issues()), vec![codes::VERSION_TOO_NEW]);
    assert!(result.ir.token("color.ink").is_some());
    assert!(result.document("current.json").unwrap().accepted());
}

#[rstest]
#[case::missing(r#"{"kind": "tokens", "tokens": {}}"#, codes::MISSING_SCHEMA_VERSION)]
#[case::malformed(r#"{"schemaVersion": "v-two", "kind": "tokens", "tokens": {}}"#, codes::INVALID_SCHEMA_VERSION)]
#[case::too_new(r#"{"schemaVersion": "2.1", "kind": "tokens", "tokens": {}}"#, codes::VERSION_TOO_NEW)]
fn test_version_failures(#[case] text: &str, #[case] code: &str) {
    let result = compile_json(&[("doc.json", text.to_string())]);
    assert_eq!(codes_of(result.issues()), vec![code]);
    assert_eq!(result.documents[0].stage, DocumentStage::Version);
}

#[test]
fn test_legacy_batch_compiles_like_current() {
    let legacy = compile_json(&[
        (
            "tokens.json",
            r##"{"schemaVersion": "1.0", "tokens": {"color": {
                "blue": {"$value": "#2563eb", "$type": "color"},
                "primary": {"$value": "{color.blue}"}}}}"##
                .to_string(),
        ),
        (
            "components.json",
            r#"{"schemaVersion": "1.1", "kind": "components", "components": [{
                "name": "Button",
                "props": {"variant": {"type": "enum", "values": ["solid"]}, "label": "string"},
                "styling": {"variantStyles": {"variant": {"solid": {"background": "$color.primary"}}}}
            }]}"#
                .to_string(),
        ),
        (
            "patterns.json",
            r#"{"schemaVersion": "1.1", "kind": "patterns", "patterns": [{
                "name": "Form", "uses": ["Button"],
                "tree": [{"type": "component", "component": "Button"}]
            }]}"#
                .to_string(),
        ),
    ]);

    assert!(legacy.success, "{:?}", legacy.issues());
    assert!(legacy.documents.iter().all(|d| d.migrated && d.accepted()));
    assert!(!with_code(legacy.issues(), codes::MIGRATION_APPLIED).is_empty());

    let button = legacy.ir.component("Button").unwrap();
    assert_eq!(button.props.len(), 2);
    let solid = &button.styling.variants["variant"].options["solid"];
    assert_eq!(solid.styles["background"].resolved.as_ref().unwrap().to_string(), "#2563eb");
    assert!(legacy.ir.pattern("Form").unwrap().components.contains("Button"));
}

/// Stand-in for a release that only knew the first schema bump.
struct FirstBumpOnly;

impl Migration for FirstBumpOnly {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 0, 0)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 1, 0)
    }

    fn description(&self) -> &str {
        "first bump"
    }

    fn apply(&self, _document: &mut RawNode, _context: &MigrationContext) -> Vec<ValidationIssue> {
        Vec::new()
    }
}

#[test]
fn test_incomplete_migration_chain_rejects_document() {
    let registry = MigrationRegistry::new(SchemaVersion::new(2, 0, 0))
        .with(FirstBumpOnly)
        .unwrap();
    let compiler = Compiler::new().with_registry(registry);
    let result = compiler.compile(&[
        SourceDocument::json("legacy.json", r#"{"schemaVersion": "1.0", "kind": "tokens", "tokens": {}}"#),
        SourceDocument::json("current.json", tokens_doc(r##"{"color": {"ink": {"value": "#111"}}}"##)),
    ]);

    assert!(!result.success);
    let gaps = with_code(result.issues(), codes::MIGRATION_GAP);
    assert_eq!(gaps.len(), 1);
    assert!(gaps[0].message.contains("1.1.0 -> 2.0.0"), "{}", gaps[0].message);
    assert_eq!(result.document("legacy.json").unwrap().stage, DocumentStage::Version);
    assert!(result.document("current.json").unwrap().accepted());

    let migrated = compiler
        .migrations()
        .migrate_source(&SourceDocument::json("legacy.json", r#"{"schemaVersion": "1.0"}"#));
    assert!(migrated.text.is_none());
}

#[test]
fn test_migrated_aliases_use_configured_sigil() {
    let compiler = Compiler::new().with_config(CompilerConfig::default().with_reference_sigil('@'));
    let result = compiler.compile(&[SourceDocument::json(
        "legacy.json",
        r##"{"schemaVersion": "1.0", "tokens": {"color": {
            "blue": {"$value": "#2563eb", "$type": "color"},
            "primary": {"$value": "{color.blue}"}}}}"##,
    )]);

    assert!(result.success, "{:?}", result.issues());
    let primary = result.ir.token("color.primary").unwrap();
    assert_eq!(primary.resolved_value.as_ref().unwrap().to_string(), "#2563eb");
}

// ============================================================================
// Idempotency and composition
// ============================================================================

fn legacy_tokens(names: &[String], colors: &[u32]) -> String {
    let entries: Vec<String> = names
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (name, color))| {
            if i > 0 && color % 3 == 0 {
                format!(r#""{name}": {{"$value": "{{color.{}}}"}}"#, names[0])
            } else {
                format!(r##""{name}": {{"$value": "#{:06x}", "$type": "color"}}"##, color & 0x00ff_ffff)
            }
        })
        .collect();
    format!(
        r#"{{"schemaVersion": "1.0.0", "tokens": {{"color": {{{}}}}}}}"#,
        entries.join(", ")
    )
}

proptest! {
    #[test]
    fn prop_migration_is_idempotent(
        names in prop::collection::btree_set("k[a-z0-9]{0,6}", 1..8),
        colors in prop::collection::vec(any::<u32>(), 8),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let text = legacy_tokens(&names, &colors);
        let manager = MigrationManager::default();

        let first = manager.migrate_source(&SourceDocument::json("legacy.json", text));
        prop_assert!(first.changed);
        let migrated = first.text.unwrap();

        let second = manager.migrate_source(&SourceDocument::json("legacy.json", migrated.clone()));
        prop_assert!(!second.changed);
        prop_assert!(second.issues.is_empty(), "{:?}", second.issues);
        prop_assert_eq!(second.text, Some(migrated.clone()));

        let result = compile_json(&[("migrated.json", migrated)]);
        prop_assert!(result.success, "{:?}", result.issues());
        prop_assert_eq!(result.ir.tokens.len(), names.len());
    }
}

fn legacy_components(names: &[String], flags: &[bool]) -> String {
    let entries: Vec<String> = names
        .iter()
        .zip(flags)
        .map(|(name, &with_variants)| {
            let styling = if with_variants {
                r#""styling": {"variantStyles": {"tone": {"loud": {"color": "{color.ink}"}}}}"#
            } else {
                r#""styling": {"base": {"color": "{color.ink}"}}"#
            };
            format!(
                r#"{{"name": "{name}", "props": {{"tone": {{"type": "enum", "values": ["loud"]}}, "label": "string"}}, {styling}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"schemaVersion": "1.0.0", "components": [{}], "patterns": [{{"name": "Page", "uses": ["{}"]}}]}}"#,
        entries.join(", "),
        names[0]
    )
}

fn parse_json(text: &str) -> RawNode {
    parse_document(&SourceDocument::json("legacy.json", text)).root.unwrap()
}

fn stepwise(manager: &MigrationManager, mut document: RawNode) -> RawNode {
    let steps = [(1, 0), (1, 1), (1, 2), (2, 0)];
    for pair in steps.windows(2) {
        let from = SchemaVersion::new(pair[0].0, pair[0].1, 0);
        let to = SchemaVersion::new(pair[1].0, pair[1].1, 0);
        let outcome = manager.apply_migrations(document, from, to);
        assert!(!outcome.has_errors(), "{:?}", outcome.issues);
        document = outcome.document;
    }
    document
}

proptest! {
    #[test]
    fn prop_migration_composes(
        names in prop::collection::btree_set("[A-Z][a-z]{0,6}", 1..6),
        flags in prop::collection::vec(any::<bool>(), 6),
        colors in prop::collection::vec(any::<u32>(), 8),
    ) {
        let manager = MigrationManager::default();
        let names: Vec<String> = names.into_iter().collect();
        let texts = [legacy_components(&names, &flags), legacy_tokens(&names, &colors)];

        for text in &texts {
            let direct = manager.apply_migrations(
                parse_json(text),
                SchemaVersion::new(1, 0, 0),
                manager.current_version(),
            );
            prop_assert!(!direct.has_errors());
            let chained = stepwise(&manager, parse_json(text));
            prop_assert_eq!(direct.document.to_json_pretty(), chained.to_json_pretty());
        }
    }
}
