#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use specforge::diagnostics::codes;
use specforge::project::{compile_directory, load_directory};
use specforge::{Compiler, CompilerConfig, DocumentFormat};
use tempfile::TempDir;

use crate::helpers::fixtures::{color_tokens, components_doc};
use crate::helpers::issue_assertions::codes_of;

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("tokens")).unwrap();
    fs::create_dir_all(root.join("components")).unwrap();
    fs::write(root.join("tokens/color.json"), color_tokens()).unwrap();
    fs::write(
        root.join("components/badge.json"),
        components_doc(r#"[{ "name": "Badge", "styling": { "base": { "color": "$color.blue.600" } } }]"#),
    )
    .unwrap();
    fs::write(root.join("README.md"), "# Design system").unwrap();
    temp_dir
}

#[test]
fn test_load_directory_skips_other_files() {
    let temp_dir = workspace();
    let documents = load_directory(temp_dir.path()).unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.format == DocumentFormat::Json));
    assert!(documents[0].path.ends_with("badge.json"));
}

#[test]
fn test_compile_directory_end_to_end() {
    let temp_dir = workspace();
    let result = compile_directory(&Compiler::new(), temp_dir.path()).unwrap();

    assert!(result.success, "{:?}", result.issues());
    let badge = result.ir.component("Badge").unwrap();
    assert_eq!(badge.styling.base["color"].resolved.as_ref().unwrap().to_string(), "#2563eb");
}

#[test]
fn test_compile_directory_with_strict_config() {
    let temp_dir = workspace();
    fs::write(
        temp_dir.path().join("components/chip.json"),
        components_doc(r#"[{ "name": "Chip", "colour": "red" }]"#),
    )
    .unwrap();

    let lenient = compile_directory(&Compiler::new(), temp_dir.path()).unwrap();
    assert!(lenient.success);
    assert_eq!(codes_of(lenient.issues()), vec![codes::UNKNOWN_FIELD]);

    let strict = Compiler::new().with_config(CompilerConfig::default().with_strict_unknown_fields(true));
    let result = compile_directory(&strict, temp_dir.path()).unwrap();
    assert!(!result.success);
    assert!(result.ir.component("Chip").is_none());
    assert!(result.ir.component("Badge").is_some());
}

#[test]
#[cfg(feature = "yaml")]
fn test_yaml_and_json_mix() {
    let temp_dir = workspace();
    fs::write(
        temp_dir.path().join("tokens/spacing.yaml"),
        "schemaVersion: \"2.0.0\"\nkind: tokens\ntokens:\n  spacing:\n    sm:\n      value: 4px\n",
    )
    .unwrap();

    let result = compile_directory(&Compiler::new(), temp_dir.path()).unwrap();
    assert!(result.success, "{:?}", result.issues());
    assert_eq!(result.documents.len(), 3);
    assert_eq!(result.ir.token("spacing.sm").unwrap().resolved_value.as_ref().unwrap().to_string(), "4px");
}
