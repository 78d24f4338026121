#![allow(clippy::unwrap_used, clippy::expect_used)]

use specforge::Severity;
use specforge::diagnostics::codes;

use crate::helpers::fixtures::{color_tokens, compile_json, components_doc, patterns_doc};
use crate::helpers::issue_assertions::{codes_of, errors, with_code};

fn button() -> String {
    components_doc(
        r##"[{
            "name": "Button",
            "props": [{ "name": "variant", "type": "enum", "values": ["primary", "secondary"] }],
            "styling": {
                "variants": { "variant": {
                    "primary": { "background": "$color.interactive.primary" },
                    "secondary": { "background": "#ffffff" },
                    "tertiary": { "background": "transparent" }
                } }
            }
        }]"##,
    )
}

#[test]
fn test_orphaned_variant_is_a_single_warning() {
    let result = compile_json(&[("tokens.json", color_tokens()), ("button.json", button())]);

    assert!(result.success);
    assert_eq!(result.issues().len(), 1, "{:?}", result.issues());
    let issue = &result.issues()[0];
    assert_eq!(issue.code, codes::ORPHANED_VARIANT);
    assert_eq!(issue.severity, Severity::Warning);
    assert!(issue.message.contains("tertiary"));
    assert_eq!(&*issue.location.as_ref().unwrap().file, "button.json");

    // The orphaned option is still carried in the IR.
    let group = &result.ir.component("Button").unwrap().styling.variants["variant"];
    assert!(group.options.contains_key("tertiary"));
}

#[test]
fn test_missing_component_is_a_single_error() {
    let pattern = patterns_doc(
        r#"[{
            "name": "ListPage",
            "components": ["SearchBox"],
            "tree": [
                { "type": "component", "component": "SearchBox" },
                { "type": "element", "tag": "ul", "children": [
                    { "type": "loop", "each": "rows", "children": [{ "type": "slot", "name": "row" }] }
                ] }
            ]
        }]"#,
    );
    let result = compile_json(&[("tokens.json", color_tokens()), ("patterns.json", pattern)]);

    assert!(!result.success);
    let errors = errors(&result);
    assert_eq!(errors.len(), 1, "{:?}", result.issues());
    assert_eq!(errors[0].code, codes::MISSING_COMPONENT);
    assert!(errors[0].message.contains("SearchBox"));

    // A failed compile still yields the partial IR.
    assert!(result.ir.pattern("ListPage").is_some());
    assert!(result.ir.token("color.interactive.primary").is_some());
}

#[test]
fn test_component_defined_in_another_file_satisfies_pattern() {
    let pattern = patterns_doc(
        r#"[{ "name": "Toolbar", "components": ["Button"],
              "tree": [{ "type": "component", "component": "Button", "props": { "variant": "primary" } }] }]"#,
    );
    let result = compile_json(&[
        ("patterns.json", pattern),
        ("tokens.json", color_tokens()),
        ("button.json", button()),
    ]);

    assert!(result.success);
    assert!(with_code(result.issues(), codes::MISSING_COMPONENT).is_empty());
}

#[test]
fn test_structural_cycle_between_components() {
    let components = components_doc(
        r#"[
            { "name": "Menu", "props": [{ "name": "item", "type": "componentRef", "component": "MenuItem" }] },
            { "name": "MenuItem", "props": [{ "name": "submenu", "type": "componentRef", "component": "Menu" }] }
        ]"#,
    );
    let result = compile_json(&[("menu.json", components)]);

    assert_eq!(codes_of(result.issues()), vec![codes::STRUCTURAL_CYCLE]);
    assert!(result.issues()[0].message.contains("Menu -> MenuItem -> Menu"));
}

#[test]
fn test_every_check_runs_despite_reference_errors() {
    let components = components_doc(
        r#"[{
            "name": "Chip",
            "props": [{ "name": "tone", "type": "enum", "values": [] }],
            "styling": { "base": { "color": "$color.missing" } }
        }]"#,
    );
    let result = compile_json(&[("chip.json", components)]);

    let mut found = codes_of(result.issues());
    found.sort_unstable();
    assert_eq!(found, vec![codes::EMPTY_ENUM, codes::UNRESOLVED_REFERENCE]);
}
