#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use rstest::rstest;
use specforge::DocumentStage;
use specforge::diagnostics::codes;
use specforge::model::{Value, ValueExpr};
use specforge::schema::{is_color, parse_dimension, parse_duration};

use crate::helpers::fixtures::{color_tokens, compile_json, components_doc, patterns_doc, tokens_doc};
use crate::helpers::issue_assertions::{assert_no_errors, codes_of, with_code};

// ============================================================================
// Cross-file resolution
// ============================================================================

#[test]
fn test_semantic_token_resolves_through_primitive() {
    let button = components_doc(
        r#"[{
            "name": "Button",
            "styling": { "base": { "background": "$color.interactive.primary" } },
            "states": { "hover": { "styles": { "background": "$color.interactive.primaryHover" } } }
        }]"#,
    );
    let result = compile_json(&[("components.json", button), ("tokens.json", color_tokens())]);

    assert_no_errors(&result);
    assert!(result.issues().is_empty(), "{:?}", result.issues());

    let primary = result.ir.token("color.interactive.primary").unwrap();
    assert!(matches!(primary.value, ValueExpr::Reference(_)));
    assert_eq!(primary.resolved_value.as_ref().unwrap().to_string(), "#2563eb");

    let button = result.ir.component("Button").unwrap();
    let base = &button.styling.base["background"];
    assert_eq!(base.resolved.as_ref().unwrap().to_string(), "#2563eb");
    let hover = &button.states[0].styles["background"];
    assert_eq!(hover.resolved.as_ref().unwrap().to_string(), "#1d4ed8");
}

#[test]
fn test_document_order_does_not_matter() {
    let forward = compile_json(&[("tokens.json", color_tokens())]);
    let split = compile_json(&[
        (
            "semantic.json",
            tokens_doc(r#"{ "color": { "interactive": { "primary": { "value": "$color.blue.600" } } } }"#),
        ),
        (
            "primitive.json",
            tokens_doc(r##"{ "color": { "blue": { "600": { "value": "#2563eb" } } } }"##),
        ),
    ]);

    assert_no_errors(&forward);
    assert_no_errors(&split);
    let resolved = |r: &specforge::CompileResult| {
        r.ir.token("color.interactive.primary")
            .and_then(|t| t.resolved_value.clone())
    };
    assert_eq!(resolved(&forward), resolved(&split));
}

#[test]
fn test_pattern_node_props_resolve() {
    let pattern = patterns_doc(
        r#"[{
            "name": "Banner",
            "components": ["Button"],
            "tree": [{ "type": "component", "component": "Button", "props": { "tint": "$color.blue.700" } }]
        }]"#,
    );
    let button = components_doc(r#"[{ "name": "Button", "props": [{ "name": "tint", "type": "string" }] }]"#);
    let result = compile_json(&[
        ("tokens.json", color_tokens()),
        ("components.json", button),
        ("patterns.json", pattern),
    ]);

    assert_no_errors(&result);
    let banner = result.ir.pattern("Banner").unwrap();
    let props = banner.tree[0].props().unwrap();
    assert_eq!(props["tint"].resolved.as_ref().unwrap().to_string(), "#1d4ed8");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_cycle_reported_exactly_once() {
    let tokens = tokens_doc(
        r#"{ "color": {
            "a": { "value": "$color.b" },
            "b": { "value": "$color.a" },
            "c": { "value": "$color.a" }
        } }"#,
    );
    let button = components_doc(
        r#"[{ "name": "Button", "styling": { "base": { "color": "$color.a", "border": "$color.b" } } }]"#,
    );
    let result = compile_json(&[("tokens.json", tokens), ("components.json", button)]);

    assert!(!result.success);
    let cycles = with_code(result.issues(), codes::CIRCULAR_REFERENCE);
    assert_eq!(cycles.len(), 1, "{:?}", result.issues());
    assert!(cycles[0].message.contains("$color.a"));
    assert!(cycles[0].message.contains("$color.b"));
    assert!(with_code(result.issues(), codes::UNRESOLVED_REFERENCE).is_empty());

    for id in ["color.a", "color.b", "color.c"] {
        assert!(result.ir.token(id).unwrap().resolved_value.is_none(), "{id}");
    }
}

#[test]
fn test_unresolved_reference_suggests_close_name() {
    let button = components_doc(
        r#"[{ "name": "Button", "styling": { "base": { "background": "$color.interactive.primry" } } }]"#,
    );
    let result = compile_json(&[("tokens.json", color_tokens()), ("components.json", button)]);

    assert_eq!(codes_of(result.issues()), vec![codes::UNRESOLVED_REFERENCE]);
    let issue = &result.issues()[0];
    assert!(issue.path_string().starts_with("components.Button"));
    assert!(issue.suggestions[0].contains("$color.interactive.primary"));
    assert_eq!(&*issue.location.as_ref().unwrap().file, "components.json");
    // The failed value keeps its expression and gains no literal.
    let button = result.ir.component("Button").unwrap();
    assert!(button.styling.base["background"].resolved.is_none());
}

#[test]
fn test_duplicate_token_across_files() {
    let result = compile_json(&[
        ("a.json", tokens_doc(r##"{ "color": { "red": { "value": "#f00" } } }"##)),
        ("b.json", tokens_doc(r##"{ "color": { "red": { "value": "#e00" } } }"##)),
    ]);

    assert_eq!(codes_of(result.issues()), vec![codes::DUPLICATE_DEFINITION]);
    assert_eq!(
        result.ir.token("color.red").unwrap().resolved_value,
        Some(Value::Color("#f00".into()))
    );
}

#[test]
fn test_broken_alias_reported_where_it_is_written() {
    let tokens = tokens_doc(
        r#"{ "color": {
            "c": { "value": "$color.b" },
            "b": { "value": "$color.missing" }
        } }"#,
    );
    let result = compile_json(&[("tokens.json", tokens)]);

    let unresolved = with_code(result.issues(), codes::UNRESOLVED_REFERENCE);
    assert_eq!(unresolved.len(), 1, "{:?}", result.issues());
    assert_eq!(unresolved[0].path_string(), "tokens.color.b");
    assert!(result.ir.token("color.c").unwrap().resolved_value.is_none());
}

// ============================================================================
// Hostile input
// ============================================================================

#[test]
fn test_deeply_nested_document_is_rejected_alone() {
    let result = compile_json(&[
        ("deep.json", "[".repeat(3000)),
        ("tokens.json", color_tokens()),
    ]);

    assert!(!result.success);
    assert!(!with_code(result.issues(), codes::SYNTAX_ERROR).is_empty());
    assert_eq!(result.documents[0].stage, DocumentStage::Parse);
    assert!(result.documents[1].accepted());
    assert!(result.ir.token("color.interactive.primary").unwrap().resolved_value.is_some());
}

#[test]
fn test_long_alias_chain_reports_instead_of_recursing() {
    let links = 500;
    let mut entries: Vec<String> = (0..links)
        .map(|i| format!(r#""t{i}": {{ "value": "$n.t{}" }}"#, i + 1))
        .collect();
    entries.push(format!(r#""t{links}": {{ "value": "4px" }}"#));
    let text = tokens_doc(&format!(r#"{{ "n": {{ {} }} }}"#, entries.join(", ")));
    let result = compile_json(&[("chain.json", text)]);

    assert!(!result.success);
    let unresolved = with_code(result.issues(), codes::UNRESOLVED_REFERENCE);
    assert!(!unresolved.is_empty());
    assert!(unresolved.iter().all(|i| i.message.contains("aliases away")));
    assert!(result.ir.token(&format!("n.t{}", links - 1)).unwrap().resolved_value.is_some());
}

#[test]
fn test_block_comments_are_ignored() {
    let text = format!(
        "/** palette **/\n{}",
        tokens_doc(r##"{ /* primitives */ "color": { "red": { "value": "#f00" /* brand **/ } } }"##)
    );
    let result = compile_json(&[("tokens.jsonc", text)]);

    assert_no_errors(&result);
    assert_eq!(
        result.ir.token("color.red").unwrap().resolved_value,
        Some(Value::Color("#f00".into()))
    );
}

// ============================================================================
// Valid documents
// ============================================================================

#[rstest]
#[case::colors(tokens_doc(r##"{ "color": { "white": { "value": "#fff" } } }"##))]
#[case::spacing(tokens_doc(r#"{ "spacing": { "sm": { "value": "4px" }, "md": { "value": "$spacing.sm" } } }"#))]
#[case::typography(tokens_doc(
    r#"{
        "fontFamily": { "body": { "value": "Inter" } },
        "typography": { "body": { "value": { "fontFamily": "$fontFamily.body", "fontSize": "16px" } } }
    }"#
))]
#[case::components(components_doc(
    r#"[{
        "name": "Toggle",
        "props": [{ "name": "checked", "type": "boolean" }],
        "styling": { "variants": { "checked": { "true": { "opacity": 1 }, "false": { "opacity": 0.5 } } } }
    }]"#
))]
#[case::patterns(patterns_doc(r#"[{ "name": "Empty", "tree": [{ "type": "slot", "name": "content" }] }]"#))]
fn test_valid_current_documents_have_no_errors(#[case] text: String) {
    let result = compile_json(&[("doc.json", text)]);
    assert_no_errors(&result);
    assert!(result.documents[0].accepted());
}

#[test]
fn test_literal_parsers_agree_with_compiled_values() {
    let result = compile_json(&[(
        "tokens.json",
        tokens_doc(
            r##"{
                "color": { "ink": { "value": "#0f172a" } },
                "spacing": { "md": { "value": "1.5rem" } },
                "duration": { "fast": { "value": "0.2s" } }
            }"##,
        ),
    )]);
    assert_no_errors(&result);

    assert!(is_color("#0f172a"));
    assert!(!is_color("#0f17a"));
    let spacing = result.ir.token("spacing.md").unwrap();
    assert_eq!(spacing.resolved_value, parse_dimension("1.5rem").map(Value::Dimension));
    let fast = result.ir.token("duration.fast").unwrap();
    assert_eq!(fast.resolved_value, parse_duration("0.2s").map(Value::Duration));
}

// ============================================================================
// Properties
// ============================================================================

/// Token `i` is either a literal or a reference to some token `j < i`.
fn chain_strategy() -> impl Strategy<Value = Vec<Result<u32, usize>>> {
    (1usize..12).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    any::<u32>().prop_map(Ok).boxed()
                } else {
                    prop_oneof![any::<u32>().prop_map(Ok), (0..i).prop_map(Err)].boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn hex(n: u32) -> String {
    format!("#{:06x}", n & 0x00ff_ffff)
}

proptest! {
    #[test]
    fn prop_acyclic_tokens_resolve_to_literals(chain in chain_strategy()) {
        let entries: Vec<String> = chain
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                Ok(color) => format!(r#""t{i}": {{ "value": "{}" }}"#, hex(*color)),
                Err(target) => format!(r#""t{i}": {{ "value": "$color.t{target}" }}"#),
            })
            .collect();
        let text = tokens_doc(&format!(r#"{{ "color": {{ {} }} }}"#, entries.join(", ")));
        let result = compile_json(&[("tokens.json", text)]);

        prop_assert!(result.success, "{:?}", result.issues());
        for (i, _) in chain.iter().enumerate() {
            let mut at = i;
            let expected = loop {
                match chain[at] {
                    Ok(color) => break hex(color),
                    Err(target) => at = target,
                }
            };
            let token = result.ir.token(&format!("color.t{i}")).unwrap();
            prop_assert_eq!(token.resolved_value.as_ref().map(ToString::to_string), Some(expected));
        }
    }
}
