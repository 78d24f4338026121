//! Built-in migration chain: 1.0.0 → 1.1.0 → 1.2.0 → 2.0.0.

use std::sync::Arc;

use super::{Migration, MigrationContext};
use crate::base::SchemaVersion;
use crate::base::constants::KIND_FIELD;
use crate::diagnostics::{ValidationIssue, codes};
use crate::parser::{RawMap, RawNode, RawValue};

pub(super) fn all() -> Vec<Arc<dyn Migration>> {
    vec![
        Arc::new(DollarKeys),
        Arc::new(RenameVariantStyles),
        Arc::new(PropsAsList),
    ]
}

fn applied(count: usize, message: impl Into<String>, document: &RawNode) -> Option<ValidationIssue> {
    (count > 0).then(|| {
        ValidationIssue::warning(codes::MIGRATION_APPLIED, message)
            .with_location(document.location.clone())
    })
}

/// Entries of a top-level list such as `components` or `patterns`.
fn entries_mut<'a>(document: &'a mut RawNode, key: &str) -> impl Iterator<Item = &'a mut RawMap> {
    document
        .as_map_mut()
        .and_then(|root| root.get_mut(key))
        .and_then(RawNode::as_sequence_mut)
        .into_iter()
        .flatten()
        .filter_map(RawNode::as_map_mut)
}

// ============================================================================
// 1.0.0 → 1.1.0
// ============================================================================

/// `$value`/`$type`/`$description` keys, `{a.b}` aliases, implicit `kind`.
struct DollarKeys;

const DOLLAR_KEYS: &[(&str, &str)] = &[
    ("$value", "value"),
    ("$type", "type"),
    ("$description", "description"),
];

impl Migration for DollarKeys {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 0, 0)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 1, 0)
    }

    fn description(&self) -> &str {
        "rename $-prefixed token keys and rewrite {alias} references"
    }

    fn apply(&self, document: &mut RawNode, context: &MigrationContext) -> Vec<ValidationIssue> {
        let sigil = context.reference_sigil;
        let mut renamed = 0;
        let mut aliases = 0;
        document.walk_mut(&mut |node| match &mut node.value {
            RawValue::Map(map) => {
                for (from, to) in DOLLAR_KEYS {
                    if map.rename_key(from, to) {
                        renamed += 1;
                    }
                }
            }
            RawValue::String(text) => {
                if let Some(rewritten) = rewrite_curly_alias(text, sigil) {
                    *text = rewritten;
                    aliases += 1;
                }
            }
            _ => {}
        });

        let mut issues = Vec::new();
        issues.extend(applied(
            renamed,
            format!("renamed {renamed} '$'-prefixed key(s) (e.g. '$value' to 'value')"),
            document,
        ));
        issues.extend(applied(
            aliases,
            format!("rewrote {aliases} '{{alias}}' reference(s) to '{sigil}path' syntax"),
            document,
        ));
        issues.extend(infer_kind(document));
        issues
    }
}

/// `{color.primary}` → `$color.primary`, with `sigil` in place of `$`.
fn rewrite_curly_alias(text: &str, sigil: char) -> Option<String> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?.trim();
    let valid = !inner.is_empty()
        && inner
            .split('.')
            .all(|segment| !segment.is_empty() && segment.chars().all(crate::model::is_segment_char));
    valid.then(|| format!("{sigil}{inner}"))
}

fn infer_kind(document: &mut RawNode) -> Option<ValidationIssue> {
    let location = document.location.clone();
    let root = document.as_map_mut()?;
    if root.contains_key(KIND_FIELD) {
        return None;
    }
    let kind = ["tokens", "components", "patterns"]
        .into_iter()
        .find(|k| root.contains_key(k))?;
    root.insert(KIND_FIELD, location.clone(), RawNode::string(kind, location.clone()));
    Some(
        ValidationIssue::info(
            codes::KIND_INFERRED,
            format!("document kind inferred as '{kind}' from its top-level key"),
        )
        .with_location(location),
    )
}

// ============================================================================
// 1.1.0 → 1.2.0
// ============================================================================

/// `styling.variantStyles` → `styling.variants`, pattern `uses` → `components`.
struct RenameVariantStyles;

impl Migration for RenameVariantStyles {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 1, 0)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 2, 0)
    }

    fn description(&self) -> &str {
        "rename variantStyles to variants and pattern uses to components"
    }

    fn apply(&self, document: &mut RawNode, _context: &MigrationContext) -> Vec<ValidationIssue> {
        let mut variants = 0;
        for component in entries_mut(document, "components") {
            if rename_in(component.get_mut("styling"), "variantStyles", "variants") {
                variants += 1;
            }
            if let Some(parts) = component.get_mut("parts").and_then(RawNode::as_map_mut) {
                for (_, part) in parts.iter_mut() {
                    let styling = part.as_map_mut().and_then(|p| p.get_mut("styling"));
                    if rename_in(styling, "variantStyles", "variants") {
                        variants += 1;
                    }
                }
            }
        }

        let mut uses = 0;
        for pattern in entries_mut(document, "patterns") {
            if pattern.rename_key("uses", "components") {
                uses += 1;
            }
        }

        let mut issues = Vec::new();
        issues.extend(applied(
            variants,
            format!("renamed 'variantStyles' to 'variants' in {variants} styling block(s)"),
            document,
        ));
        issues.extend(applied(
            uses,
            format!("renamed 'uses' to 'components' in {uses} pattern(s)"),
            document,
        ));
        issues
    }
}

fn rename_in(node: Option<&mut RawNode>, from: &str, to: &str) -> bool {
    node.and_then(RawNode::as_map_mut)
        .is_some_and(|map| map.rename_key(from, to))
}

// ============================================================================
// 1.2.0 → 2.0.0
// ============================================================================

/// Props written as `{name: definition}` become `[{name, ...definition}]`.
struct PropsAsList;

impl Migration for PropsAsList {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(1, 2, 0)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(2, 0, 0)
    }

    fn description(&self) -> &str {
        "convert prop maps to ordered prop lists"
    }

    fn apply(&self, document: &mut RawNode, _context: &MigrationContext) -> Vec<ValidationIssue> {
        let mut converted = 0;
        for component in entries_mut(document, "components") {
            for key in ["props", "context"] {
                if props_to_list(component.get_mut(key)) {
                    converted += 1;
                }
            }
            if let Some(parts) = component.get_mut("parts").and_then(RawNode::as_map_mut) {
                for (_, part) in parts.iter_mut() {
                    if props_to_list(part.as_map_mut().and_then(|p| p.get_mut("props"))) {
                        converted += 1;
                    }
                }
            }
        }
        for pattern in entries_mut(document, "patterns") {
            if props_to_list(pattern.get_mut("props")) {
                converted += 1;
            }
        }

        applied(
            converted,
            format!("converted {converted} prop map(s) to the ordered list form"),
            document,
        )
        .into_iter()
        .collect()
    }
}

fn props_to_list(node: Option<&mut RawNode>) -> bool {
    let Some(node) = node else {
        return false;
    };
    let RawValue::Map(map) = &mut node.value else {
        return false;
    };

    let props = std::mem::take(map);
    let items = props
        .into_iter()
        .map(|(name, entry)| {
            let name_node = RawNode::string(name.clone(), entry.key_location.clone());
            let mut prop = RawMap::new();
            prop.insert("name", entry.key_location.clone(), name_node);
            let location = entry.value.location.clone();
            match entry.value.value {
                RawValue::Map(definition) => {
                    for (key, field) in definition {
                        if key != "name" {
                            prop.insert(key, field.key_location, field.value);
                        }
                    }
                }
                // Shorthand `"label": "string"`.
                other => {
                    prop.insert("type", location.clone(), RawNode::new(other, location.clone()));
                }
            }
            RawNode::map(prop, location)
        })
        .collect();
    node.value = RawValue::Sequence(items);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{SourceDocument, parse_document};

    fn parse(text: &str) -> RawNode {
        parse_document(&SourceDocument::json("legacy.json", text))
            .root
            .unwrap()
    }

    #[test]
    fn test_dollar_keys_and_aliases() {
        let mut doc = parse(
            r##"{"schemaVersion": "1.0.0", "tokens": {"color": {"blue": {"$value": "#00f", "$type": "color"},
                "primary": {"$value": "{color.blue}"}}}}"##,
        );
        let issues = DollarKeys.apply(&mut doc, &MigrationContext::default());

        let primary = doc
            .get("tokens")
            .and_then(|t| t.get("color"))
            .and_then(|c| c.get("primary"))
            .unwrap();
        assert_eq!(primary.get("value").and_then(RawNode::as_str), Some("$color.blue"));
        assert_eq!(doc.get("kind").and_then(RawNode::as_str), Some("tokens"));

        let found: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            found,
            vec![codes::MIGRATION_APPLIED, codes::MIGRATION_APPLIED, codes::KIND_INFERRED]
        );
        assert!(issues[0].message.contains("renamed 3"));
    }

    #[test]
    fn test_curly_alias_rewrite_only_for_paths() {
        assert_eq!(rewrite_curly_alias("{a.b-c}", '$').as_deref(), Some("$a.b-c"));
        assert_eq!(rewrite_curly_alias("{}", '$'), None);
        assert_eq!(rewrite_curly_alias("{a..b}", '$'), None);
        assert_eq!(rewrite_curly_alias("{ not a path }", '$'), None);
        assert_eq!(rewrite_curly_alias("plain", '$'), None);
    }

    #[test]
    fn test_aliases_take_the_configured_sigil() {
        let mut doc = parse(r#"{"tokens": {"size": {"gap": {"$value": "{size.base}"}}}}"#);
        let issues = DollarKeys.apply(&mut doc, &MigrationContext { reference_sigil: '@' });

        let gap = doc
            .get("tokens")
            .and_then(|t| t.get("size"))
            .and_then(|s| s.get("gap"))
            .unwrap();
        assert_eq!(gap.get("value").and_then(RawNode::as_str), Some("@size.base"));
        assert!(issues.iter().any(|i| i.message.contains("'@path'")));
    }

    #[test]
    fn test_props_map_becomes_list() {
        let mut doc = parse(
            r#"{"components": [{"name": "Button",
                "props": {"variant": {"type": "enum", "values": ["a"]}, "label": "string"}}]}"#,
        );
        let issues = PropsAsList.apply(&mut doc, &MigrationContext::default());
        assert_eq!(issues.len(), 1);

        let props = doc.get("components").and_then(|c| c.as_sequence()).unwrap()[0]
            .get("props")
            .and_then(RawNode::as_sequence)
            .unwrap();
        assert_eq!(props.len(), 2);
        let first = props[0].as_map().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["name", "type", "values"]);
        assert_eq!(props[1].get("type").and_then(RawNode::as_str), Some("string"));

        assert!(PropsAsList.apply(&mut doc, &MigrationContext::default()).is_empty());
    }

    #[test]
    fn test_rename_variant_styles_in_parts() {
        let mut doc = parse(
            r#"{"components": [{"styling": {"variantStyles": {}},
                "parts": {"Item": {"styling": {"variantStyles": {}}}}}],
                "patterns": [{"uses": ["Button"]}]}"#,
        );
        let issues = RenameVariantStyles.apply(&mut doc, &MigrationContext::default());
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("in 2 styling"));
        assert!(RenameVariantStyles.apply(&mut doc, &MigrationContext::default()).is_empty());
    }
}
