//! Pattern documents and their node trees.

use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::components::{DEFAULT_CATEGORY, declared_name, optional_props, style_map};
use super::context::{NameRule, Projector};
use crate::base::SourceLocation;
use crate::diagnostics::{ValidationIssue, codes, did_you_mean};
use crate::model::{NodeProps, PatternNode, PatternSpec};
use crate::parser::{RawMap, RawNode};

const PATTERN_FIELDS: &[&str] = &["name", "category", "description", "props", "components", "tree"];

const NODE_TYPES: &[&str] = &["component", "element", "conditional", "loop", "slot", "pattern"];

/// A validated pattern collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternsDocument {
    pub file: Arc<str>,
    pub patterns: Vec<PatternSpec>,
}

/// Names instantiated while walking one pattern's tree.
#[derive(Default)]
struct Usage {
    components: Vec<(SmolStr, SourceLocation)>,
    patterns: IndexSet<SmolStr>,
}

pub(crate) fn project_patterns(
    p: &mut Projector<'_>,
    root: &RawMap,
    owner: &RawNode,
) -> PatternsDocument {
    let mut patterns = Vec::new();
    if let Some(node) = p.required(root, "patterns", &owner.location) {
        p.enter("patterns", |p| {
            let Some(items) = p.expect_sequence(node) else {
                return;
            };
            for (index, item) in items.iter().enumerate() {
                let pattern = p.enter_index(index, |p| {
                    let map = p.expect_map(item)?;
                    project_pattern(p, map, item)
                });
                patterns.extend(pattern);
            }
        });
    }
    PatternsDocument {
        file: p.file().clone(),
        patterns,
    }
}

fn project_pattern(p: &mut Projector<'_>, map: &RawMap, node: &RawNode) -> Option<PatternSpec> {
    p.check_fields(map, PATTERN_FIELDS);

    let name = declared_name(p, map, node, NameRule::PascalCase);
    let category = p.optional_str(map, "category").unwrap_or(DEFAULT_CATEGORY);
    let description = p.optional_str(map, "description").map(str::to_string);
    let props = optional_props(p, map, "props");

    let declared: Vec<SmolStr> = map
        .get("components")
        .and_then(|n| {
            p.enter("components", |p| {
                let names = p.expect_string_list(n)?;
                for (index, component) in names.iter().enumerate() {
                    p.enter_index(index, |p| {
                        p.check_name(component, NameRule::PascalCase, &n.location)
                    });
                }
                Some(names)
            })
        })
        .unwrap_or_default();

    let mut usage = Usage::default();
    let tree = match p.required(map, "tree", &node.location) {
        Some(tree_node) => p.enter("tree", |p| node_list(p, tree_node, &mut usage)),
        None => Vec::new(),
    };

    let mut components: IndexSet<SmolStr> = declared.iter().cloned().collect();
    for (component, location) in &usage.components {
        if components.contains(component) {
            continue;
        }
        let mut issue = ValidationIssue::warning(
            codes::UNDECLARED_COMPONENT,
            format!("component '{component}' is used in the tree but not listed in 'components'"),
        )
        .with_location(location.clone());
        if let Some(hint) = did_you_mean(component, declared.iter().map(SmolStr::as_str)) {
            issue = issue.with_suggestion(hint);
        }
        p.enter("components", |p| p.report(issue));
        components.insert(component.clone());
    }

    Some(PatternSpec {
        name: SmolStr::new(name?),
        category: SmolStr::new(category),
        description,
        props,
        tree,
        components,
        patterns: usage.patterns,
        location: node.location.clone(),
    })
}

fn node_list(p: &mut Projector<'_>, node: &RawNode, usage: &mut Usage) -> Vec<PatternNode> {
    let Some(items) = p.expect_sequence(node) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| p.enter_index(index, |p| project_node(p, item, usage)))
        .collect()
}

fn optional_children(
    p: &mut Projector<'_>,
    map: &RawMap,
    key: &str,
    usage: &mut Usage,
) -> Vec<PatternNode> {
    map.get(key)
        .map(|n| p.enter(key, |p| node_list(p, n, usage)))
        .unwrap_or_default()
}

fn node_props(p: &mut Projector<'_>, map: &RawMap) -> NodeProps {
    map.get("props")
        .map(|n| p.enter("props", |p| style_map(p, n)))
        .unwrap_or_default()
}

fn project_node(p: &mut Projector<'_>, node: &RawNode, usage: &mut Usage) -> Option<PatternNode> {
    let map = p.expect_map(node)?;
    let kind = p.required_str(map, "type", &node.location)?;
    let location = node.location.clone();

    Some(match kind {
        "component" => {
            p.check_fields(map, &["type", "component", "props", "children"]);
            let component = p.required_str(map, "component", &node.location);
            let props = node_props(p, map);
            let children = optional_children(p, map, "children", usage);
            let component = SmolStr::new(component?);
            let used_at = map
                .get("component")
                .map_or_else(|| location.clone(), |n| n.location.clone());
            usage.components.push((component.clone(), used_at));
            PatternNode::Component {
                component,
                props,
                children,
                location,
            }
        }
        "element" => {
            p.check_fields(map, &["type", "tag", "props", "children"]);
            let tag = p.required_str(map, "tag", &node.location);
            let props = node_props(p, map);
            let children = optional_children(p, map, "children", usage);
            PatternNode::Element {
                tag: SmolStr::new(tag?),
                props,
                children,
                location,
            }
        }
        "conditional" => {
            p.check_fields(map, &["type", "condition", "then", "else"]);
            let condition = p.required_str(map, "condition", &node.location);
            let then = optional_children(p, map, "then", usage);
            let otherwise = optional_children(p, map, "else", usage);
            PatternNode::Conditional {
                condition: condition?.to_string(),
                then,
                otherwise,
                location,
            }
        }
        "loop" => {
            p.check_fields(map, &["type", "each", "as", "children"]);
            let each = p.required_str(map, "each", &node.location);
            let item = p.optional_str(map, "as").unwrap_or("item");
            let children = optional_children(p, map, "children", usage);
            PatternNode::Loop {
                each: each?.to_string(),
                item: SmolStr::new(item),
                children,
                location,
            }
        }
        "slot" => {
            p.check_fields(map, &["type", "name", "fallback"]);
            let name = p.required_str(map, "name", &node.location);
            let fallback = optional_children(p, map, "fallback", usage);
            PatternNode::Slot {
                name: SmolStr::new(name?),
                fallback,
                location,
            }
        }
        "pattern" => {
            p.check_fields(map, &["type", "pattern", "props"]);
            let pattern = p.required_str(map, "pattern", &node.location);
            let props = node_props(p, map);
            let pattern = SmolStr::new(pattern?);
            usage.patterns.insert(pattern.clone());
            PatternNode::Pattern {
                pattern,
                props,
                location,
            }
        }
        other => {
            let type_location = map.get("type").map_or(&node.location, |n| &n.location);
            let mut issue = ValidationIssue::error(
                codes::INVALID_ENUM_VALUE,
                format!(
                    "'{other}' is not a node type (expected one of {})",
                    NODE_TYPES.join(", ")
                ),
            )
            .with_location(type_location.clone());
            if let Some(hint) = did_you_mean(other, NODE_TYPES.iter().copied()) {
                issue = issue.with_suggestion(hint);
            }
            p.enter("type", |p| p.report(issue));
            return None;
        }
    })
}
