//! Component documents, props and styling blocks.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::context::{NameRule, Projector};
use crate::base::SourceLocation;
use crate::diagnostics::{ValidationIssue, codes, did_you_mean};
use crate::model::{
    Accessibility, BoundValue, ComponentPart, ComponentSpec, CompoundVariant, PropConstraints,
    PropDefinition, PropType, StateSpec, StyleMap, Styling, Value, VariantGroup, VariantOption,
};
use crate::parser::{RawMap, RawNode, RawValue};

const COMPONENT_FIELDS: &[&str] = &[
    "name",
    "category",
    "description",
    "props",
    "styling",
    "states",
    "accessibility",
    "parts",
    "context",
];
const PROP_FIELDS: &[&str] = &[
    "name",
    "type",
    "values",
    "types",
    "fields",
    "items",
    "params",
    "component",
    "required",
    "default",
    "description",
    "min",
    "max",
    "minLength",
    "maxLength",
    "pattern",
];
const NESTED_TYPE_FIELDS: &[&str] = &["type", "values", "types", "fields", "items", "params", "component"];
const STYLING_FIELDS: &[&str] = &["base", "variants", "compoundVariants", "defaultVariants"];
const COMPOUND_FIELDS: &[&str] = &["conditions", "styles"];
const STATE_FIELDS: &[&str] = &["condition", "styles"];
const ACCESSIBILITY_FIELDS: &[&str] = &["role", "label", "keyboard", "focusable", "aria"];
const PART_FIELDS: &[&str] = &["description", "props", "styling", "states"];

const PROP_TYPE_NAMES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "enum",
    "union",
    "object",
    "array",
    "slot",
    "ref",
    "callback",
    "componentRef",
];

/// Category used when a component or pattern does not declare one.
pub(crate) const DEFAULT_CATEGORY: &str = "general";

/// A validated component collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentsDocument {
    pub file: Arc<str>,
    pub components: Vec<ComponentSpec>,
}

pub(crate) fn project_components(
    p: &mut Projector<'_>,
    root: &RawMap,
    owner: &RawNode,
) -> ComponentsDocument {
    let mut components = Vec::new();
    if let Some(node) = p.required(root, "components", &owner.location) {
        p.enter("components", |p| {
            let Some(items) = p.expect_sequence(node) else {
                return;
            };
            for (index, item) in items.iter().enumerate() {
                let component = p.enter_index(index, |p| {
                    let map = p.expect_map(item)?;
                    project_component(p, map, item)
                });
                components.extend(component);
            }
        });
    }
    ComponentsDocument {
        file: p.file().clone(),
        components,
    }
}

fn project_component(p: &mut Projector<'_>, map: &RawMap, node: &RawNode) -> Option<ComponentSpec> {
    p.check_fields(map, COMPONENT_FIELDS);

    let name = declared_name(p, map, node, NameRule::PascalCase);
    let category = p.optional_str(map, "category").unwrap_or(DEFAULT_CATEGORY);
    let description = p.optional_str(map, "description").map(str::to_string);
    let props = optional_props(p, map, "props");
    let styling = map
        .get("styling")
        .map(|n| p.enter("styling", |p| project_styling(p, n)))
        .unwrap_or_default();
    let states = map
        .get("states")
        .map(|n| p.enter("states", |p| project_states(p, n)))
        .unwrap_or_default();
    let accessibility = map
        .get("accessibility")
        .map(|n| p.enter("accessibility", |p| project_accessibility(p, n)))
        .unwrap_or_default();
    let parts = map
        .get("parts")
        .map(|n| p.enter("parts", |p| project_parts(p, n)))
        .unwrap_or_default();
    let context = optional_props(p, map, "context");

    Some(ComponentSpec {
        name: SmolStr::new(name?),
        category: SmolStr::new(category),
        description,
        props,
        styling,
        states,
        accessibility,
        parts,
        context,
        location: node.location.clone(),
    })
}

/// Required `name` field checked against `rule`.
pub(crate) fn declared_name<'n>(
    p: &mut Projector<'_>,
    map: &'n RawMap,
    owner: &RawNode,
    rule: NameRule,
) -> Option<&'n str> {
    let name = p.required_str(map, "name", &owner.location)?;
    let location = map.get("name").map_or(&owner.location, |n| &n.location);
    p.enter("name", |p| p.check_name(name, rule, location))
        .then_some(name)
}

// ============================================================================
// PROPS
// ============================================================================

pub(crate) fn optional_props(p: &mut Projector<'_>, map: &RawMap, key: &str) -> Vec<PropDefinition> {
    map.get(key)
        .map(|n| p.enter(key, |p| project_props(p, n)))
        .unwrap_or_default()
}

/// An ordered prop list with unique names.
pub(crate) fn project_props(p: &mut Projector<'_>, node: &RawNode) -> Vec<PropDefinition> {
    let Some(items) = p.expect_sequence(node) else {
        return Vec::new();
    };
    let mut props: Vec<PropDefinition> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        p.enter_index(index, |p| {
            let Some(map) = p.expect_map(item) else {
                return;
            };
            let Some(prop) = project_prop(p, map, item) else {
                return;
            };
            if props.iter().any(|existing| existing.name == prop.name) {
                p.enter("name", |p| {
                    p.error(
                        codes::DUPLICATE_DEFINITION,
                        format!("prop '{}' is declared more than once", prop.name),
                        &prop.location,
                    )
                });
                return;
            }
            props.push(prop);
        });
    }
    props
}

fn project_prop(p: &mut Projector<'_>, map: &RawMap, node: &RawNode) -> Option<PropDefinition> {
    p.check_fields(map, PROP_FIELDS);

    let name = declared_name(p, map, node, NameRule::Identifier);
    let prop_type = p
        .required(map, "type", &node.location)
        .and_then(|type_node| prop_type_field(p, map, type_node));
    let required = p.optional_bool(map, "required").unwrap_or(false);
    let description = p.optional_str(map, "description").map(str::to_string);
    let constraints = project_constraints(p, map);
    let default = map
        .get("default")
        .and_then(|n| p.enter("default", |p| p.literal(n).map(|v| (v, n))));

    let name = name?;
    let prop_type = prop_type?;
    let default = default.and_then(|(value, default_node)| {
        let ok = p.enter("default", |p| {
            check_default(p, name, &prop_type, &value, &default_node.location)
        });
        ok.then_some(value)
    });

    Some(PropDefinition {
        name: SmolStr::new(name),
        prop_type,
        required,
        default,
        description,
        constraints,
        location: map
            .entry("name")
            .map_or_else(|| node.location.clone(), |e| e.value.location.clone()),
    })
}

/// Read `type` plus the keys that parameterize it from `owner`.
fn prop_type_field(p: &mut Projector<'_>, owner: &RawMap, type_node: &RawNode) -> Option<PropType> {
    let name = p.enter("type", |p| p.expect_str(type_node))?;
    prop_type_named(p, owner, name, &type_node.location)
}

fn prop_type_named(
    p: &mut Projector<'_>,
    owner: &RawMap,
    name: &str,
    location: &SourceLocation,
) -> Option<PropType> {
    Some(match name {
        "string" => PropType::String,
        "number" => PropType::Number,
        "boolean" => PropType::Boolean,
        "slot" => PropType::Slot,
        "ref" => PropType::Ref,
        "enum" => PropType::Enum {
            values: owner
                .get("values")
                .and_then(|n| p.enter("values", |p| p.expect_string_list(n)))
                .unwrap_or_default(),
        },
        "union" => {
            let node = p.required(owner, "types", location)?;
            let items = p.enter("types", |p| p.expect_sequence(node))?;
            let types = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| p.enter("types", |p| p.enter_index(i, |p| nested_type(p, item))))
                .collect();
            PropType::Union { types }
        }
        "object" => PropType::Object {
            fields: optional_props(p, owner, "fields"),
        },
        "array" => {
            let node = p.required(owner, "items", location)?;
            let items = p.enter("items", |p| nested_type(p, node))?;
            PropType::Array {
                items: Box::new(items),
            }
        }
        "callback" => PropType::Callback {
            params: owner
                .get("params")
                .and_then(|n| p.enter("params", |p| p.expect_string_list(n)))
                .unwrap_or_default(),
        },
        "componentRef" => {
            let component = p.optional_str(owner, "component");
            if let (Some(component), Some(node)) = (component, owner.get("component")) {
                p.enter("component", |p| {
                    p.check_name(component, NameRule::PascalCase, &node.location)
                });
            }
            PropType::ComponentRef {
                component: component.map(SmolStr::new),
            }
        }
        other => {
            let mut issue = ValidationIssue::error(
                codes::INVALID_ENUM_VALUE,
                format!("'{other}' is not a prop type"),
            )
            .with_location(location.clone());
            if let Some(hint) = did_you_mean(other, PROP_TYPE_NAMES.iter().copied()) {
                issue = issue.with_suggestion(hint);
            }
            p.enter("type", |p| p.report(issue));
            return None;
        }
    })
}

/// A type written inline: `"string"` or `{"type": "enum", "values": [...]}`.
fn nested_type(p: &mut Projector<'_>, node: &RawNode) -> Option<PropType> {
    match &node.value {
        RawValue::String(name) => prop_type_named(p, &RawMap::new(), name, &node.location),
        RawValue::Map(map) => {
            p.check_fields(map, NESTED_TYPE_FIELDS);
            let type_node = p.required(map, "type", &node.location)?;
            prop_type_field(p, map, type_node)
        }
        _ => {
            p.error(
                codes::TYPE_MISMATCH,
                format!("expected a type name or type map, found {}", node.type_name()),
                &node.location,
            );
            None
        }
    }
}

fn project_constraints(p: &mut Projector<'_>, map: &RawMap) -> PropConstraints {
    let constraints = PropConstraints {
        min: p.optional_number(map, "min"),
        max: p.optional_number(map, "max"),
        min_length: p.optional_count(map, "minLength"),
        max_length: p.optional_count(map, "maxLength"),
        pattern: p.optional_str(map, "pattern").map(str::to_string),
    };
    if let (Some(min), Some(max)) = (constraints.min, constraints.max) {
        if min > max {
            if let Some(node) = map.get("min") {
                p.enter("min", |p| {
                    p.error(
                        codes::OUT_OF_RANGE,
                        format!("'min' ({min}) is greater than 'max' ({max})"),
                        &node.location,
                    )
                });
            }
        }
    }
    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            if let Some(node) = map.get("minLength") {
                p.enter("minLength", |p| {
                    p.error(
                        codes::OUT_OF_RANGE,
                        format!("'minLength' ({min}) is greater than 'maxLength' ({max})"),
                        &node.location,
                    )
                });
            }
        }
    }
    constraints
}

/// Check a default value against its prop type.
fn check_default(
    p: &mut Projector<'_>,
    prop: &str,
    prop_type: &PropType,
    value: &Value,
    location: &SourceLocation,
) -> bool {
    let matches = match (prop_type, value) {
        (PropType::String, Value::String(_))
        | (PropType::Number, Value::Number(_))
        | (PropType::Boolean, Value::Bool(_)) => true,
        (PropType::String | PropType::Number | PropType::Boolean, _) => false,
        (PropType::Enum { values }, Value::String(s)) => {
            if values.is_empty() || values.iter().any(|v| v == s) {
                true
            } else {
                let mut issue = ValidationIssue::error(
                    codes::INVALID_ENUM_VALUE,
                    format!(
                        "default '{s}' of prop '{prop}' is not one of [{}]",
                        values.join(", ")
                    ),
                )
                .with_location(location.clone());
                if let Some(hint) = did_you_mean(s, values.iter().map(SmolStr::as_str)) {
                    issue = issue.with_suggestion(hint);
                }
                p.report(issue);
                return false;
            }
        }
        (PropType::Enum { .. }, _) => false,
        (PropType::Array { .. }, Value::List(_)) | (PropType::Object { .. }, Value::Object(_)) => true,
        (PropType::Array { .. } | PropType::Object { .. }, _) => false,
        _ => true,
    };
    if !matches {
        p.error(
            codes::TYPE_MISMATCH,
            format!("default of prop '{prop}' must be a {} value", prop_type.name()),
            location,
        );
    }
    matches
}

// ============================================================================
// STYLING
// ============================================================================

pub(crate) fn style_map(p: &mut Projector<'_>, node: &RawNode) -> StyleMap {
    let Some(map) = p.expect_map(node) else {
        return StyleMap::new();
    };
    let mut styles = StyleMap::with_capacity(map.len());
    for (property, entry) in map.iter() {
        if let Some(expr) = p.enter(property, |p| p.value_expr(&entry.value)) {
            styles.insert(
                SmolStr::new(property),
                BoundValue::new(expr, entry.value.location.clone()),
            );
        }
    }
    styles
}

fn project_styling(p: &mut Projector<'_>, node: &RawNode) -> Styling {
    let Some(map) = p.expect_map(node) else {
        return Styling::default();
    };
    p.check_fields(map, STYLING_FIELDS);

    let base = map
        .get("base")
        .map(|n| p.enter("base", |p| style_map(p, n)))
        .unwrap_or_default();
    let variants = map
        .get("variants")
        .map(|n| p.enter("variants", |p| project_variants(p, n)))
        .unwrap_or_default();
    let compound_variants = map
        .get("compoundVariants")
        .map(|n| p.enter("compoundVariants", |p| project_compound_variants(p, n)))
        .unwrap_or_default();
    let default_variants = map
        .get("defaultVariants")
        .map(|n| p.enter("defaultVariants", |p| project_default_variants(p, n)))
        .unwrap_or_default();

    Styling {
        base,
        variants,
        compound_variants,
        default_variants,
    }
}

fn project_variants(p: &mut Projector<'_>, node: &RawNode) -> IndexMap<SmolStr, VariantGroup> {
    let Some(map) = p.expect_map(node) else {
        return IndexMap::new();
    };
    let mut groups = IndexMap::with_capacity(map.len());
    for (prop, entry) in map.iter() {
        let group = p.enter(prop, |p| {
            let options_map = p.expect_map(&entry.value)?;
            let mut options = IndexMap::with_capacity(options_map.len());
            for (option, option_entry) in options_map.iter() {
                let styles = p.enter(option, |p| style_map(p, &option_entry.value));
                options.insert(
                    SmolStr::new(option),
                    VariantOption {
                        name: SmolStr::new(option),
                        styles,
                        location: option_entry.key_location.clone(),
                    },
                );
            }
            Some(VariantGroup {
                prop: SmolStr::new(prop),
                options,
                location: entry.key_location.clone(),
            })
        });
        if let Some(group) = group {
            groups.insert(SmolStr::new(prop), group);
        }
    }
    groups
}

fn project_compound_variants(p: &mut Projector<'_>, node: &RawNode) -> Vec<CompoundVariant> {
    let Some(items) = p.expect_sequence(node) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let compound = p.enter_index(index, |p| {
            let map = p.expect_map(item)?;
            p.check_fields(map, COMPOUND_FIELDS);
            let conditions_node = p.required(map, "conditions", &item.location)?;
            let conditions = p.enter("conditions", |p| variant_conditions(p, conditions_node))?;
            let styles = map
                .get("styles")
                .map(|n| p.enter("styles", |p| style_map(p, n)))
                .unwrap_or_default();
            Some(CompoundVariant {
                conditions,
                styles,
                location: item.location.clone(),
            })
        });
        out.extend(compound);
    }
    out
}

/// `{"variant": "primary", "size": ["sm", "md"], "disabled": true}`
///
/// Condition values are prop option names matched as written; they are never
/// resolved as token references.
fn variant_conditions(
    p: &mut Projector<'_>,
    node: &RawNode,
) -> Option<IndexMap<SmolStr, Vec<SmolStr>>> {
    let map = p.expect_map(node)?;
    let sigil = p.config().reference_sigil;
    let mut conditions = IndexMap::with_capacity(map.len());
    for (prop, entry) in map.iter() {
        let values = p.enter(prop, |p| match &entry.value.value {
            RawValue::Sequence(_) => p.expect_string_list(&entry.value),
            _ => variant_key(p, &entry.value).map(|v| vec![v]),
        });
        if let Some(values) = &values {
            if let Some(value) = values.iter().find(|v| v.starts_with(sigil)) {
                p.enter(prop, |p| {
                    p.report(
                        ValidationIssue::warning(
                            codes::INVALID_REFERENCE_SYNTAX,
                            format!(
                                "condition value '{value}' looks like a token reference; \
                                 compound variant conditions match prop values as written"
                            ),
                        )
                        .with_location(entry.value.location.clone())
                        .with_suggestion(format!("use the option name of prop '{prop}'")),
                    );
                });
            }
        }
        if let Some(values) = values {
            conditions.insert(SmolStr::new(prop), values);
        }
    }
    Some(conditions)
}

fn project_default_variants(p: &mut Projector<'_>, node: &RawNode) -> IndexMap<SmolStr, SmolStr> {
    let Some(map) = p.expect_map(node) else {
        return IndexMap::new();
    };
    map.iter()
        .filter_map(|(prop, entry)| {
            p.enter(prop, |p| variant_key(p, &entry.value))
                .map(|v| (SmolStr::new(prop), v))
        })
        .collect()
}

/// A variant option name; booleans select the `"true"`/`"false"` options.
fn variant_key(p: &mut Projector<'_>, node: &RawNode) -> Option<SmolStr> {
    match &node.value {
        RawValue::String(s) => Some(SmolStr::new(s)),
        RawValue::Bool(b) => Some(SmolStr::new(if *b { "true" } else { "false" })),
        _ => {
            p.error(
                codes::TYPE_MISMATCH,
                format!("expected a variant name, found {}", node.type_name()),
                &node.location,
            );
            None
        }
    }
}

// ============================================================================
// STATES, ACCESSIBILITY, PARTS
// ============================================================================

pub(crate) fn project_states(p: &mut Projector<'_>, node: &RawNode) -> Vec<StateSpec> {
    let Some(map) = p.expect_map(node) else {
        return Vec::new();
    };
    let mut states = Vec::with_capacity(map.len());
    for (name, entry) in map.iter() {
        let state = p.enter(name, |p| {
            let state_map = p.expect_map(&entry.value)?;
            p.check_fields(state_map, STATE_FIELDS);
            let condition = p
                .optional_str(state_map, "condition")
                .map_or_else(|| format!(":{name}"), str::to_string);
            let styles = state_map
                .get("styles")
                .map(|n| p.enter("styles", |p| style_map(p, n)))
                .unwrap_or_default();
            Some(StateSpec {
                name: SmolStr::new(name),
                condition,
                styles,
                location: entry.key_location.clone(),
            })
        });
        states.extend(state);
    }
    states
}

fn project_accessibility(p: &mut Projector<'_>, node: &RawNode) -> Accessibility {
    let Some(map) = p.expect_map(node) else {
        return Accessibility::default();
    };
    p.check_fields(map, ACCESSIBILITY_FIELDS);

    let aria: IndexMap<SmolStr, String> = map
        .get("aria")
        .and_then(|n| {
            p.enter("aria", |p| {
                let aria_map = p.expect_map(n)?;
                Some(
                    aria_map
                        .iter()
                        .filter_map(|(key, entry)| {
                            p.enter(key, |p| p.expect_str(&entry.value))
                                .map(|v| (SmolStr::new(key), v.to_string()))
                        })
                        .collect(),
                )
            })
        })
        .unwrap_or_default();

    Accessibility {
        role: p.optional_str(map, "role").map(SmolStr::new),
        label: p.optional_str(map, "label").map(str::to_string),
        keyboard: map
            .get("keyboard")
            .and_then(|n| p.enter("keyboard", |p| p.expect_string_list(n)))
            .unwrap_or_default(),
        focusable: p.optional_bool(map, "focusable"),
        aria,
    }
}

fn project_parts(p: &mut Projector<'_>, node: &RawNode) -> Vec<ComponentPart> {
    let Some(map) = p.expect_map(node) else {
        return Vec::new();
    };
    let mut parts = Vec::with_capacity(map.len());
    for (name, entry) in map.iter() {
        let part = p.enter(name, |p| {
            if !p.check_name(name, NameRule::Identifier, &entry.key_location) {
                return None;
            }
            let part_map = p.expect_map(&entry.value)?;
            p.check_fields(part_map, PART_FIELDS);
            p.optional_str(part_map, "description");
            Some(ComponentPart {
                name: SmolStr::new(name),
                props: optional_props(p, part_map, "props"),
                styling: part_map
                    .get("styling")
                    .map(|n| p.enter("styling", |p| project_styling(p, n)))
                    .unwrap_or_default(),
                states: part_map
                    .get("states")
                    .map(|n| p.enter("states", |p| project_states(p, n)))
                    .unwrap_or_default(),
                location: entry.key_location.clone(),
            })
        });
        parts.extend(part);
    }
    parts
}
