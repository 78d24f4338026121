//! Token documents: nested groups of tokens.
//!
//! A map with a `value` key is a token; any other map is a group. Groups may
//! carry `type`, `description` and `deprecated`, inherited by descendants.

use std::sync::Arc;

use smol_str::SmolStr;

use super::context::Projector;
use super::literals::{LiteralError, normalize};
use crate::base::SourceLocation;
use crate::diagnostics::{Severity, ValidationIssue, codes, did_you_mean};
use crate::model::{Deprecation, Token, TokenCategory, is_segment_char, join_path};
use crate::parser::{RawMap, RawNode, RawValue};

const TOKEN_FIELDS: &[&str] = &["value", "type", "description", "deprecated", "extensions"];
const GROUP_FIELDS: &[&str] = &["type", "description", "deprecated", "extensions"];

/// A validated token collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TokensDocument {
    pub file: Arc<str>,
    /// Tokens in document order.
    pub tokens: Vec<Token>,
}

/// Settings a group passes down to its descendants.
#[derive(Debug, Clone, Default)]
struct Inherited {
    category: Option<TokenCategory>,
    deprecated: Option<Deprecation>,
}

pub(crate) fn project_tokens(p: &mut Projector<'_>, root: &RawMap, owner: &RawNode) -> TokensDocument {
    let mut tokens = Vec::new();
    if let Some(node) = p.required(root, "tokens", &owner.location) {
        p.enter("tokens", |p| {
            if let Some(map) = p.expect_map(node) {
                project_group(p, map, &mut Vec::new(), &Inherited::default(), &mut tokens);
            }
        });
    }
    TokensDocument {
        file: p.file().clone(),
        tokens,
    }
}

fn project_group(
    p: &mut Projector<'_>,
    group: &RawMap,
    path: &mut Vec<SmolStr>,
    inherited: &Inherited,
    out: &mut Vec<Token>,
) {
    for (key, entry) in group.iter() {
        if GROUP_FIELDS.contains(&key) {
            continue;
        }
        p.enter(key, |p| {
            if key.is_empty() || !key.chars().all(is_segment_char) {
                p.error(
                    codes::PATTERN_MISMATCH,
                    format!("'{key}' is not a valid token name (letters, digits, '_' or '-')"),
                    &entry.key_location,
                );
                return;
            }
            let Some(child) = entry.value.as_map() else {
                p.error(
                    codes::TYPE_MISMATCH,
                    format!(
                        "'{key}' must be a token (a map with 'value') or a group, found {}",
                        entry.value.type_name()
                    ),
                    &entry.value.location,
                );
                return;
            };

            path.push(SmolStr::new(key));
            if child.contains_key("value") {
                if let Some(token) = project_token(p, child, &entry.key_location, path, inherited) {
                    out.push(token);
                }
            } else {
                let scope = group_settings(p, child, inherited);
                project_group(p, child, path, &scope, out);
            }
            path.pop();
        });
    }
}

fn group_settings(p: &mut Projector<'_>, group: &RawMap, inherited: &Inherited) -> Inherited {
    let mut scope = inherited.clone();
    if let Some(category) = declared_category(p, group) {
        scope.category = Some(category);
    }
    if let Some(deprecated) = deprecation(p, group) {
        scope.deprecated = deprecated;
    }
    // Validated for shape only.
    p.optional_str(group, "description");
    scope
}

fn project_token(
    p: &mut Projector<'_>,
    map: &RawMap,
    key_location: &SourceLocation,
    path: &[SmolStr],
    inherited: &Inherited,
) -> Option<Token> {
    p.check_fields(map, TOKEN_FIELDS);

    let declared = declared_category(p, map);
    let category = declared
        .or(inherited.category)
        .or_else(|| path.first().and_then(|g| TokenCategory::infer_from_group(g)));
    let description = p.optional_str(map, "description").map(str::to_string);
    let deprecated = match deprecation(p, map) {
        Some(own) => own,
        None => inherited.deprecated.clone(),
    };

    let value_node = map.get("value")?;
    let expr = p.enter("value", |p| p.value_expr(value_node));

    let Some(category) = category else {
        p.enter("type", |p| {
            p.report(
                ValidationIssue::error(
                    codes::MISSING_REQUIRED_FIELD,
                    format!(
                        "cannot determine the type of token '{}'",
                        join_path(path)
                    ),
                )
                .with_location(key_location.clone())
                .with_suggestion(format!(
                    "add a 'type' field (one of {})",
                    category_names().join(", ")
                )),
            )
        });
        return None;
    };

    let (value, errors) = normalize(category, expr?);
    if !errors.is_empty() {
        p.enter("value", |p| report_literal_errors(p, errors, &value_node.location));
    }

    let resolved_value = value.to_literal();
    Some(Token {
        id: SmolStr::new(join_path(path)),
        path: path.to_vec(),
        category,
        description,
        deprecated,
        value,
        resolved_value,
        location: key_location.clone(),
    })
}

fn report_literal_errors(p: &mut Projector<'_>, errors: Vec<LiteralError>, location: &SourceLocation) {
    let strict = p.config().strict_unknown_fields;
    for error in errors {
        let severity = if error.code == codes::UNKNOWN_FIELD && !strict {
            Severity::Warning
        } else {
            Severity::Error
        };
        let issue =
            ValidationIssue::new(severity, error.code, error.message).with_location(location.clone());
        p.enter_all(&error.path, |p| p.report(issue));
    }
}

fn category_names() -> Vec<&'static str> {
    TokenCategory::ALL.iter().map(TokenCategory::as_str).collect()
}

/// `type` field, if present and valid.
fn declared_category(p: &mut Projector<'_>, map: &RawMap) -> Option<TokenCategory> {
    let name = p.optional_str(map, "type")?;
    let category = TokenCategory::from_name(name);
    if category.is_none() {
        let node_location = map
            .get("type")
            .map(|n| n.location.clone())
            .unwrap_or_else(|| SourceLocation::file_start(p.file().clone()));
        let mut issue = ValidationIssue::error(
            codes::INVALID_ENUM_VALUE,
            format!("'{name}' is not a token type"),
        )
        .with_location(node_location);
        if let Some(hint) = did_you_mean(name, category_names()) {
            issue = issue.with_suggestion(hint);
        }
        p.enter("type", |p| p.report(issue));
    }
    category
}

/// `deprecated` field: `true`, `false`, or a message string.
///
/// Returns `Some(None)` for an explicit `false`.
fn deprecation(p: &mut Projector<'_>, map: &RawMap) -> Option<Option<Deprecation>> {
    let node = map.get("deprecated")?;
    match &node.value {
        RawValue::Bool(true) => Some(Some(Deprecation::default())),
        RawValue::Bool(false) => Some(None),
        RawValue::String(message) => Some(Some(Deprecation {
            message: Some(message.clone()),
        })),
        _ => {
            p.enter("deprecated", |p| {
                p.error(
                    codes::TYPE_MISMATCH,
                    format!(
                        "'deprecated' must be a boolean or a message, found {}",
                        node.type_name()
                    ),
                    &node.location,
                )
            });
            None
        }
    }
}
