//! YAML front-end backed by `serde_yaml`.
//!
//! `serde_yaml` does not expose node positions, so every node is located at
//! the start of the document; syntax errors keep the parser's line/column.

use std::sync::Arc;

use serde_yaml::Value;

use super::raw::{RawMap, RawNode, RawValue};
use crate::base::SourceLocation;
use crate::diagnostics::{ValidationIssue, codes};

pub fn parse_yaml(file: &Arc<str>, text: &str) -> (Option<RawNode>, Vec<ValidationIssue>) {
    let mut issues = Vec::new();

    let value: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            let location = match e.location() {
                Some(loc) => SourceLocation::new(
                    file.clone(),
                    loc.line().saturating_sub(1) as u32,
                    loc.column().saturating_sub(1) as u32,
                ),
                None => SourceLocation::file_start(file.clone()),
            };
            issues.push(
                ValidationIssue::error(codes::SYNTAX_ERROR, e.to_string()).with_location(location),
            );
            return (None, issues);
        }
    };

    let location = SourceLocation::file_start(file.clone());
    let root = convert(value, &location, &mut issues);
    (Some(root), issues)
}

fn convert(value: Value, location: &SourceLocation, issues: &mut Vec<ValidationIssue>) -> RawNode {
    let raw = match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => RawValue::Number(f),
            None => RawValue::String(n.to_string()),
        },
        Value::String(s) => RawValue::String(s),
        Value::Sequence(items) => RawValue::Sequence(
            items
                .into_iter()
                .map(|item| convert(item, location, issues))
                .collect(),
        ),
        Value::Mapping(mapping) => {
            let mut map = RawMap::new();
            for (key, value) in mapping {
                let key = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        issues.push(
                            ValidationIssue::error(
                                codes::SYNTAX_ERROR,
                                format!("unsupported map key {other:?}; keys must be scalars"),
                            )
                            .with_location(location.clone()),
                        );
                        continue;
                    }
                };
                let node = convert(value, location, issues);
                map.insert(key, location.clone(), node);
            }
            RawValue::Map(map)
        }
        Value::Tagged(tagged) => return convert(tagged.value, location, issues),
    };
    RawNode::new(raw, location.clone())
}
