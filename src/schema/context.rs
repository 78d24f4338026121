//! Projection helpers shared by the per-kind validators.
//!
//! A [`Projector`] walks a raw tree while tracking the current field path,
//! so every issue it reports points at the exact offending value.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::SourceLocation;
use crate::config::CompilerConfig;
use crate::diagnostics::{Severity, ValidationIssue, codes, did_you_mean};
use crate::model::{TokenRef, Value, ValueExpr, parse_reference_path, unescape_literal};
use crate::parser::{RawMap, RawNode, RawValue};

/// Naming rule for declared identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameRule {
    /// `Button`, `ListPage`
    PascalCase,
    /// `variant`, `isDisabled`, `aria_label`
    Identifier,
}

impl NameRule {
    fn accepts(self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        match self {
            NameRule::PascalCase => {
                first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric())
            }
            NameRule::Identifier => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            }
        }
    }

    fn describe(self) -> &'static str {
        match self {
            NameRule::PascalCase => "a PascalCase identifier",
            NameRule::Identifier => "an identifier (letters, digits, '_' or '-')",
        }
    }
}

pub(crate) struct Projector<'c> {
    file: Arc<str>,
    config: &'c CompilerConfig,
    path: Vec<SmolStr>,
    issues: Vec<ValidationIssue>,
}

impl<'c> Projector<'c> {
    pub fn new(file: Arc<str>, config: &'c CompilerConfig) -> Self {
        Self {
            file,
            config,
            path: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn file(&self) -> &Arc<str> {
        &self.file
    }

    pub fn config(&self) -> &CompilerConfig {
        self.config
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    /// Run `f` with `segment` appended to the current path.
    pub fn enter<R>(&mut self, segment: impl Into<SmolStr>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Run `f` with several segments appended to the current path.
    pub fn enter_all<R>(&mut self, segments: &[SmolStr], f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.path.len();
        self.path.extend(segments.iter().cloned());
        let result = f(self);
        self.path.truncate(depth);
        result
    }

    /// Run `f` inside sequence element `index`.
    pub fn enter_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter(SmolStr::new(index.to_string()), f)
    }

    /// Report an issue at the current path.
    pub fn report(&mut self, issue: ValidationIssue) {
        let issue = if issue.path.is_empty() {
            issue.with_path(self.path.iter().cloned())
        } else {
            issue
        };
        self.issues.push(issue);
    }

    pub fn error(&mut self, code: &'static str, message: impl Into<String>, location: &SourceLocation) {
        self.report(ValidationIssue::error(code, message).with_location(location.clone()));
    }

    pub fn warning(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        location: &SourceLocation,
    ) {
        self.report(ValidationIssue::warning(code, message).with_location(location.clone()));
    }

    // ========================================================================
    // SHAPES
    // ========================================================================

    fn type_mismatch(&mut self, node: &RawNode, expected: &str) {
        self.error(
            codes::TYPE_MISMATCH,
            format!("expected {expected}, found {}", node.type_name()),
            &node.location,
        );
    }

    pub fn expect_map<'n>(&mut self, node: &'n RawNode) -> Option<&'n RawMap> {
        let map = node.as_map();
        if map.is_none() {
            self.type_mismatch(node, "a map");
        }
        map
    }

    pub fn expect_sequence<'n>(&mut self, node: &'n RawNode) -> Option<&'n [RawNode]> {
        let items = node.as_sequence();
        if items.is_none() {
            self.type_mismatch(node, "a list");
        }
        items
    }

    pub fn expect_str<'n>(&mut self, node: &'n RawNode) -> Option<&'n str> {
        let s = node.as_str();
        if s.is_none() {
            self.type_mismatch(node, "a string");
        }
        s
    }

    pub fn expect_bool(&mut self, node: &RawNode) -> Option<bool> {
        let b = node.as_bool();
        if b.is_none() {
            self.type_mismatch(node, "a boolean");
        }
        b
    }

    pub fn expect_number(&mut self, node: &RawNode) -> Option<f64> {
        let n = node.as_f64();
        if n.is_none() {
            self.type_mismatch(node, "a number");
        }
        n
    }

    /// A list of strings; non-string items are reported and skipped.
    pub fn expect_string_list(&mut self, node: &RawNode) -> Option<Vec<SmolStr>> {
        let items = self.expect_sequence(node)?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if let Some(s) = self.enter_index(index, |p| p.expect_str(item)) {
                out.push(SmolStr::new(s));
            }
        }
        Some(out)
    }

    // ========================================================================
    // FIELDS
    // ========================================================================

    /// Look up a required field, reporting it when absent.
    pub fn required<'n>(
        &mut self,
        map: &'n RawMap,
        key: &str,
        owner: &SourceLocation,
    ) -> Option<&'n RawNode> {
        let node = map.get(key);
        if node.is_none() {
            self.enter(key, |p| {
                p.error(
                    codes::MISSING_REQUIRED_FIELD,
                    format!("missing required field '{key}'"),
                    owner,
                )
            });
        }
        node
    }

    pub fn required_str<'n>(
        &mut self,
        map: &'n RawMap,
        key: &str,
        owner: &SourceLocation,
    ) -> Option<&'n str> {
        let node = self.required(map, key, owner)?;
        self.enter(key, |p| p.expect_str(node))
    }

    pub fn optional_str<'n>(&mut self, map: &'n RawMap, key: &str) -> Option<&'n str> {
        let node = map.get(key)?;
        self.enter(key, |p| p.expect_str(node))
    }

    pub fn optional_bool(&mut self, map: &RawMap, key: &str) -> Option<bool> {
        let node = map.get(key)?;
        self.enter(key, |p| p.expect_bool(node))
    }

    pub fn optional_number(&mut self, map: &RawMap, key: &str) -> Option<f64> {
        let node = map.get(key)?;
        self.enter(key, |p| p.expect_number(node))
    }

    /// A non-negative integer field.
    pub fn optional_count(&mut self, map: &RawMap, key: &str) -> Option<u64> {
        let node = map.get(key)?;
        self.enter(key, |p| {
            let n = p.expect_number(node)?;
            if n < 0.0 || n.fract() != 0.0 {
                p.error(
                    codes::OUT_OF_RANGE,
                    format!("'{key}' must be a non-negative integer, found {n}"),
                    &node.location,
                );
                return None;
            }
            Some(n as u64)
        })
    }

    /// Report every key not in `allowed`.
    pub fn check_fields(&mut self, map: &RawMap, allowed: &[&str]) {
        let severity = if self.config.strict_unknown_fields {
            Severity::Error
        } else {
            Severity::Warning
        };
        for (key, entry) in map.iter() {
            if allowed.contains(&key) {
                continue;
            }
            let mut issue =
                ValidationIssue::new(severity, codes::UNKNOWN_FIELD, format!("unknown field '{key}'"))
                    .with_location(entry.key_location.clone());
            if let Some(hint) = did_you_mean(key, allowed.iter().copied()) {
                issue = issue.with_suggestion(hint);
            }
            self.enter(key, |p| p.report(issue));
        }
    }

    /// Check a declared name against a naming rule.
    pub fn check_name(&mut self, name: &str, rule: NameRule, location: &SourceLocation) -> bool {
        if rule.accepts(name) {
            return true;
        }
        self.error(
            codes::PATTERN_MISMATCH,
            format!("'{name}' must be {}", rule.describe()),
            location,
        );
        false
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    /// Project a raw node into a value expression, parsing references.
    ///
    /// Returns `None` when any part of the value was rejected.
    pub fn value_expr(&mut self, node: &RawNode) -> Option<ValueExpr> {
        match &node.value {
            RawValue::Null => {
                self.type_mismatch(node, "a value");
                None
            }
            RawValue::Bool(b) => Some(ValueExpr::Literal(Value::Bool(*b))),
            RawValue::Number(n) => Some(ValueExpr::Literal(Value::Number(*n))),
            RawValue::String(s) => self.string_expr(s, &node.location),
            RawValue::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut ok = true;
                for (index, item) in items.iter().enumerate() {
                    match self.enter_index(index, |p| p.value_expr(item)) {
                        Some(expr) => out.push(expr),
                        None => ok = false,
                    }
                }
                ok.then_some(ValueExpr::List(out))
            }
            RawValue::Map(map) => {
                let mut out = indexmap::IndexMap::with_capacity(map.len());
                let mut ok = true;
                for (key, entry) in map.iter() {
                    match self.enter(key, |p| p.value_expr(&entry.value)) {
                        Some(expr) => {
                            out.insert(SmolStr::new(key), expr);
                        }
                        None => ok = false,
                    }
                }
                ok.then_some(ValueExpr::Object(out))
            }
        }
    }

    fn string_expr(&mut self, text: &str, location: &SourceLocation) -> Option<ValueExpr> {
        let sigil = self.config.reference_sigil;
        match parse_reference_path(text, sigil) {
            Ok(Some(path)) => Some(ValueExpr::Reference(TokenRef::new(
                path,
                text,
                location.clone(),
            ))),
            Ok(None) => Some(ValueExpr::Literal(Value::String(
                unescape_literal(text, sigil).to_string(),
            ))),
            Err(e) => {
                self.error(codes::INVALID_REFERENCE_SYNTAX, e.message, location);
                None
            }
        }
    }

    /// Project a raw node into a plain literal (no references), e.g. a prop default.
    pub fn literal(&mut self, node: &RawNode) -> Option<Value> {
        Some(match &node.value {
            RawValue::Null => {
                self.type_mismatch(node, "a value");
                return None;
            }
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Number(n) => Value::Number(*n),
            RawValue::String(s) => Value::String(s.clone()),
            RawValue::Sequence(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| self.enter_index(i, |p| p.literal(item)))
                    .collect(),
            ),
            RawValue::Map(map) => Value::Object(
                map.iter()
                    .filter_map(|(key, entry)| {
                        self.enter(key, |p| p.literal(&entry.value))
                            .map(|v| (SmolStr::new(key), v))
                    })
                    .collect(),
            ),
        })
    }
}
