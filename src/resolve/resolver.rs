use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::namespace::TokenNamespace;
use crate::base::constants::MAX_REFERENCE_DEPTH;
use crate::config::CompilerConfig;
use crate::diagnostics::{ValidationIssue, codes, similar_names};
use crate::model::{BoundValue, ComponentSpec, PatternSpec, TokenRef, Value, ValueExpr};

/// Resolves token references against a [`TokenNamespace`].
///
/// One resolver serves one compile: results are memoized per token id and
/// each reference cycle is reported once, whichever member is reached first.
pub struct Resolver<'a> {
    namespace: &'a TokenNamespace,
    sigil: char,
    deprecated_warnings: bool,
    memo: FxHashMap<SmolStr, Result<Value, ValidationIssue>>,
    /// Cycles already reported, rotated to start at their smallest id.
    reported_cycles: FxHashSet<Vec<SmolStr>>,
    /// Path of the entity whose values are being resolved.
    context: Vec<SmolStr>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Resolver<'a> {
    pub fn new(namespace: &'a TokenNamespace, config: &CompilerConfig) -> Self {
        Self {
            namespace,
            sigil: config.reference_sigil,
            deprecated_warnings: config.deprecated_reference_warnings,
            memo: FxHashMap::default(),
            reported_cycles: FxHashSet::default(),
            context: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &TokenNamespace {
        self.namespace
    }

    /// Issues reported so far.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    // ============================================================
    // Primary Resolution API
    // ============================================================

    /// Resolve a reference to a literal.
    ///
    /// Failures are also recorded in [`issues`](Self::issues), except when the
    /// same root cause was already reported.
    pub fn resolve_ref(&mut self, reference: &TokenRef) -> Result<Value, ValidationIssue> {
        let mut visited = Vec::new();
        self.follow(reference, &mut visited)
    }

    /// Resolve every literal and reference inside `expr`.
    pub fn resolve_expr(&mut self, expr: &ValueExpr) -> Result<Value, ValidationIssue> {
        let mut visited = Vec::new();
        self.evaluate(expr, &mut visited)
    }

    /// Resolve one token by id, returning `None` for unknown ids.
    pub fn resolve_token(&mut self, id: &str) -> Option<Result<Value, ValidationIssue>> {
        if let Some(result) = self.memo.get(id) {
            return Some(result.clone());
        }
        let namespace = self.namespace;
        let token = namespace.get(id)?;
        let mut visited = vec![self.visit_key(id)];
        let result = self.evaluate(&token.value, &mut visited);
        self.memo.insert(token.id.clone(), result.clone());
        Some(result)
    }

    /// Resolve every token in the namespace, in definition order.
    ///
    /// Returns the resolved value per id; `None` where resolution failed.
    pub fn resolve_tokens(&mut self) -> Vec<(SmolStr, Option<Value>)> {
        let namespace = self.namespace;
        let mut resolved = Vec::with_capacity(namespace.len());
        for token in namespace.iter() {
            self.context = vec![SmolStr::new_static("tokens"), token.id.clone()];
            self.check_category(token.id.as_str(), &token.value);
            let value = self.resolve_token(&token.id).and_then(Result::ok);
            resolved.push((token.id.clone(), value));
        }
        self.context.clear();
        tracing::debug!(
            tokens = resolved.len(),
            unresolved = resolved.iter().filter(|(_, v)| v.is_none()).count(),
            "resolved tokens"
        );
        resolved
    }

    /// Fill `resolved` on every style value of a component, its states and
    /// its parts.
    pub fn resolve_component(&mut self, component: &mut ComponentSpec) {
        self.context = vec![SmolStr::new_static("components"), component.name.clone()];
        for styles in component.all_style_maps_mut() {
            for bound in styles.values_mut() {
                self.resolve_bound(bound);
            }
        }
        self.context.clear();
    }

    /// Fill `resolved` on every node prop in a pattern tree.
    pub fn resolve_pattern(&mut self, pattern: &mut PatternSpec) {
        self.context = vec![SmolStr::new_static("patterns"), pattern.name.clone()];
        for node in &mut pattern.tree {
            node.walk_props_mut(&mut |props| {
                for bound in props.values_mut() {
                    self.resolve_bound(bound);
                }
            });
        }
        self.context.clear();
    }

    fn resolve_bound(&mut self, bound: &mut BoundValue) {
        if !bound.expr.contains_references() {
            bound.resolved = bound.expr.to_literal();
            return;
        }
        bound.resolved = self.resolve_expr(&bound.expr).ok();
    }

    // ============================================================
    // Traversal
    // ============================================================

    fn visit_key(&self, id: &str) -> SmolStr {
        SmolStr::new(format!("{}{id}", self.sigil))
    }

    fn evaluate(
        &mut self,
        expr: &ValueExpr,
        visited: &mut Vec<SmolStr>,
    ) -> Result<Value, ValidationIssue> {
        match expr {
            ValueExpr::Literal(value) => Ok(value.clone()),
            ValueExpr::Reference(reference) => self.follow(reference, visited),
            ValueExpr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                let mut first_error = None;
                for item in items {
                    match self.evaluate(item, visited) {
                        Ok(value) => values.push(value),
                        Err(issue) => {
                            first_error.get_or_insert(issue);
                        }
                    }
                }
                match first_error {
                    Some(issue) => Err(issue),
                    None => Ok(Value::List(values)),
                }
            }
            ValueExpr::Object(fields) => {
                let mut values = IndexMap::with_capacity(fields.len());
                let mut first_error = None;
                for (key, field) in fields {
                    match self.evaluate(field, visited) {
                        Ok(value) => {
                            values.insert(key.clone(), value);
                        }
                        Err(issue) => {
                            first_error.get_or_insert(issue);
                        }
                    }
                }
                match first_error {
                    Some(issue) => Err(issue),
                    None => Ok(Value::Object(values)),
                }
            }
        }
    }

    fn follow(
        &mut self,
        reference: &TokenRef,
        visited: &mut Vec<SmolStr>,
    ) -> Result<Value, ValidationIssue> {
        let id = reference.target_id();
        let key = self.visit_key(&id);
        trace!("[RESOLVE] {} depth={}", reference.raw_text, visited.len());

        if let Some(start) = visited.iter().position(|k| *k == key) {
            return Err(self.circular(reference, &visited[start..]));
        }

        let namespace = self.namespace;
        let Some(token) = namespace.get(&id) else {
            let issue = self.unresolved(reference, &id);
            self.report(issue.clone());
            return Err(issue);
        };

        if self.deprecated_warnings {
            if let Some(deprecation) = &token.deprecated {
                let mut issue = ValidationIssue::warning(
                    codes::DEPRECATED_REFERENCE,
                    format!("'{}' refers to deprecated token '{id}'", reference.raw_text),
                )
                .with_location(reference.location.clone());
                if let Some(message) = &deprecation.message {
                    issue = issue.with_suggestion(message.clone());
                }
                self.report(issue);
            }
        }

        if let Some(result) = self.memo.get(id.as_str()) {
            trace!("[RESOLVE] -> memoized {}", id);
            return result.clone();
        }

        if visited.len() >= MAX_REFERENCE_DEPTH {
            let issue = ValidationIssue::error(
                codes::UNRESOLVED_REFERENCE,
                format!(
                    "'{}' is more than {MAX_REFERENCE_DEPTH} aliases away from a value",
                    reference.raw_text
                ),
            )
            .with_location(reference.location.clone())
            .with_suggestion("point the alias at a token nearer the literal value");
            self.report(issue.clone());
            return Err(issue);
        }

        // Issues inside the target's value belong to the target.
        let owner = std::mem::replace(
            &mut self.context,
            vec![SmolStr::new_static("tokens"), token.id.clone()],
        );
        visited.push(key);
        let result = self.evaluate(&token.value, visited);
        visited.pop();
        self.context = owner;
        trace!("[RESOLVE] -> {} ok={}", id, result.is_ok());
        self.memo.insert(token.id.clone(), result.clone());
        result
    }

    // ============================================================
    // Diagnostics
    // ============================================================

    fn report(&mut self, mut issue: ValidationIssue) {
        if issue.path.is_empty() {
            issue.path = self.context.clone();
        }
        self.issues.push(issue);
    }

    /// Build the cycle issue; report it only the first time this cycle is seen.
    fn circular(&mut self, closing: &TokenRef, members: &[SmolStr]) -> ValidationIssue {
        let mut chain: Vec<&str> = members.iter().map(SmolStr::as_str).collect();
        chain.push(closing.raw_text.as_str());
        let issue = ValidationIssue::error(
            codes::CIRCULAR_REFERENCE,
            format!("circular reference: {}", chain.join(" -> ")),
        )
        .with_location(closing.location.clone());

        let mut canonical = members.to_vec();
        if let Some(smallest) = canonical
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(index, _)| index)
        {
            canonical.rotate_left(smallest);
        }
        if self.reported_cycles.insert(canonical) {
            self.report(issue.clone());
        }
        issue
    }

    fn unresolved(&self, reference: &TokenRef, id: &str) -> ValidationIssue {
        let namespace = self.namespace;
        if namespace.is_group(id) {
            let mut issue = ValidationIssue::error(
                codes::UNRESOLVED_REFERENCE,
                format!("'{}' names a token group, not a token", reference.raw_text),
            )
            .with_location(reference.location.clone());
            let members: Vec<&str> = namespace.group_members(id).take(3).collect();
            if !members.is_empty() {
                let listed: Vec<String> = members
                    .iter()
                    .map(|m| format!("'{}{m}'", self.sigil))
                    .collect();
                issue = issue.with_suggestion(format!(
                    "reference a token inside the group, e.g. {}",
                    listed.join(", ")
                ));
            }
            return issue;
        }

        let mut issue = ValidationIssue::error(
            codes::UNRESOLVED_REFERENCE,
            format!("'{}' does not name a known token", reference.raw_text),
        )
        .with_location(reference.location.clone());
        for candidate in similar_names(id, namespace.ids()) {
            issue = issue.with_suggestion(format!("did you mean '{}{candidate}'?", self.sigil));
        }
        issue
    }

    /// Warn when a token is a bare alias of a token of another category.
    fn check_category(&mut self, id: &str, value: &ValueExpr) {
        let namespace = self.namespace;
        let Some(reference) = value.as_reference() else {
            return;
        };
        let (Some(token), Some(target)) = (namespace.get(id), namespace.get(&reference.target_id()))
        else {
            return;
        };
        if token.category != target.category {
            self.report(
                ValidationIssue::warning(
                    codes::CATEGORY_MISMATCH,
                    format!(
                        "{} token '{id}' refers to {} token '{}'",
                        token.category, target.category, target.id
                    ),
                )
                .with_location(reference.location.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceLocation;
    use crate::model::{Deprecation, Token, TokenCategory};

    fn loc() -> SourceLocation {
        SourceLocation::new("tokens.json", 0, 0)
    }

    fn reference(id: &str) -> ValueExpr {
        ValueExpr::Reference(TokenRef::new(
            id.split('.').map(SmolStr::new).collect(),
            format!("${id}"),
            loc(),
        ))
    }

    fn color(hex: &str) -> ValueExpr {
        ValueExpr::Literal(Value::Color(hex.to_string()))
    }

    fn token(id: &str, category: TokenCategory, value: ValueExpr) -> Token {
        Token {
            id: SmolStr::new(id),
            path: id.split('.').map(SmolStr::new).collect(),
            category,
            description: None,
            deprecated: None,
            value,
            resolved_value: None,
            location: loc(),
        }
    }

    fn namespace(tokens: Vec<Token>) -> TokenNamespace {
        let (namespace, issues) = TokenNamespace::build([tokens]);
        assert!(issues.is_empty());
        namespace
    }

    fn codes_of(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_chained_reference_resolves_to_literal() {
        let ns = namespace(vec![
            token("color.blue.600", TokenCategory::Color, color("#2563eb")),
            token("color.primary", TokenCategory::Color, reference("color.blue.600")),
            token("color.action", TokenCategory::Color, reference("color.primary")),
        ]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        let resolved = resolver.resolve_tokens();

        assert!(resolver.issues().is_empty());
        assert!(
            resolved
                .iter()
                .all(|(_, v)| v == &Some(Value::Color("#2563eb".into())))
        );
    }

    #[test]
    fn test_cycle_reported_once() {
        let ns = namespace(vec![
            token("a", TokenCategory::Color, reference("b")),
            token("b", TokenCategory::Color, reference("a")),
            token("c", TokenCategory::Color, reference("a")),
        ]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        let resolved = resolver.resolve_tokens();

        assert!(resolved.iter().all(|(_, v)| v.is_none()));
        let issues = resolver.into_issues();
        assert_eq!(codes_of(&issues), vec![codes::CIRCULAR_REFERENCE]);
        assert_eq!(issues[0].message, "circular reference: $a -> $b -> $a");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let ns = namespace(vec![token("a", TokenCategory::Color, reference("a"))]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        resolver.resolve_tokens();
        let issues = resolver.into_issues();
        assert_eq!(codes_of(&issues), vec![codes::CIRCULAR_REFERENCE]);
        assert_eq!(issues[0].message, "circular reference: $a -> $a");
    }

    #[test]
    fn test_unresolved_with_suggestion() {
        let ns = namespace(vec![
            token("color.primary", TokenCategory::Color, color("#000")),
            token("color.link", TokenCategory::Color, reference("color.primry")),
        ]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        resolver.resolve_tokens();
        let issues = resolver.into_issues();

        assert_eq!(codes_of(&issues), vec![codes::UNRESOLVED_REFERENCE]);
        assert_eq!(issues[0].path_string(), "tokens.color.link");
        assert_eq!(issues[0].suggestions[0], "did you mean '$color.primary'?");
    }

    #[test]
    fn test_broken_link_is_reported_on_its_own_token() {
        let ns = namespace(vec![
            token("color.c", TokenCategory::Color, reference("color.b")),
            token("color.b", TokenCategory::Color, reference("color.missing")),
        ]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        let resolved = resolver.resolve_tokens();
        let issues = resolver.into_issues();

        assert!(resolved.iter().all(|(_, v)| v.is_none()));
        assert_eq!(codes_of(&issues), vec![codes::UNRESOLVED_REFERENCE]);
        assert_eq!(issues[0].path_string(), "tokens.color.b");
        assert!(issues[0].message.contains("$color.missing"));
    }

    #[test]
    fn test_overlong_alias_chain_is_an_issue() {
        let links = 500;
        let mut tokens: Vec<Token> = (0..links)
            .map(|i| {
                let next = reference(&format!("n.t{}", i + 1));
                token(&format!("n.t{i}"), TokenCategory::Color, next)
            })
            .collect();
        tokens.push(token(&format!("n.t{links}"), TokenCategory::Color, color("#fff")));
        let ns = namespace(tokens);

        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        let resolved = resolver.resolve_tokens();
        let issues = resolver.into_issues();

        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| i.code == codes::UNRESOLVED_REFERENCE));
        assert!(issues[0].message.contains("aliases away"));
        assert_eq!(resolved[0].1, None);
        // The tail of the chain is short enough to resolve.
        assert_eq!(resolved[links - 1].1, Some(Value::Color("#fff".into())));

        let mut fresh = Resolver::new(&ns, &CompilerConfig::default());
        let shallow = fresh.resolve_token(&format!("n.t{}", links - 10));
        assert_eq!(shallow.unwrap().unwrap(), Value::Color("#fff".into()));
    }

    #[test]
    fn test_group_reference_gets_distinct_message() {
        let ns = namespace(vec![
            token("color.blue.500", TokenCategory::Color, color("#00f")),
            token("color.link", TokenCategory::Color, reference("color.blue")),
        ]);
        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        resolver.resolve_tokens();
        let issues = resolver.into_issues();

        assert!(issues[0].message.contains("names a token group"));
        assert!(issues[0].suggestions[0].contains("'$color.blue.500'"));
    }

    #[test]
    fn test_deprecated_and_category_warnings() {
        let mut old = token("size.old", TokenCategory::Dimension, ValueExpr::Literal(Value::Number(4.0)));
        old.deprecated = Some(Deprecation {
            message: Some("use size.sm".into()),
        });
        let ns = namespace(vec![
            old,
            token("color.odd", TokenCategory::Color, reference("size.old")),
        ]);

        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        resolver.resolve_tokens();
        let issues = resolver.into_issues();
        assert_eq!(
            codes_of(&issues),
            vec![codes::CATEGORY_MISMATCH, codes::DEPRECATED_REFERENCE]
        );
        assert!(issues.iter().all(|i| !i.is_error()));

        let quiet = CompilerConfig::default().with_deprecated_reference_warnings(false);
        let mut resolver = Resolver::new(&ns, &quiet);
        resolver.resolve_tokens();
        assert_eq!(codes_of(resolver.issues()), vec![codes::CATEGORY_MISMATCH]);
    }

    #[test]
    fn test_composite_values_resolve_fieldwise() {
        let mut fields = IndexMap::new();
        fields.insert(SmolStr::new("color"), reference("color.shadow"));
        fields.insert(SmolStr::new("blur"), ValueExpr::Literal(Value::Number(4.0)));
        let ns = namespace(vec![
            token("color.shadow", TokenCategory::Color, color("#0003")),
            token("shadow.sm", TokenCategory::Shadow, ValueExpr::Object(fields)),
        ]);

        let mut resolver = Resolver::new(&ns, &CompilerConfig::default());
        let shadow = resolver.resolve_token("shadow.sm").unwrap().unwrap();
        let Value::Object(resolved) = shadow else {
            panic!("expected an object");
        };
        assert_eq!(resolved.get("color"), Some(&Value::Color("#0003".into())));
    }
}
