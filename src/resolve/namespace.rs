//! The merged token namespace.
//!
//! Every token document in a batch is folded into one namespace keyed by
//! token id. Once merged there is no notion of which file a token came from,
//! so a reference in one document resolves against tokens in any other.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::constants::PATH_SEPARATOR;
use crate::diagnostics::{ValidationIssue, codes};
use crate::model::{Token, Value};

/// All tokens of a compile, in first-definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenNamespace {
    tokens: IndexMap<SmolStr, Token>,
    /// Every proper prefix of every token id (`color`, `color.primitive`, ...).
    groups: FxHashSet<SmolStr>,
}

impl TokenNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge token lists, reporting ids defined more than once.
    ///
    /// The first definition wins; later ones are dropped.
    pub fn build<I>(sources: I) -> (Self, Vec<ValidationIssue>)
    where
        I: IntoIterator<Item = Vec<Token>>,
    {
        let mut namespace = Self::new();
        let mut issues = Vec::new();
        for token in sources.into_iter().flatten() {
            if let Err(issue) = namespace.insert(token) {
                issues.push(issue);
            }
        }
        (namespace, issues)
    }

    /// Add a token unless its id is taken.
    pub fn insert(&mut self, token: Token) -> Result<(), ValidationIssue> {
        if let Some(existing) = self.tokens.get(&token.id) {
            return Err(ValidationIssue::error(
                codes::DUPLICATE_DEFINITION,
                format!("token '{}' is already defined at {}", token.id, existing.location),
            )
            .with_path(["tokens", token.id.as_str()])
            .with_location(token.location.clone()));
        }

        let mut prefix = String::new();
        for segment in token.path.iter().take(token.path.len().saturating_sub(1)) {
            if !prefix.is_empty() {
                prefix.push(PATH_SEPARATOR);
            }
            prefix.push_str(segment);
            self.groups.insert(SmolStr::new(&prefix));
        }
        self.tokens.insert(token.id.clone(), token);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tokens.contains_key(id)
    }

    /// Whether `id` names a group of tokens rather than a token.
    pub fn is_group(&self, id: &str) -> bool {
        self.groups.contains(id)
    }

    /// Token ids directly or indirectly inside the group `id`.
    pub fn group_members(&self, id: &str) -> impl Iterator<Item = &str> {
        let prefix = format!("{id}{PATH_SEPARATOR}");
        self.tokens
            .keys()
            .map(SmolStr::as_str)
            .filter(move |candidate| candidate.starts_with(&prefix))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(SmolStr::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Store resolution results on the tokens they belong to.
    pub fn apply_resolved<I>(&mut self, resolved: I)
    where
        I: IntoIterator<Item = (SmolStr, Option<Value>)>,
    {
        for (id, value) in resolved {
            if let Some(token) = self.tokens.get_mut(&id) {
                token.resolved_value = value;
            }
        }
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into_values().collect()
    }
}
