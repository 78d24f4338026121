use indexmap::IndexMap;

use crate::model::{Token, TokenCategory};

/// Tokens grouped by category, each group in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(transparent))]
pub struct TokenCollections {
    by_category: IndexMap<TokenCategory, Vec<Token>>,
}

impl TokenCollections {
    /// Group tokens; categories appear in [`TokenCategory::ALL`] order.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut by_category: IndexMap<TokenCategory, Vec<Token>> = TokenCategory::ALL
            .into_iter()
            .map(|category| (category, Vec::new()))
            .collect();
        for token in tokens {
            by_category.entry(token.category).or_default().push(token);
        }
        by_category.retain(|_, tokens| !tokens.is_empty());
        Self { by_category }
    }

    pub fn category(&self, category: TokenCategory) -> &[Token] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = (TokenCategory, &[Token])> {
        self.by_category.iter().map(|(c, t)| (*c, t.as_slice()))
    }

    pub fn get(&self, id: &str) -> Option<&Token> {
        self.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.by_category.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceLocation;
    use crate::model::{Value, ValueExpr};
    use smol_str::SmolStr;

    fn token(id: &str, category: TokenCategory) -> Token {
        Token {
            id: SmolStr::new(id),
            path: id.split('.').map(SmolStr::new).collect(),
            category,
            description: None,
            deprecated: None,
            value: ValueExpr::Literal(Value::Number(0.0)),
            resolved_value: None,
            location: SourceLocation::new("t.json", 0, 0),
        }
    }

    #[test]
    fn test_grouped_in_category_order() {
        let collections = TokenCollections::from_tokens(vec![
            token("spacing.sm", TokenCategory::Dimension),
            token("color.red", TokenCategory::Color),
            token("spacing.md", TokenCategory::Dimension),
        ]);

        let groups: Vec<_> = collections
            .categories()
            .map(|(c, tokens)| (c, tokens.len()))
            .collect();
        assert_eq!(
            groups,
            vec![(TokenCategory::Color, 1), (TokenCategory::Dimension, 2)]
        );
        assert_eq!(collections.category(TokenCategory::Dimension)[1].id, "spacing.md");
        assert!(collections.category(TokenCategory::Shadow).is_empty());
        assert_eq!(collections.len(), 3);
    }
}
