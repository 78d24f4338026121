//! Token values: literals, references, and composites of both.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::SourceLocation;
use crate::base::constants::PATH_SEPARATOR;

/// A length with its unit, e.g. `16px` or `1.5rem`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Dimension {
    pub value: f64,
    pub unit: SmolStr,
}

/// A time span, normalized to milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Duration {
    pub milliseconds: f64,
}

/// A fully resolved literal value.
///
/// There is deliberately no reference variant: anything of this type is safe
/// to hand to a generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(untagged))]
pub enum Value {
    Color(String),
    Dimension(Dimension),
    Duration(Duration),
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Object(IndexMap<SmolStr, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Color(s) | Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Color(s) | Value::String(s) => f.write_str(s),
            Value::Dimension(d) => write!(f, "{}{}", d.value, d.unit),
            Value::Duration(d) => write!(f, "{}ms", d.milliseconds),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Symbolic pointer to another token, e.g. `$color.primitive.blue.600`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct TokenRef {
    pub path: Vec<SmolStr>,
    /// Reference text as written, including the sigil.
    pub raw_text: SmolStr,
    pub location: SourceLocation,
}

impl TokenRef {
    pub fn new(path: Vec<SmolStr>, raw_text: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            path,
            raw_text: raw_text.into(),
            location,
        }
    }

    /// Id of the referenced token (`color.primitive.blue.600`).
    pub fn target_id(&self) -> String {
        join_path(&self.path)
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

/// A value as written: literals, references, or composites mixing both.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(untagged))]
pub enum ValueExpr {
    Literal(Value),
    Reference(TokenRef),
    List(Vec<ValueExpr>),
    Object(IndexMap<SmolStr, ValueExpr>),
}

impl ValueExpr {
    pub fn as_reference(&self) -> Option<&TokenRef> {
        match self {
            ValueExpr::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Every reference inside this expression, depth-first.
    pub fn references(&self) -> Vec<&TokenRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a TokenRef>) {
        match self {
            ValueExpr::Literal(_) => {}
            ValueExpr::Reference(r) => out.push(r),
            ValueExpr::List(items) => items.iter().for_each(|i| i.collect_references(out)),
            ValueExpr::Object(fields) => fields.values().for_each(|v| v.collect_references(out)),
        }
    }

    pub fn contains_references(&self) -> bool {
        match self {
            ValueExpr::Literal(_) => false,
            ValueExpr::Reference(_) => true,
            ValueExpr::List(items) => items.iter().any(ValueExpr::contains_references),
            ValueExpr::Object(fields) => fields.values().any(ValueExpr::contains_references),
        }
    }

    /// Convert to a literal when no references remain.
    pub fn to_literal(&self) -> Option<Value> {
        match self {
            ValueExpr::Literal(v) => Some(v.clone()),
            ValueExpr::Reference(_) => None,
            ValueExpr::List(items) => items
                .iter()
                .map(ValueExpr::to_literal)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            ValueExpr::Object(fields) => fields
                .iter()
                .map(|(k, v)| v.to_literal().map(|v| (k.clone(), v)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(Value::Object),
        }
    }
}

/// Join path segments with the reference separator.
pub fn join_path(path: &[SmolStr]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(PATH_SEPARATOR);
        }
        out.push_str(segment);
    }
    out
}

/// Why a string that starts with the sigil is not a valid reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSyntaxError {
    pub message: String,
}

/// Classify a string value.
///
/// - `Ok(None)`: not a reference (no leading sigil, or an escaped `$$...`)
/// - `Ok(Some(path))`: a well-formed reference
/// - `Err(_)`: starts with the sigil but the path is malformed
pub fn parse_reference_path(
    text: &str,
    sigil: char,
) -> Result<Option<Vec<SmolStr>>, ReferenceSyntaxError> {
    let Some(rest) = text.strip_prefix(sigil) else {
        return Ok(None);
    };
    if rest.starts_with(sigil) {
        return Ok(None);
    }

    let error = |message: String| ReferenceSyntaxError { message };

    if rest.is_empty() {
        return Err(error(format!("'{text}' has no path after '{sigil}'")));
    }

    let mut segments = Vec::new();
    for segment in rest.split(PATH_SEPARATOR) {
        if segment.is_empty() {
            return Err(error(format!("'{text}' contains an empty path segment")));
        }
        if let Some(bad) = segment.chars().find(|c| !is_segment_char(*c)) {
            return Err(error(format!(
                "'{text}' contains invalid character '{bad}' in segment '{segment}'"
            )));
        }
        segments.push(SmolStr::new(segment));
    }
    Ok(Some(segments))
}

/// Characters allowed in a token path segment.
pub fn is_segment_char(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

/// Strip the escape from `$$literal` strings.
pub fn unescape_literal(text: &str, sigil: char) -> &str {
    match text.strip_prefix(sigil) {
        Some(rest) if rest.starts_with(sigil) => rest,
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("$color.primitive.blue.600", &["color", "primitive", "blue", "600"])]
    #[case("$space-2", &["space-2"])]
    #[case("$font.family_base", &["font", "family_base"])]
    fn test_parse_reference_path(#[case] input: &str, #[case] expected: &[&str]) {
        let path = parse_reference_path(input, '$').unwrap().unwrap();
        assert_eq!(path, expected.iter().map(|s| SmolStr::new(s)).collect::<Vec<_>>());
    }

    #[rstest]
    #[case("#2563eb")]
    #[case("16px")]
    #[case("$$literal")]
    fn test_non_references(#[case] input: &str) {
        assert_eq!(parse_reference_path(input, '$'), Ok(None));
    }

    #[rstest]
    #[case("$")]
    #[case("$color..blue")]
    #[case("$color.blue.")]
    #[case("$color blue")]
    fn test_malformed_references(#[case] input: &str) {
        assert!(parse_reference_path(input, '$').is_err());
    }

    #[test]
    fn test_unescape_literal() {
        assert_eq!(unescape_literal("$$5.00", '$'), "$5.00");
        assert_eq!(unescape_literal("plain", '$'), "plain");
    }

    #[test]
    fn test_to_literal_requires_no_references() {
        let loc = SourceLocation::file_start("t.json");
        let mut fields = IndexMap::new();
        fields.insert(SmolStr::new("a"), ValueExpr::Literal(Value::Number(1.0)));
        let literal = ValueExpr::Object(fields.clone());
        assert!(literal.to_literal().is_some());

        fields.insert(
            SmolStr::new("b"),
            ValueExpr::Reference(TokenRef::new(vec!["x".into()], "$x", loc)),
        );
        let mixed = ValueExpr::Object(fields);
        assert!(mixed.contains_references());
        assert!(mixed.to_literal().is_none());
        assert_eq!(mixed.references().len(), 1);
    }
}
