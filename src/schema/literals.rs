//! Per-category checks and normalization of token literals.
//!
//! References are left untouched here; only literal parts of a value are
//! checked. Composite categories (typography, shadow) recurse into their
//! fields with the field's own category.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::diagnostics::codes;
use crate::model::{Dimension, Duration, TokenCategory, Value, ValueExpr};

const DIMENSION_UNITS: &[&str] = &["px", "rem", "em", "%", "vh", "vw", "pt", "dp", "sp"];

const COLOR_KEYWORDS: &[&str] = &["transparent", "currentColor"];

const COLOR_FUNCTIONS: &[&str] = &["rgb(", "rgba(", "hsl(", "hsla("];

const FONT_WEIGHT_KEYWORDS: &[&str] = &[
    "thin",
    "extra-light",
    "light",
    "normal",
    "regular",
    "medium",
    "semi-bold",
    "bold",
    "extra-bold",
    "black",
];

const EASING_KEYWORDS: &[&str] = &["linear", "ease", "ease-in", "ease-out", "ease-in-out"];

const TYPOGRAPHY_FIELDS: &[&str] = &[
    "fontFamily",
    "fontSize",
    "fontWeight",
    "lineHeight",
    "letterSpacing",
    "textTransform",
];

const SHADOW_FIELDS: &[&str] = &["offsetX", "offsetY", "blur", "spread", "color", "inset"];

/// A rejected literal, relative to the value being checked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LiteralError {
    pub code: &'static str,
    pub message: String,
    /// Field path below the checked value (empty for the value itself).
    pub path: Vec<SmolStr>,
}

impl LiteralError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Vec::new(),
        }
    }

    fn under(mut self, segment: impl Into<SmolStr>) -> Self {
        self.path.insert(0, segment.into());
        self
    }
}

/// Check a token value for `category` and convert recognised literals into
/// their typed form (colors, dimensions, durations...).
pub(crate) fn normalize(category: TokenCategory, expr: ValueExpr) -> (ValueExpr, Vec<LiteralError>) {
    let mut errors = Vec::new();
    let out = normalize_into(category, expr, &mut errors);
    (out, errors)
}

fn normalize_into(
    category: TokenCategory,
    expr: ValueExpr,
    errors: &mut Vec<LiteralError>,
) -> ValueExpr {
    let value = match expr {
        ValueExpr::Reference(_) => return expr,
        ValueExpr::Literal(value) => value,
        ValueExpr::List(items) => return normalize_list(category, items, errors),
        ValueExpr::Object(fields) => return normalize_object(category, fields, errors),
    };

    let result = match category {
        TokenCategory::Color => color(&value),
        TokenCategory::Dimension => dimension(&value),
        TokenCategory::Duration => duration(&value),
        TokenCategory::FontFamily => font_family(&value),
        TokenCategory::FontWeight => font_weight(&value),
        TokenCategory::Easing => easing(&value),
        TokenCategory::Number => number(&value),
        TokenCategory::Typography => Err(LiteralError::new(
            codes::TYPE_MISMATCH,
            format!("typography value must be a map of font properties, found '{value}'"),
        )),
        TokenCategory::Shadow => Err(LiteralError::new(
            codes::TYPE_MISMATCH,
            format!("shadow value must be a layer map or a list of layers, found '{value}'"),
        )),
    };
    match result {
        Ok(normalized) => ValueExpr::Literal(normalized),
        Err(e) => {
            errors.push(e);
            ValueExpr::Literal(value)
        }
    }
}

fn normalize_list(
    category: TokenCategory,
    items: Vec<ValueExpr>,
    errors: &mut Vec<LiteralError>,
) -> ValueExpr {
    match category {
        TokenCategory::Shadow => ValueExpr::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    let mut nested = Vec::new();
                    let out = normalize_into(category, item, &mut nested);
                    errors.extend(nested.into_iter().map(|e| e.under(i.to_string())));
                    out
                })
                .collect(),
        ),
        TokenCategory::FontFamily => {
            for (i, item) in items.iter().enumerate() {
                if let ValueExpr::Literal(v) = item {
                    if !matches!(v, Value::String(_)) {
                        errors.push(
                            LiteralError::new(
                                codes::TYPE_MISMATCH,
                                format!("font family entries must be strings, found '{v}'"),
                            )
                            .under(i.to_string()),
                        );
                    }
                }
            }
            ValueExpr::List(items)
        }
        TokenCategory::Easing => {
            let numbers = items
                .iter()
                .filter(|i| matches!(i, ValueExpr::Literal(Value::Number(_))))
                .count();
            let refs = items.iter().filter(|i| i.as_reference().is_some()).count();
            if items.len() != 4 || numbers + refs != 4 {
                errors.push(LiteralError::new(
                    codes::TYPE_MISMATCH,
                    "cubic-bezier easing must be a list of exactly 4 numbers",
                ));
            }
            ValueExpr::List(items)
        }
        _ => {
            errors.push(LiteralError::new(
                codes::TYPE_MISMATCH,
                format!("a {category} value cannot be a list"),
            ));
            ValueExpr::List(items)
        }
    }
}

fn normalize_object(
    category: TokenCategory,
    fields: IndexMap<SmolStr, ValueExpr>,
    errors: &mut Vec<LiteralError>,
) -> ValueExpr {
    let (allowed, required): (&[&str], &[&str]) = match category {
        TokenCategory::Typography => (TYPOGRAPHY_FIELDS, &["fontFamily", "fontSize"]),
        TokenCategory::Shadow => (SHADOW_FIELDS, &["offsetX", "offsetY", "color"]),
        _ => {
            errors.push(LiteralError::new(
                codes::TYPE_MISMATCH,
                format!("a {category} value cannot be a map"),
            ));
            return ValueExpr::Object(fields);
        }
    };

    for name in required {
        if !fields.contains_key(*name) {
            errors.push(
                LiteralError::new(
                    codes::MISSING_REQUIRED_FIELD,
                    format!("{category} value is missing '{name}'"),
                )
                .under(*name),
            );
        }
    }

    let out = fields
        .into_iter()
        .map(|(key, value)| {
            if !allowed.contains(&key.as_str()) {
                errors.push(
                    LiteralError::new(
                        codes::UNKNOWN_FIELD,
                        format!("'{key}' is not a {category} property"),
                    )
                    .under(key.clone()),
                );
                return (key, value);
            }
            let mut nested = Vec::new();
            let value = normalize_field(&key, value, &mut nested);
            errors.extend(nested.into_iter().map(|e| e.under(key.clone())));
            (key, value)
        })
        .collect();
    ValueExpr::Object(out)
}

fn normalize_field(
    key: &str,
    value: ValueExpr,
    errors: &mut Vec<LiteralError>,
) -> ValueExpr {
    let category = match key {
        "fontFamily" => TokenCategory::FontFamily,
        "fontWeight" => TokenCategory::FontWeight,
        "color" => TokenCategory::Color,
        // Line height is either unitless or a dimension.
        "lineHeight" if matches!(value, ValueExpr::Literal(Value::Number(_))) => return value,
        "inset" => {
            if !matches!(value, ValueExpr::Literal(Value::Bool(_)) | ValueExpr::Reference(_)) {
                errors.push(LiteralError::new(codes::TYPE_MISMATCH, "'inset' must be a boolean"));
            }
            return value;
        }
        "textTransform" => return value,
        _ => TokenCategory::Dimension,
    };
    normalize_into(category, value, errors)
}

// ============================================================================
// SCALAR CATEGORIES
// ============================================================================

fn expect_string<'v>(value: &'v Value, category: &str) -> Result<&'v str, LiteralError> {
    match value {
        Value::String(s) | Value::Color(s) => Ok(s),
        other => Err(LiteralError::new(
            codes::TYPE_MISMATCH,
            format!("{category} must be a string, found '{other}'"),
        )),
    }
}

fn color(value: &Value) -> Result<Value, LiteralError> {
    let text = expect_string(value, "color")?;
    if is_color(text) {
        Ok(Value::Color(text.to_string()))
    } else {
        Err(LiteralError::new(
            codes::PATTERN_MISMATCH,
            format!("'{text}' is not a valid color (expected #hex, rgb(), rgba(), hsl() or hsla())"),
        ))
    }
}

pub fn is_color(text: &str) -> bool {
    if let Some(hex) = text.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if COLOR_KEYWORDS.contains(&text) {
        return true;
    }
    COLOR_FUNCTIONS
        .iter()
        .any(|f| text.starts_with(f) && text.ends_with(')'))
}

fn dimension(value: &Value) -> Result<Value, LiteralError> {
    match value {
        Value::Dimension(_) => Ok(value.clone()),
        Value::Number(n) if *n == 0.0 => Ok(Value::Dimension(Dimension {
            value: 0.0,
            unit: SmolStr::new_static("px"),
        })),
        Value::Number(n) => Err(LiteralError::new(
            codes::PATTERN_MISMATCH,
            format!("dimension {n} needs a unit (one of {})", DIMENSION_UNITS.join(", ")),
        )),
        _ => {
            let text = expect_string(value, "dimension")?;
            parse_dimension(text).map(Value::Dimension).ok_or_else(|| {
                LiteralError::new(
                    codes::PATTERN_MISMATCH,
                    format!(
                        "'{text}' is not a valid dimension (expected a number followed by one of {})",
                        DIMENSION_UNITS.join(", ")
                    ),
                )
            })
        }
    }
}

/// Parse `16px`, `1.5rem`, `-2px`, `50%`.
pub fn parse_dimension(text: &str) -> Option<Dimension> {
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.parse().ok()?;
    if unit.is_empty() {
        return (value == 0.0).then(|| Dimension {
            value,
            unit: SmolStr::new_static("px"),
        });
    }
    DIMENSION_UNITS.contains(&unit).then(|| Dimension {
        value,
        unit: SmolStr::new(unit),
    })
}

fn duration(value: &Value) -> Result<Value, LiteralError> {
    match value {
        Value::Duration(_) => Ok(value.clone()),
        Value::Number(n) if *n >= 0.0 => Ok(Value::Duration(Duration { milliseconds: *n })),
        Value::Number(n) => Err(LiteralError::new(
            codes::OUT_OF_RANGE,
            format!("duration must not be negative, found {n}"),
        )),
        _ => {
            let text = expect_string(value, "duration")?;
            parse_duration(text).map(Value::Duration).ok_or_else(|| {
                LiteralError::new(
                    codes::PATTERN_MISMATCH,
                    format!("'{text}' is not a valid duration (expected e.g. '200ms' or '0.2s')"),
                )
            })
        }
    }
}

pub fn parse_duration(text: &str) -> Option<Duration> {
    let (number, scale) = if let Some(ms) = text.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(s) = text.strip_suffix('s') {
        (s, 1000.0)
    } else {
        return None;
    };
    let value: f64 = number.trim().parse().ok()?;
    (value >= 0.0).then(|| Duration {
        milliseconds: value * scale,
    })
}

fn font_family(value: &Value) -> Result<Value, LiteralError> {
    let text = expect_string(value, "font family")?;
    let families: Vec<Value> = text
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .map(|f| Value::String(f.to_string()))
        .collect();
    if families.is_empty() {
        return Err(LiteralError::new(
            codes::PATTERN_MISMATCH,
            "font family must name at least one family",
        ));
    }
    Ok(Value::List(families))
}

fn font_weight(value: &Value) -> Result<Value, LiteralError> {
    match value {
        Value::Number(n) if (1.0..=1000.0).contains(n) => Ok(value.clone()),
        Value::Number(n) => Err(LiteralError::new(
            codes::OUT_OF_RANGE,
            format!("font weight must be between 1 and 1000, found {n}"),
        )),
        _ => {
            let text = expect_string(value, "font weight")?;
            if FONT_WEIGHT_KEYWORDS.contains(&text) {
                Ok(value.clone())
            } else {
                Err(LiteralError::new(
                    codes::INVALID_ENUM_VALUE,
                    format!(
                        "'{text}' is not a font weight (expected 1-1000 or one of {})",
                        FONT_WEIGHT_KEYWORDS.join(", ")
                    ),
                ))
            }
        }
    }
}

fn easing(value: &Value) -> Result<Value, LiteralError> {
    let text = expect_string(value, "easing")?;
    if EASING_KEYWORDS.contains(&text) {
        return Ok(value.clone());
    }
    parse_cubic_bezier(text)
        .map(|points| Value::List(points.into_iter().map(Value::Number).collect()))
        .ok_or_else(|| {
            LiteralError::new(
                codes::PATTERN_MISMATCH,
                format!(
                    "'{text}' is not a valid easing (expected cubic-bezier(x1, y1, x2, y2) or one of {})",
                    EASING_KEYWORDS.join(", ")
                ),
            )
        })
}

fn parse_cubic_bezier(text: &str) -> Option<Vec<f64>> {
    let inner = text.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
    let points = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    (points.len() == 4).then_some(points)
}

fn number(value: &Value) -> Result<Value, LiteralError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        other => Err(LiteralError::new(
            codes::TYPE_MISMATCH,
            format!("expected a number, found '{other}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lit(value: Value) -> ValueExpr {
        ValueExpr::Literal(value)
    }

    fn text(s: &str) -> ValueExpr {
        lit(Value::String(s.to_string()))
    }

    #[rstest]
    #[case("#2563eb", true)]
    #[case("#fff", true)]
    #[case("#ffff", true)]
    #[case("#2563eb80", true)]
    #[case("rgba(0, 0, 0, 0.5)", true)]
    #[case("hsl(210, 50%, 40%)", true)]
    #[case("transparent", true)]
    #[case("#12345", false)]
    #[case("blue", false)]
    #[case("#gggggg", false)]
    fn test_is_color(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(is_color(input), valid);
    }

    #[rstest]
    #[case("16px", 16.0, "px")]
    #[case("1.5rem", 1.5, "rem")]
    #[case("-2px", -2.0, "px")]
    #[case("50%", 50.0, "%")]
    #[case("0", 0.0, "px")]
    fn test_parse_dimension(#[case] input: &str, #[case] value: f64, #[case] unit: &str) {
        let d = parse_dimension(input).unwrap();
        assert_eq!(d.value, value);
        assert_eq!(d.unit, unit);
    }

    #[rstest]
    #[case("16")]
    #[case("16furlongs")]
    #[case("px")]
    fn test_parse_dimension_rejects(#[case] input: &str) {
        assert!(parse_dimension(input).is_none());
    }

    #[test]
    fn test_duration_normalizes_to_milliseconds() {
        assert_eq!(parse_duration("200ms").map(|d| d.milliseconds), Some(200.0));
        assert_eq!(parse_duration("0.2s").map(|d| d.milliseconds), Some(200.0));
        assert!(parse_duration("fast").is_none());

        let (out, errors) = normalize(TokenCategory::Duration, lit(Value::Number(150.0)));
        assert!(errors.is_empty());
        assert_eq!(out, lit(Value::Duration(Duration { milliseconds: 150.0 })));
    }

    #[test]
    fn test_font_family_split_into_list() {
        let (out, errors) = normalize(TokenCategory::FontFamily, text("Inter, 'Helvetica Neue', sans-serif"));
        assert!(errors.is_empty());
        assert_eq!(
            out,
            lit(Value::List(vec![
                Value::String("Inter".into()),
                Value::String("Helvetica Neue".into()),
                Value::String("sans-serif".into()),
            ]))
        );
    }

    #[rstest]
    #[case(Value::Number(400.0), None)]
    #[case(Value::String("bold".into()), None)]
    #[case(Value::Number(1200.0), Some(codes::OUT_OF_RANGE))]
    #[case(Value::String("heavy-ish".into()), Some(codes::INVALID_ENUM_VALUE))]
    fn test_font_weight(#[case] value: Value, #[case] code: Option<&str>) {
        let (_, errors) = normalize(TokenCategory::FontWeight, lit(value));
        assert_eq!(errors.first().map(|e| e.code), code);
    }

    #[test]
    fn test_easing_forms() {
        let (out, errors) = normalize(TokenCategory::Easing, text("cubic-bezier(0.4, 0, 0.2, 1)"));
        assert!(errors.is_empty());
        assert_eq!(
            out,
            lit(Value::List(vec![
                Value::Number(0.4),
                Value::Number(0.0),
                Value::Number(0.2),
                Value::Number(1.0),
            ]))
        );

        let (_, errors) = normalize(TokenCategory::Easing, text("ease-in-out"));
        assert!(errors.is_empty());

        let (_, errors) = normalize(
            TokenCategory::Easing,
            ValueExpr::List(vec![lit(Value::Number(0.4)), lit(Value::Number(0.0))]),
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_typography_reports_every_problem() {
        let mut fields = IndexMap::new();
        fields.insert(SmolStr::new("fontSize"), text("16parsecs"));
        fields.insert(SmolStr::new("fontWeight"), lit(Value::Number(5000.0)));
        fields.insert(SmolStr::new("lineHeight"), lit(Value::Number(1.5)));

        let (_, errors) = normalize(TokenCategory::Typography, ValueExpr::Object(fields));
        let codes_found: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes_found,
            vec![codes::MISSING_REQUIRED_FIELD, codes::PATTERN_MISMATCH, codes::OUT_OF_RANGE]
        );
        assert_eq!(errors[1].path, vec![SmolStr::new("fontSize")]);
    }

    #[test]
    fn test_shadow_layers() {
        let mut layer = IndexMap::new();
        layer.insert(SmolStr::new("offsetX"), text("0"));
        layer.insert(SmolStr::new("offsetY"), text("2px"));
        layer.insert(SmolStr::new("color"), text("rgba(0, 0, 0, 0.2)"));

        let mut broken = layer.clone();
        broken.shift_remove("color");

        let (out, errors) = normalize(
            TokenCategory::Shadow,
            ValueExpr::List(vec![ValueExpr::Object(layer), ValueExpr::Object(broken)]),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec![SmolStr::new("1"), SmolStr::new("color")]);
        let ValueExpr::List(layers) = out else {
            panic!("expected list");
        };
        let ValueExpr::Object(first) = &layers[0] else {
            panic!("expected layer");
        };
        assert_eq!(
            first.get("offsetX"),
            Some(&lit(Value::Dimension(Dimension {
                value: 0.0,
                unit: "px".into()
            })))
        );
    }
}
