//! Design tokens.

use std::fmt;

use smol_str::SmolStr;

use super::value::{Value, ValueExpr};
use crate::base::SourceLocation;

/// Category of a design token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "camelCase"))]
pub enum TokenCategory {
    Color,
    Dimension,
    FontFamily,
    FontWeight,
    Typography,
    Shadow,
    Duration,
    Easing,
    Number,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 9] = [
        Self::Color,
        Self::Dimension,
        Self::FontFamily,
        Self::FontWeight,
        Self::Typography,
        Self::Shadow,
        Self::Duration,
        Self::Easing,
        Self::Number,
    ];

    /// Name used in documents (`"type": "fontFamily"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Dimension => "dimension",
            Self::FontFamily => "fontFamily",
            Self::FontWeight => "fontWeight",
            Self::Typography => "typography",
            Self::Shadow => "shadow",
            Self::Duration => "duration",
            Self::Easing => "easing",
            Self::Number => "number",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Category implied by a conventional top-level group name.
    pub fn infer_from_group(name: &str) -> Option<Self> {
        match name {
            "color" | "colors" => Some(Self::Color),
            "dimension" | "spacing" | "space" | "size" | "sizing" | "radius" | "radii"
            | "borderWidth" => Some(Self::Dimension),
            "fontFamily" | "fontFamilies" => Some(Self::FontFamily),
            "fontWeight" | "fontWeights" => Some(Self::FontWeight),
            "typography" => Some(Self::Typography),
            "shadow" | "shadows" | "elevation" => Some(Self::Shadow),
            "duration" | "durations" => Some(Self::Duration),
            "easing" | "easings" => Some(Self::Easing),
            "number" | "opacity" | "zIndex" | "lineHeight" => Some(Self::Number),
            _ => None,
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deprecation marker, optionally with a migration hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Deprecation {
    pub message: Option<String>,
}

/// A named, typed design value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Token {
    /// Dot-joined path, e.g. `color.primitive.blue.600`.
    pub id: SmolStr,
    pub path: Vec<SmolStr>,
    pub category: TokenCategory,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    /// The value as written; never rewritten by resolution.
    pub value: ValueExpr,
    pub resolved_value: Option<Value>,
    pub location: SourceLocation,
}

impl Token {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Name of the token within its group (last path segment).
    pub fn name(&self) -> &str {
        self.path.last().map(SmolStr::as_str).unwrap_or("")
    }
}
