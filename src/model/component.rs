//! Component specifications.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::value::{Value, ValueExpr};
use crate::base::SourceLocation;

/// A value that may contain token references, plus its resolution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct BoundValue {
    pub expr: ValueExpr,
    pub resolved: Option<Value>,
    pub location: SourceLocation,
}

impl BoundValue {
    pub fn new(expr: ValueExpr, location: SourceLocation) -> Self {
        let resolved = expr.to_literal();
        Self {
            expr,
            resolved,
            location,
        }
    }
}

/// Style property name → value. Nested blocks (`"&:hover": {...}`) are
/// object expressions.
pub type StyleMap = IndexMap<SmolStr, BoundValue>;

/// Type of a component prop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(tag = "kind", rename_all = "camelCase"))]
pub enum PropType {
    String,
    Number,
    Boolean,
    Enum { values: Vec<SmolStr> },
    Union { types: Vec<PropType> },
    Object { fields: Vec<PropDefinition> },
    Array { items: Box<PropType> },
    Slot,
    Ref,
    Callback { params: Vec<SmolStr> },
    ComponentRef { component: Option<SmolStr> },
}

impl PropType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum { .. } => "enum",
            Self::Union { .. } => "union",
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
            Self::Slot => "slot",
            Self::Ref => "ref",
            Self::Callback { .. } => "callback",
            Self::ComponentRef { .. } => "componentRef",
        }
    }

    /// Components this type points at, including through unions and arrays.
    pub fn component_refs(&self) -> Vec<&SmolStr> {
        match self {
            Self::ComponentRef {
                component: Some(name),
            } => vec![name],
            Self::Union { types } => types.iter().flat_map(PropType::component_refs).collect(),
            Self::Array { items } => items.component_refs(),
            Self::Object { fields } => fields
                .iter()
                .flat_map(|f| f.prop_type.component_refs())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Validation constraints attached to a prop.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct PropConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

impl PropConstraints {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct PropDefinition {
    pub name: SmolStr,
    pub prop_type: PropType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub constraints: PropConstraints,
    pub location: SourceLocation,
}

/// Styles for one option of a variant prop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct VariantOption {
    pub name: SmolStr,
    pub styles: StyleMap,
    pub location: SourceLocation,
}

/// All options keyed by one prop (`variants.size.{sm,md,lg}`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct VariantGroup {
    pub prop: SmolStr,
    pub options: IndexMap<SmolStr, VariantOption>,
    pub location: SourceLocation,
}

/// Styles applied when several variant props match at once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct CompoundVariant {
    /// Prop name → accepted values.
    pub conditions: IndexMap<SmolStr, Vec<SmolStr>>,
    pub styles: StyleMap,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Styling {
    pub base: StyleMap,
    pub variants: IndexMap<SmolStr, VariantGroup>,
    pub compound_variants: Vec<CompoundVariant>,
    pub default_variants: IndexMap<SmolStr, SmolStr>,
}

impl Styling {
    /// Every style map in this styling block, in declaration order.
    pub fn style_maps(&self) -> Vec<&StyleMap> {
        let mut maps = vec![&self.base];
        for group in self.variants.values() {
            maps.extend(group.options.values().map(|o| &o.styles));
        }
        maps.extend(self.compound_variants.iter().map(|c| &c.styles));
        maps
    }

    pub fn style_maps_mut(&mut self) -> Vec<&mut StyleMap> {
        let mut maps = vec![&mut self.base];
        for group in self.variants.values_mut() {
            maps.extend(group.options.values_mut().map(|o| &mut o.styles));
        }
        maps.extend(self.compound_variants.iter_mut().map(|c| &mut c.styles));
        maps
    }
}

/// A named interaction state (`hover`, `disabled`, ...).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct StateSpec {
    pub name: SmolStr,
    pub condition: String,
    pub styles: StyleMap,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Accessibility {
    pub role: Option<SmolStr>,
    pub label: Option<String>,
    pub keyboard: Vec<SmolStr>,
    pub focusable: Option<bool>,
    pub aria: IndexMap<SmolStr, String>,
}

/// A named sub-part of a compound component.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct ComponentPart {
    pub name: SmolStr,
    pub props: Vec<PropDefinition>,
    pub styling: Styling,
    pub states: Vec<StateSpec>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct ComponentSpec {
    pub name: SmolStr,
    pub category: SmolStr,
    pub description: Option<String>,
    pub props: Vec<PropDefinition>,
    pub styling: Styling,
    pub states: Vec<StateSpec>,
    pub accessibility: Accessibility,
    pub parts: Vec<ComponentPart>,
    /// Props shared between parts.
    pub context: Vec<PropDefinition>,
    pub location: SourceLocation,
}

impl ComponentSpec {
    pub fn prop(&self, name: &str) -> Option<&PropDefinition> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Every style map of the component, its states and its parts.
    pub fn all_style_maps(&self) -> Vec<&StyleMap> {
        let mut maps = self.styling.style_maps();
        maps.extend(self.states.iter().map(|s| &s.styles));
        for part in &self.parts {
            maps.extend(part.styling.style_maps());
            maps.extend(part.states.iter().map(|s| &s.styles));
        }
        maps
    }

    pub fn all_style_maps_mut(&mut self) -> Vec<&mut StyleMap> {
        let mut maps = self.styling.style_maps_mut();
        maps.extend(self.states.iter_mut().map(|s| &mut s.styles));
        for part in &mut self.parts {
            maps.extend(part.styling.style_maps_mut());
            maps.extend(part.states.iter_mut().map(|s| &mut s.styles));
        }
        maps
    }

    /// Components referenced through `componentRef` props (own, part and context).
    pub fn component_refs(&self) -> Vec<&SmolStr> {
        self.props
            .iter()
            .chain(self.context.iter())
            .chain(self.parts.iter().flat_map(|p| p.props.iter()))
            .flat_map(|p| p.prop_type.component_refs())
            .collect()
    }
}
