//! Typed data model for tokens, components and patterns.
//!
//! These types are produced by the schema validator, filled in by the
//! reference resolver, and handed to generators inside the IR.

mod component;
mod pattern;
mod token;
mod value;

pub use component::{
    Accessibility, BoundValue, ComponentPart, ComponentSpec, CompoundVariant, PropConstraints,
    PropDefinition, PropType, StateSpec, StyleMap, Styling, VariantGroup, VariantOption,
};
pub use pattern::{NodeProps, PatternNode, PatternSpec};
pub use token::{Deprecation, Token, TokenCategory};
pub use value::{
    Dimension, Duration, ReferenceSyntaxError, TokenRef, Value, ValueExpr, is_segment_char,
    join_path, parse_reference_path, unescape_literal,
};
