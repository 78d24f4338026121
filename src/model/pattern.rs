//! Pattern specifications: trees of component instances and elements.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use super::component::{BoundValue, PropDefinition};
use crate::base::SourceLocation;

/// Prop bindings on a node (`"props": {"label": "Search"}`).
pub type NodeProps = IndexMap<SmolStr, BoundValue>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(tag = "type", rename_all = "camelCase"))]
pub enum PatternNode {
    Component {
        component: SmolStr,
        props: NodeProps,
        children: Vec<PatternNode>,
        location: SourceLocation,
    },
    Element {
        tag: SmolStr,
        props: NodeProps,
        children: Vec<PatternNode>,
        location: SourceLocation,
    },
    Conditional {
        condition: String,
        then: Vec<PatternNode>,
        otherwise: Vec<PatternNode>,
        location: SourceLocation,
    },
    Loop {
        each: String,
        item: SmolStr,
        children: Vec<PatternNode>,
        location: SourceLocation,
    },
    Slot {
        name: SmolStr,
        fallback: Vec<PatternNode>,
        location: SourceLocation,
    },
    Pattern {
        pattern: SmolStr,
        props: NodeProps,
        location: SourceLocation,
    },
}

impl PatternNode {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Component { location, .. }
            | Self::Element { location, .. }
            | Self::Conditional { location, .. }
            | Self::Loop { location, .. }
            | Self::Slot { location, .. }
            | Self::Pattern { location, .. } => location,
        }
    }

    /// Direct child nodes, across all branches.
    pub fn children(&self) -> Vec<&PatternNode> {
        match self {
            Self::Component { children, .. }
            | Self::Element { children, .. }
            | Self::Loop { children, .. } => children.iter().collect(),
            Self::Conditional {
                then, otherwise, ..
            } => then.iter().chain(otherwise.iter()).collect(),
            Self::Slot { fallback, .. } => fallback.iter().collect(),
            Self::Pattern { .. } => Vec::new(),
        }
    }

    pub fn props(&self) -> Option<&NodeProps> {
        match self {
            Self::Component { props, .. }
            | Self::Element { props, .. }
            | Self::Pattern { props, .. } => Some(props),
            _ => None,
        }
    }

    /// Visit this node and all descendants depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a PatternNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Visit mutable prop maps of this node and all descendants.
    pub fn walk_props_mut(&mut self, visit: &mut impl FnMut(&mut NodeProps)) {
        match self {
            Self::Component {
                props, children, ..
            }
            | Self::Element {
                props, children, ..
            } => {
                visit(props);
                for child in children {
                    child.walk_props_mut(visit);
                }
            }
            Self::Pattern { props, .. } => visit(props),
            Self::Conditional {
                then, otherwise, ..
            } => {
                for child in then.iter_mut().chain(otherwise.iter_mut()) {
                    child.walk_props_mut(visit);
                }
            }
            Self::Loop { children, .. } => {
                for child in children {
                    child.walk_props_mut(visit);
                }
            }
            Self::Slot { fallback, .. } => {
                for child in fallback {
                    child.walk_props_mut(visit);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct PatternSpec {
    pub name: SmolStr,
    pub category: SmolStr,
    pub description: Option<String>,
    pub props: Vec<PropDefinition>,
    pub tree: Vec<PatternNode>,
    /// Components declared by the pattern or instantiated in its tree.
    pub components: IndexSet<SmolStr>,
    /// Patterns embedded in the tree.
    pub patterns: IndexSet<SmolStr>,
    pub location: SourceLocation,
}

impl PatternSpec {
    /// Walk every node of the tree.
    pub fn walk_nodes<'a>(&'a self, visit: &mut impl FnMut(&'a PatternNode)) {
        for node in &self.tree {
            node.walk(visit);
        }
    }

    /// Location of the first node instantiating `component`, if any.
    pub fn component_usage(&self, component: &str) -> Option<&SourceLocation> {
        let mut found = None;
        self.walk_nodes(&mut |node| {
            if found.is_none() {
                if let PatternNode::Component {
                    component: name,
                    location,
                    ..
                } = node
                {
                    if name == component {
                        found = Some(location);
                    }
                }
            }
        });
        found
    }
}
