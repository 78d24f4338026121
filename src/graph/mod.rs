//! Dependency graph
//!
//! Built from resolved tokens, components and patterns. Used for impact
//! analysis ("what must be regenerated if X changes"), generation order and
//! structural cycle detection.
//!
//! ## Edges
//!
//! | From      | To        | Source                               |
//! |-----------|-----------|--------------------------------------|
//! | token     | token     | references in the token value        |
//! | component | token     | references in styling and states     |
//! | component | component | `componentRef` props                 |
//! | pattern   | component | `components`, including tree usage   |
//! | pattern   | pattern   | embedded `pattern` nodes             |
//! | pattern   | token     | references in node props             |
//!
//! Edges to names that do not exist are skipped; the semantic checks report
//! them.

mod dependency;

pub use dependency::{DependencyGraph, NodeId, NodeKind, format_cycle};

use crate::model::{ComponentSpec, PatternSpec, StyleMap, Token, TokenRef};

impl DependencyGraph {
    /// Build the graph for one compile.
    pub fn build(tokens: &[Token], components: &[ComponentSpec], patterns: &[PatternSpec]) -> Self {
        let mut graph = Self::new();
        for token in tokens {
            graph.add_node(NodeId::token(token.id.clone()));
        }
        for component in components {
            graph.add_node(NodeId::component(component.name.clone()));
        }
        for pattern in patterns {
            graph.add_node(NodeId::pattern(pattern.name.clone()));
        }

        for token in tokens {
            let from = NodeId::token(token.id.clone());
            graph.add_references(&from, token.value.references());
        }

        for component in components {
            let from = NodeId::component(component.name.clone());
            graph.add_references(&from, style_references(component.all_style_maps()));
            for target in component.component_refs() {
                graph.add_edge(&from, &NodeId::component(target.clone()));
            }
        }

        for pattern in patterns {
            let from = NodeId::pattern(pattern.name.clone());
            for component in &pattern.components {
                graph.add_edge(&from, &NodeId::component(component.clone()));
            }
            for embedded in &pattern.patterns {
                graph.add_edge(&from, &NodeId::pattern(embedded.clone()));
            }
            let mut props = Vec::new();
            pattern.walk_nodes(&mut |node| props.extend(node.props()));
            graph.add_references(&from, style_references(props));
        }

        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    fn add_references<'a>(&mut self, from: &NodeId, references: impl IntoIterator<Item = &'a TokenRef>) {
        for reference in references {
            self.add_edge(from, &NodeId::token(reference.target_id()));
        }
    }
}

fn style_references<'a>(maps: impl IntoIterator<Item = &'a StyleMap>) -> Vec<&'a TokenRef> {
    maps.into_iter()
        .flat_map(|styles| styles.values())
        .flat_map(|bound| bound.expr.references())
        .collect()
}
