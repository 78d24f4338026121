#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use specforge::graph::{DependencyGraph, NodeId};

use crate::helpers::fixtures::{color_tokens, compile_json, components_doc, patterns_doc};

fn names(nodes: impl IntoIterator<Item = NodeId>) -> Vec<String> {
    let mut names: Vec<String> = nodes.into_iter().map(|n| n.to_string()).collect();
    names.sort();
    names
}

#[test]
fn test_primitive_change_cascades_to_patterns() {
    let result = compile_json(&[
        ("tokens.json", color_tokens()),
        (
            "components.json",
            components_doc(
                r#"[
                    { "name": "Button", "styling": { "base": { "background": "$color.interactive.primary" } } },
                    { "name": "Link", "styling": { "base": { "color": "$color.blue.700" } } }
                ]"#,
            ),
        ),
        (
            "patterns.json",
            patterns_doc(
                r#"[{ "name": "Hero", "components": ["Button"],
                      "tree": [{ "type": "component", "component": "Button" }] }]"#,
            ),
        ),
    ]);
    assert!(result.success, "{:?}", result.issues());

    let affected = result.graph.get_affected(&NodeId::token("color.blue.600"));
    assert_eq!(
        names(affected),
        vec![
            "component:Button",
            "pattern:Hero",
            "token:color.blue.600",
            "token:color.interactive.primary",
        ]
    );

    let order = result
        .graph
        .get_regeneration_order(&[NodeId::token("color.blue.600")]);
    let position = |node: NodeId| order.iter().position(|n| *n == node).unwrap();
    assert!(position(NodeId::token("color.blue.600")) < position(NodeId::token("color.interactive.primary")));
    assert!(position(NodeId::token("color.interactive.primary")) < position(NodeId::component("Button")));
    assert!(position(NodeId::component("Button")) < position(NodeId::pattern("Hero")));
}

#[test]
fn test_ir_rebuilds_the_same_graph() {
    let result = compile_json(&[
        ("tokens.json", color_tokens()),
        (
            "components.json",
            components_doc(r#"[{ "name": "Button", "styling": { "base": { "color": "$color.blue.600" } } }]"#),
        ),
    ]);
    let rebuilt = result.ir.dependency_graph();

    assert_eq!(rebuilt.len(), result.graph.len());
    assert_eq!(rebuilt.edge_count(), result.graph.edge_count());
    assert_eq!(
        names(rebuilt.get_affected(&NodeId::token("color.blue.600"))),
        names(result.graph.get_affected(&NodeId::token("color.blue.600")))
    );
}

#[test]
fn test_unknown_node_affects_only_itself() {
    let graph = DependencyGraph::new();
    let ghost = NodeId::component("Ghost");
    assert_eq!(names(graph.get_affected(&ghost)), vec!["component:Ghost"]);
}

// ============================================================================
// Properties
// ============================================================================

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..16).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..40)))
}

fn build(n: usize, edges: &[(usize, usize)]) -> (DependencyGraph, Vec<NodeId>) {
    let nodes: Vec<NodeId> = (0..n).map(|i| NodeId::token(format!("t{i}"))).collect();
    let mut graph = DependencyGraph::new();
    for node in &nodes {
        graph.add_node(node.clone());
    }
    for &(from, to) in edges {
        graph.add_edge(&nodes[from], &nodes[to]);
    }
    (graph, nodes)
}

proptest! {
    #[test]
    fn prop_get_affected_is_reflexive(input in graph_strategy()) {
        let (n, edges) = input;
        let (graph, nodes) = build(n, &edges);
        for node in &nodes {
            prop_assert!(graph.get_affected(node).contains(node));
        }
    }

    #[test]
    fn prop_get_affected_is_transitive(input in graph_strategy()) {
        let (n, edges) = input;
        let (graph, nodes) = build(n, &edges);
        for node in &nodes {
            let affected = graph.get_affected(node);
            for other in &affected {
                for downstream in graph.get_affected(other) {
                    prop_assert!(
                        affected.contains(&downstream),
                        "{} affects {} which affects {}", node, other, downstream
                    );
                }
            }
        }
    }

    #[test]
    fn prop_direct_dependents_are_affected(input in graph_strategy()) {
        let (n, edges) = input;
        let (graph, nodes) = build(n, &edges);
        for &(from, to) in &edges {
            prop_assert!(graph.get_affected(&nodes[to]).contains(&nodes[from]));
        }
    }
}
