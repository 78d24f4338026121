use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexSet;
use smol_str::SmolStr;

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "camelCase"))]
pub enum NodeKind {
    Token,
    Component,
    Pattern,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Component => "component",
            Self::Pattern => "pattern",
        }
    }

    /// Components and patterns; their edges describe structure.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Token)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph key: `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct NodeId {
    pub kind: NodeKind,
    pub name: SmolStr,
}

impl NodeId {
    pub fn new(kind: NodeKind, name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn token(name: impl Into<SmolStr>) -> Self {
        Self::new(NodeKind::Token, name)
    }

    pub fn component(name: impl Into<SmolStr>) -> Self {
        Self::new(NodeKind::Component, name)
    }

    pub fn pattern(name: impl Into<SmolStr>) -> Self {
        Self::new(NodeKind::Pattern, name)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Directed "depends on" graph over tokens, components and patterns.
///
/// Every edge is stored in both directions so "used by" queries are as cheap
/// as "depends on" queries. Nodes keep insertion order, which makes every
/// query result deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: IndexSet<NodeId>,
    /// `depends_on[i]`: nodes that node `i` uses.
    depends_on: Vec<IndexSet<usize>>,
    /// `used_by[i]`: nodes that use node `i`.
    used_by: Vec<IndexSet<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if absent; returns its index.
    pub fn add_node(&mut self, node: NodeId) -> usize {
        let (index, inserted) = self.nodes.insert_full(node);
        if inserted {
            self.depends_on.push(IndexSet::new());
            self.used_by.push(IndexSet::new());
        }
        index
    }

    /// Record that `from` depends on `to`.
    ///
    /// Returns `false` when either end is not a node of the graph.
    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let (Some(from), Some(to)) = (self.nodes.get_index_of(from), self.nodes.get_index_of(to))
        else {
            return false;
        };
        self.depends_on[from].insert(to);
        self.used_by[to].insert(from);
        true
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Every node with this name, whatever its kind.
    pub fn find(&self, name: &str) -> Vec<&NodeId> {
        self.nodes.iter().filter(|n| n.name == name).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.depends_on.iter().map(IndexSet::len).sum()
    }

    fn ids(&self, indices: &IndexSet<usize>) -> Vec<&NodeId> {
        indices
            .iter()
            .filter_map(|&i| self.nodes.get_index(i))
            .collect()
    }

    /// Nodes `node` uses directly.
    pub fn dependencies_of(&self, node: &NodeId) -> Vec<&NodeId> {
        self.nodes
            .get_index_of(node)
            .map(|i| self.ids(&self.depends_on[i]))
            .unwrap_or_default()
    }

    /// Nodes that use `node` directly.
    pub fn dependents_of(&self, node: &NodeId) -> Vec<&NodeId> {
        self.nodes
            .get_index_of(node)
            .map(|i| self.ids(&self.used_by[i]))
            .unwrap_or_default()
    }

    // ============================================================
    // Impact analysis
    // ============================================================

    /// Everything that must be regenerated when `node` changes: `node` itself
    /// plus everything that transitively uses it.
    pub fn get_affected(&self, node: &NodeId) -> IndexSet<NodeId> {
        let mut affected = IndexSet::new();
        affected.insert(node.clone());
        let Some(start) = self.nodes.get_index_of(node) else {
            return affected;
        };

        let mut seen: IndexSet<usize> = IndexSet::new();
        seen.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &user in &self.used_by[current] {
                if seen.insert(user) {
                    queue.push_back(user);
                }
            }
        }
        affected.extend(seen.into_iter().filter_map(|i| self.nodes.get_index(i).cloned()));
        affected
    }

    /// The affected set of all `changed` nodes, dependencies first.
    ///
    /// Nodes caught in a cycle come last, in insertion order.
    pub fn get_regeneration_order(&self, changed: &[NodeId]) -> Vec<NodeId> {
        let mut affected: IndexSet<NodeId> = IndexSet::new();
        for node in changed {
            affected.extend(self.get_affected(node));
        }

        let (order, _) = self.kahn_order();
        let mut ordered: Vec<NodeId> = order
            .into_iter()
            .filter_map(|i| self.nodes.get_index(i))
            .filter(|n| affected.contains(*n))
            .cloned()
            .collect();
        for node in &affected {
            if !ordered.contains(node) {
                ordered.push(node.clone());
            }
        }
        ordered
    }

    // ============================================================
    // Ordering and cycles
    // ============================================================

    /// All nodes, each after everything it depends on.
    ///
    /// Fails with the cycles that prevent an ordering.
    pub fn topological_sort(&self) -> Result<Vec<NodeId>, Vec<Vec<NodeId>>> {
        let (order, complete) = self.kahn_order();
        if !complete {
            return Err(self.cycles(|_| true));
        }
        Ok(order
            .into_iter()
            .filter_map(|i| self.nodes.get_index(i).cloned())
            .collect())
    }

    /// Cycles among component and pattern edges.
    ///
    /// Each cycle is listed once, starting and ending at the same node
    /// (`[a, b, a]`). Token cycles are not included.
    pub fn detect_cycles(&self) -> Vec<Vec<NodeId>> {
        self.cycles(NodeKind::is_structural)
    }

    /// Kahn's algorithm, level by level, each level in `NodeId` order.
    ///
    /// Returns the ordered indices and whether every node was placed.
    fn kahn_order(&self) -> (Vec<usize>, bool) {
        let mut remaining: Vec<usize> = self.depends_on.iter().map(IndexSet::len).collect();
        let mut level: Vec<usize> = (0..self.nodes.len()).filter(|&i| remaining[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while !level.is_empty() {
            level.sort_by(|a, b| self.nodes[*a].cmp(&self.nodes[*b]));
            let mut next = Vec::new();
            for &node in &level {
                for &user in &self.used_by[node] {
                    remaining[user] -= 1;
                    if remaining[user] == 0 {
                        next.push(user);
                    }
                }
            }
            order.append(&mut level);
            level = next;
        }

        let complete = order.len() == self.nodes.len();
        (order, complete)
    }

    /// Depth-first search for back edges among nodes accepted by `include`.
    fn cycles(&self, include: impl Fn(&NodeKind) -> bool) -> Vec<Vec<NodeId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        let included = |i: usize| include(&self.nodes[i].kind);
        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut seen: IndexSet<Vec<usize>> = IndexSet::new();

        for root in (0..self.nodes.len()).filter(|&i| included(i)) {
            if marks[root] != Mark::New {
                continue;
            }
            // (node, next dependency position)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::Active;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let Some(&dependency) = self.depends_on[node].get_index(frame.1) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;
                if !included(dependency) {
                    continue;
                }
                match marks[dependency] {
                    Mark::New => {
                        marks[dependency] = Mark::Active;
                        stack.push((dependency, 0));
                    }
                    Mark::Active => {
                        let start = stack
                            .iter()
                            .position(|(n, _)| *n == dependency)
                            .unwrap_or(0);
                        let mut members: Vec<usize> = stack[start..].iter().map(|(n, _)| *n).collect();
                        let smallest = members
                            .iter()
                            .enumerate()
                            .min_by_key(|(_, n)| **n)
                            .map_or(0, |(i, _)| i);
                        members.rotate_left(smallest);
                        seen.insert(members);
                    }
                    Mark::Done => {}
                }
            }
        }

        seen.into_iter()
            .map(|members| {
                let mut cycle: Vec<NodeId> = members.iter().map(|&i| self.nodes[i].clone()).collect();
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                cycle
            })
            .collect()
    }
}

/// `a -> b -> a`
pub fn format_cycle(cycle: &[NodeId]) -> String {
    cycle
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
