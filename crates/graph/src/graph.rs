use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use planner_catalog::FeatureKey;
use std::collections::HashMap;

/// Edge payload: dependent -> dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DependencyEdge {
    pub cross_module: bool,
}

/// Catalog features and their resolved dependency edges.
///
/// Edges run from a feature to each catalog feature it depends on. References
/// to keys outside the catalog have no node and therefore no edge.
#[derive(Debug, Clone, Default)]
pub struct FeatureGraph {
    pub(crate) graph: DiGraph<FeatureKey, DependencyEdge>,

    /// Feature key -> NodeIndex mapping for fast lookup
    pub(crate) key_index: HashMap<FeatureKey, NodeIndex>,
}

impl FeatureGraph {
    pub(crate) fn add_node(&mut self, key: FeatureKey) -> NodeIndex {
        if let Some(&idx) = self.key_index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.key_index.insert(key, idx);
        idx
    }

    /// Add an edge unless it already exists
    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DependencyEdge) {
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn find_node(&self, key: &FeatureKey) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.key_index.contains_key(key)
    }

    /// Features that directly depend on `key`, sorted by key
    pub fn dependents_of(&self, key: &FeatureKey) -> Vec<&FeatureKey> {
        self.neighbors(key, Direction::Incoming)
    }

    /// Catalog features `key` directly depends on, sorted by key
    pub fn dependencies_of(&self, key: &FeatureKey) -> Vec<&FeatureKey> {
        self.neighbors(key, Direction::Outgoing)
    }

    /// Dependencies of `key` that live in another module
    pub fn cross_module_dependencies_of(&self, key: &FeatureKey) -> Vec<&FeatureKey> {
        use petgraph::visit::EdgeRef;

        let Some(idx) = self.find_node(key) else {
            return Vec::new();
        };
        let mut keys: Vec<&FeatureKey> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| edge.weight().cross_module)
            .map(|edge| &self.graph[edge.target()])
            .collect();
        keys.sort();
        keys
    }

    fn neighbors(&self, key: &FeatureKey, direction: Direction) -> Vec<&FeatureKey> {
        let Some(idx) = self.find_node(key) else {
            return Vec::new();
        };
        let mut keys: Vec<&FeatureKey> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|neighbor| &self.graph[neighbor])
            .collect();
        keys.sort();
        keys
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
