use indexmap::IndexMap;
use std::collections::HashMap;

use trackmodel::{Edge, Topology};

use crate::config::TieBreak;

/// For every node, the edges it is an endpoint of, in edge order.
/// Nodes appear in the order they are first met on an edge.
pub fn edges_by_node<'t>(edges: impl IntoIterator<Item = &'t Edge>) -> IndexMap<&'t str, Vec<&'t Edge>> {
    let mut by_node: IndexMap<&str, Vec<&Edge>> = IndexMap::new();
    for edge in edges {
        for node in [&edge.node_a, &edge.node_b] {
            by_node.entry(node.as_str()).or_insert_with(Vec::new).push(edge);
        }
    }
    by_node
}

/// For both orderings of every edge's endpoints, the ids of the edges joining
/// them. Parallel edges accumulate in edge order.
pub fn edge_by_node_pair<'t>(edges: impl IntoIterator<Item = &'t Edge>) -> HashMap<(&'t str, &'t str), Vec<&'t str>> {
    let mut by_pair: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
    for edge in edges {
        let (a, b) = (edge.node_a.as_str(), edge.node_b.as_str());
        by_pair.entry((a, b)).or_insert_with(Vec::new).push(&edge.id);
        by_pair.entry((b, a)).or_insert_with(Vec::new).push(&edge.id);
    }
    by_pair
}

/// Both indexes over one topology.
pub struct Adjacency<'t> {
    by_node: IndexMap<&'t str, Vec<&'t Edge>>,
    by_pair: HashMap<(&'t str, &'t str), Vec<&'t str>>,
}

impl<'t> Adjacency<'t> {
    pub fn new(topology: &'t Topology) -> Adjacency<'t> {
        Adjacency {
            by_node: edges_by_node(topology.edges.values()),
            by_pair: edge_by_node_pair(topology.edges.values()),
        }
    }

    pub fn edges_at(&self, node: &str) -> &[&'t Edge] {
        self.by_node.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edges_between(&self, a: &'t str, b: &'t str) -> &[&'t str] {
        self.by_pair.get(&(a, b)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Nodes that are an endpoint of at least one edge.
    pub fn nodes(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.by_node.keys().copied()
    }

    /// The node with the fewest incident edges, taken as a boundary of the
    /// topology. `None` when there are no edges.
    pub fn boundary_node(&self, tie_break: TieBreak) -> Option<&'t str> {
        match tie_break {
            TieBreak::LowestId => self
                .by_node
                .iter()
                .min_by_key(|(id, edges)| (edges.len(), **id))
                .map(|(id, _)| *id),
            TieBreak::FirstEncountered => self
                .by_node
                .iter()
                .min_by_key(|(_, edges)| edges.len())
                .map(|(id, _)| *id),
        }
    }
}
