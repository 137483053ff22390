use indexmap::IndexMap;
use log::*;

use crate::model::*;
use crate::signal::Signal;

/// A track layout: nodes, edges, the signals placed on edges, and the derived
/// routes and vacancy sections. All collections keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub nodes: IndexMap<Id, Node>,
    pub edges: IndexMap<Id, Edge>,
    pub signals: IndexMap<Id, Signal>,
    pub routes: IndexMap<Id, Route>,
    pub vacancy_sections: IndexMap<Id, VacancySection>,
}

impl Topology {
    pub fn new() -> Topology {
        Topology::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId { kind: "node", id: node.id });
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), ModelError> {
        if self.edges.contains_key(&edge.id) {
            return Err(ModelError::DuplicateId { kind: "edge", id: edge.id });
        }
        self.node(&edge.node_a)?;
        self.node(&edge.node_b)?;
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Adds a signal and appends it to its edge's signal list.
    pub fn add_signal(&mut self, signal: Signal) -> Result<(), ModelError> {
        if self.signals.contains_key(&signal.id) {
            return Err(ModelError::DuplicateId { kind: "signal", id: signal.id });
        }
        let edge = self
            .edges
            .get_mut(&signal.edge)
            .ok_or_else(|| ModelError::UnknownEdge(signal.edge.clone()))?;
        edge.signals.push(signal.id.clone());
        self.signals.insert(signal.id.clone(), signal);
        Ok(())
    }

    pub fn add_route(&mut self, route: Route) -> Result<(), ModelError> {
        if self.routes.contains_key(&route.id) {
            return Err(ModelError::DuplicateId { kind: "route", id: route.id });
        }
        self.signal(&route.start_signal)?;
        self.signal(&route.end_signal)?;
        for e in &route.edges {
            self.edge(e)?;
        }
        self.routes.insert(route.id.clone(), route);
        Ok(())
    }

    pub fn add_vacancy_section(&mut self, section: VacancySection) -> Result<(), ModelError> {
        if self.vacancy_sections.contains_key(&section.id) {
            return Err(ModelError::DuplicateId { kind: "vacancy section", id: section.id });
        }
        self.vacancy_sections.insert(section.id.clone(), section);
        Ok(())
    }

    /// Points one slot of `node` at `other`. The reverse reference is not set.
    pub fn set_connection(&mut self, node: &str, slot: Slot, other: &str) -> Result<(), ModelError> {
        self.node(other)?;
        let n = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| ModelError::UnknownNode(node.to_string()))?;
        *n.slot_mut(slot) = Some(other.to_string());
        Ok(())
    }

    /// Sets both directions of a connection.
    pub fn connect(&mut self, a: &str, slot_a: Slot, b: &str, slot_b: Slot) -> Result<(), ModelError> {
        self.set_connection(a, slot_a, b)?;
        self.set_connection(b, slot_b, a)
    }

    pub fn node(&self, id: &str) -> Result<&Node, ModelError> {
        self.nodes.get(id).ok_or_else(|| ModelError::UnknownNode(id.to_string()))
    }

    pub fn edge(&self, id: &str) -> Result<&Edge, ModelError> {
        self.edges.get(id).ok_or_else(|| ModelError::UnknownEdge(id.to_string()))
    }

    pub fn signal(&self, id: &str) -> Result<&Signal, ModelError> {
        self.signals.get(id).ok_or_else(|| ModelError::UnknownSignal(id.to_string()))
    }

    /// The slot on `neighbour` that refers back to `node`.
    pub fn connection_on(&self, neighbour: &str, node: &str) -> Option<Slot> {
        self.nodes.get(neighbour).and_then(|nb| nb.connection_to(node))
    }

    /// Number of set neighbour slots whose target refers back to `node`.
    pub fn degree(&self, node: &Node) -> usize {
        Slot::ALL
            .iter()
            .filter_map(|s| node.slot(*s))
            .filter(|nb| self.connection_on(nb, &node.id).is_some())
            .count()
    }

    /// A switch: all three neighbour slots set and reciprocated.
    pub fn is_point(&self, node: &Node) -> bool {
        self.degree(node) == 3
    }

    pub fn is_point_id(&self, node: &str) -> bool {
        self.nodes.get(node).map_or(false, |n| self.is_point(n))
    }

    /// Signals of an edge in insertion order.
    pub fn signals_on(&self, edge: &Edge) -> Result<Vec<&Signal>, ModelError> {
        edge.signals.iter().map(|s| self.signal(s)).collect()
    }

    /// Removes a node, keeping the order of the remaining ones. Edges and
    /// neighbour references are left to the caller.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        debug!("Removing node {}", id);
        self.nodes.shift_remove(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        debug!("Removing edge {}", id);
        self.edges.shift_remove(id)
    }
}
