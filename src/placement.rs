use indexmap::IndexMap;
use log::*;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::HashMap;

use trackmodel::{Id, Node, Topology};

use crate::adjacency::Adjacency;
use crate::edge_orientation::EdgeOrientations;
use crate::error::{ExportError, Result};
use crate::orientation::{Direction, Orientation, OrientationState, Orientations};
use crate::topology::AxleCountingHead;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointPlacement {
    pub toe: Id,
    pub diverting: Id,
    pub through: Id,
    pub diverts_in_direction: Direction,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePlacement {
    pub items: Vec<Id>,
    pub orientation: Option<Direction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    pub points: IndexMap<Id, PointPlacement>,
    pub edges: IndexMap<Id, EdgePlacement>,
}

impl Placement {
    pub fn resolve(
        topology: &Topology,
        orientations: &Orientations,
        edge_orientations: &EdgeOrientations,
        heads: Option<&IndexMap<Id, AxleCountingHead>>,
    ) -> Result<Placement> {
        let placement = Placement {
            points: resolve_points(topology, orientations)?,
            edges: resolve_edges(topology, edge_orientations, heads)?,
        };
        debug!("Placed {} points and {} edges", placement.points.len(), placement.edges.len());
        Ok(placement)
    }
}

fn first_edge_between<'t>(adjacency: &Adjacency<'t>, a: &'t str, b: &'t str) -> Result<&'t str> {
    adjacency
        .edges_between(a, b)
        .first()
        .copied()
        .ok_or_else(|| ExportError::MissingEdge { a: a.to_string(), b: b.to_string() })
}

/// Branch assignment of every point.
///
/// A point whose two branches run to the same neighbour over two parallel
/// edges shares its choice with that neighbour: the first of the pair to be
/// resolved picks, and the other one reads the pick back from `right_edge`.
pub fn resolve_points(topology: &Topology, orientations: &Orientations) -> Result<IndexMap<Id, PointPlacement>> {
    let adjacency = Adjacency::new(topology);
    let mut right_edge: HashMap<&str, &str> = HashMap::new();
    let mut points = IndexMap::new();

    for node in topology.nodes.values().filter(|n| topology.is_point(n)) {
        let state = match orientations.get(&node.id) {
            Some(state) => *state,
            None => return Err(ExportError::Disconnected { element: node.id.clone() }),
        };
        let (head, left, right) = match (&node.head, &node.left, &node.right) {
            (Some(h), Some(l), Some(r)) => (h.as_str(), l.as_str(), r.as_str()),
            _ => continue,
        };
        let id = node.id.as_str();

        let toe = adjacency.edges_between(id, head).first().map_or_else(String::new, |e| e.to_string());

        let (diverting, through) = if left == right {
            parallel_branches(&adjacency, node, left, state, &mut right_edge)?
        } else {
            let towards_left = first_edge_between(&adjacency, id, left)?;
            let towards_right = first_edge_between(&adjacency, id, right)?;
            match state.orientation {
                Orientation::Left => (towards_left, towards_right),
                Orientation::Right => (towards_right, towards_left),
            }
        };

        points.insert(
            node.id.clone(),
            PointPlacement {
                toe,
                diverting: diverting.to_string(),
                through: through.to_string(),
                diverts_in_direction: state.diverts_in_direction,
                orientation: state.orientation,
            },
        );
    }
    Ok(points)
}

fn parallel_branches<'t>(
    adjacency: &Adjacency<'t>,
    node: &'t Node,
    neighbour: &'t str,
    state: OrientationState,
    right_edge: &mut HashMap<&'t str, &'t str>,
) -> Result<(&'t str, &'t str)> {
    let pair = match adjacency.edges_between(&node.id, neighbour) {
        &[first, second, ..] => (first, second),
        _ => return Err(ExportError::ParallelEdgesMissing { node: node.id.clone() }),
    };

    if let Some(&chosen) = right_edge.get(neighbour) {
        let other = if chosen == pair.0 { pair.1 } else { pair.0 };
        return Ok(match state.orientation {
            Orientation::Left => (chosen, other),
            Orientation::Right => (other, chosen),
        });
    }

    let (diverting, through) = pair;
    let chosen = match state.diverts_in_direction {
        Direction::Normal => diverting,
        Direction::Reverse => through,
    };
    right_edge.insert(&node.id, chosen);
    Ok((diverting, through))
}

/// Ordered item list and travel orientation of every edge.
pub fn resolve_edges(
    topology: &Topology,
    edge_orientations: &EdgeOrientations,
    heads: Option<&IndexMap<Id, AxleCountingHead>>,
) -> Result<IndexMap<Id, EdgePlacement>> {
    let mut heads_by_edge: HashMap<&str, Vec<&AxleCountingHead>> = HashMap::new();
    for head in heads.into_iter().flat_map(|h| h.values()) {
        heads_by_edge.entry(head.edge.as_str()).or_insert_with(Vec::new).push(head);
    }
    for group in heads_by_edge.values_mut() {
        group.sort_by_key(|h| OrderedFloat(h.position));
    }

    let mut edges = IndexMap::new();
    for edge in topology.edges.values() {
        let mut signals = topology.signals_on(edge)?;
        signals.sort_by_key(|s| OrderedFloat(s.distance_edge));
        let (leading, trailing): (Vec<&AxleCountingHead>, Vec<&AxleCountingHead>) = heads_by_edge
            .get(edge.id.as_str())
            .map(|g| g.iter().copied().partition(|h| h.position < 0.5))
            .unwrap_or_default();

        let mut items = Vec::new();
        if topology.is_point_id(&edge.node_a) {
            items.push(edge.node_a.clone());
        }
        items.extend(leading.iter().map(|h| h.id.clone()));
        items.extend(signals.iter().map(|s| s.id.clone()));
        items.extend(trailing.iter().map(|h| h.id.clone()));
        if topology.is_point_id(&edge.node_b) {
            items.push(edge.node_b.clone());
        }

        edges.insert(
            edge.id.clone(),
            EdgePlacement {
                items,
                orientation: edge_orientations.get(&edge.id),
            },
        );
    }
    Ok(edges)
}
