use log::*;
use std::collections::HashMap;
use std::vec;

use trackmodel::{Edge, Id, Topology};

use crate::adjacency::Adjacency;
use crate::config::TieBreak;
use crate::error::{ExportError, Result};
use crate::orientation::Direction;

struct Frame<'t> {
    edge: &'t Edge,
    orientation: Direction,
    /// The node the walk leaves this edge through.
    exit: &'t str,
    pending: vec::IntoIter<&'t Edge>,
}

/// Travel orientation of every edge relative to a walk started at a boundary
/// of the topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOrientations {
    states: HashMap<Id, Direction>,
}

impl EdgeOrientations {
    pub fn propagate(topology: &Topology, tie_break: TieBreak) -> Result<EdgeOrientations> {
        let mut orientations = EdgeOrientations::default();
        let adjacency = Adjacency::new(topology);
        let start = match adjacency.boundary_node(tie_break) {
            Some(start) => start,
            None => return Ok(orientations),
        };
        let start_edge = match adjacency.edges_at(start).first() {
            Some(edge) => *edge,
            None => return Ok(orientations),
        };
        let start_orientation = if start_edge.node_a == start {
            Direction::Normal
        } else {
            Direction::Reverse
        };
        debug!("Starting edge walk at {} on {} ({:?})", start, start_edge.id, start_orientation);

        orientations.walk(&adjacency, start_edge, start, start_orientation);

        for edge in topology.edges.values() {
            if !orientations.states.contains_key(&edge.id) {
                return Err(ExportError::Disconnected { element: edge.id.clone() });
            }
        }
        Ok(orientations)
    }

    pub fn get(&self, edge: &str) -> Option<Direction> {
        self.states.get(edge).copied()
    }

    fn frame<'t>(adjacency: &Adjacency<'t>, edge: &'t Edge, entry: &str, orientation: Direction) -> Frame<'t> {
        let exit = if entry != edge.node_a { edge.node_a.as_str() } else { edge.node_b.as_str() };
        let pending: Vec<&Edge> = adjacency
            .edges_at(exit)
            .iter()
            .copied()
            .filter(|e| e.id != edge.id)
            .collect();
        Frame { edge, orientation, exit, pending: pending.into_iter() }
    }

    fn walk<'t>(&mut self, adjacency: &Adjacency<'t>, edge: &'t Edge, entry: &str, orientation: Direction) {
        self.states.insert(edge.id.clone(), orientation);
        let mut stack = vec![Self::frame(adjacency, edge, entry, orientation)];

        while let Some(frame) = stack.last_mut() {
            let (edge, orientation, via) = (frame.edge, frame.orientation, frame.exit);
            let next = match frame.pending.next() {
                Some(next) => next,
                None => {
                    stack.pop();
                    continue;
                }
            };
            if self.states.contains_key(&next.id) {
                continue;
            }

            // parallel edges meet at both ends, which inverts the flip test
            let parallel = edge.parallel_to(next);
            let flip = (via != next.node_a) != parallel;
            let next_orientation = if flip { orientation.opposite() } else { orientation };

            self.states.insert(next.id.clone(), next_orientation);
            stack.push(Self::frame(adjacency, next, via, next_orientation));
        }
    }
}
