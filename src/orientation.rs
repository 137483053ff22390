use log::*;
use serde::Serialize;
use std::collections::HashMap;
use std::vec;

use trackmodel::{Id, IdRef, Node, Side, Slot, Topology};

use crate::adjacency::Adjacency;
use crate::config::TieBreak;
use crate::error::{ExportError, Result};

/// Which of a point's `left`/`right` slots is the diverging branch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize)]
pub enum Orientation {
    Left,
    Right,
}

impl Orientation {
    pub fn opposite(&self) -> Orientation {
        match self {
            Orientation::Left => Orientation::Right,
            Orientation::Right => Orientation::Left,
        }
    }
}

impl From<Side> for Orientation {
    fn from(side: Side) -> Orientation {
        match side {
            Side::Left => Orientation::Left,
            Side::Right => Orientation::Right,
        }
    }
}

/// Travel sense relative to the start of a traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Normal,
    Reverse,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Normal => Direction::Reverse,
            Direction::Reverse => Direction::Normal,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OrientationState {
    pub orientation: Orientation,
    pub diverts_in_direction: Direction,
}

fn slot_orientation(slot: Slot) -> Option<Orientation> {
    match slot {
        Slot::Left => Some(Orientation::Left),
        Slot::Right => Some(Orientation::Right),
        Slot::Head => None,
    }
}

/// Neighbours in the order they are walked: head first, then the straight
/// continuation before the diverging branch.
fn visit_order(node: &Node, orientation: Orientation) -> Vec<&IdRef> {
    let branches = match orientation {
        Orientation::Left => [Slot::Right, Slot::Left],
        Orientation::Right => [Slot::Left, Slot::Right],
    };
    std::iter::once(Slot::Head)
        .chain(branches.iter().copied())
        .filter_map(|s| node.slot(s))
        .collect()
}

fn lookup<'t>(topology: &'t Topology, id: &str, referenced_by: &str) -> Result<&'t Node> {
    topology.nodes.get(id).ok_or_else(|| ExportError::MissingNode {
        node: id.to_string(),
        referenced_by: referenced_by.to_string(),
    })
}

struct Frame<'t> {
    node: &'t Node,
    pending: vec::IntoIter<&'t IdRef>,
}

impl<'t> Frame<'t> {
    fn new(node: &'t Node, state: OrientationState) -> Frame<'t> {
        Frame {
            node,
            pending: visit_order(node, state.orientation).into_iter(),
        }
    }
}

/// Orientation and diversion direction per node, kept beside the topology
/// instead of on it so that one topology can be exported repeatedly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Orientations {
    states: HashMap<Id, OrientationState>,
}

impl Orientations {
    /// Walks the whole topology once, depth first, from one of its ends.
    pub fn propagate(topology: &Topology, tie_break: TieBreak) -> Result<Orientations> {
        let mut orientations = Orientations::default();
        let adjacency = Adjacency::new(topology);
        let start = match adjacency.boundary_node(tie_break) {
            Some(start) => start,
            None => {
                debug!("Topology has no edges, nothing to orient");
                return Ok(orientations);
            }
        };

        let start_node = topology.node(start)?;
        let first = start_node
            .neighbours()
            .into_iter()
            .next()
            .ok_or_else(|| ExportError::StartNodeWithoutNeighbour { node: start.to_string() })?;
        let first_node = lookup(topology, first, start)?;

        // We assume that we start going from left to right.
        let seed = OrientationState {
            orientation: Orientation::Left,
            diverts_in_direction: if first_node.points_at(Slot::Head, start) {
                Direction::Normal
            } else {
                Direction::Reverse
            },
        };
        debug!("Starting orientation walk at {} via {} with {:?}", start, first, seed);
        orientations.walk(topology, first_node, seed)?;

        for node in adjacency.nodes() {
            if !orientations.states.contains_key(node) {
                return Err(ExportError::Disconnected { element: node.to_string() });
            }
        }
        info!("Oriented {} nodes", orientations.states.len());
        Ok(orientations)
    }

    pub fn get(&self, node: &str) -> Option<&OrientationState> {
        self.states.get(node)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Records a state unless the node already has one. Returns whether it was recorded.
    pub fn assign(&mut self, node: &str, state: OrientationState) -> bool {
        if self.states.contains_key(node) {
            return false;
        }
        self.states.insert(node.to_string(), state);
        true
    }

    fn walk<'t>(&mut self, topology: &'t Topology, node: &'t Node, seed: OrientationState) -> Result<()> {
        self.assign(&node.id, seed);
        let mut stack = vec![Frame::new(node, seed)];

        while let Some(frame) = stack.last_mut() {
            let current = frame.node;
            let next_id = match frame.pending.next() {
                Some(id) => id,
                None => {
                    stack.pop();
                    continue;
                }
            };
            if self.states.contains_key(next_id) {
                continue;
            }

            let next = lookup(topology, next_id, &current.id)?;
            let state = self.next_state(topology, current, next);
            debug!("{} -> {}: {:?}", current.id, next.id, state);
            self.assign(&next.id, state);
            stack.push(Frame::new(next, state));
        }
        Ok(())
    }

    /// State of `next`, reached from the already oriented `current`.
    fn next_state(&self, topology: &Topology, current: &Node, next: &Node) -> OrientationState {
        let from = self.states[&current.id];

        let next_head_here = next.points_at(Slot::Head, &current.id);
        let head_there = current.points_at(Slot::Head, &next.id);
        // head-to-head and branch-to-branch joints both turn the facing sense around
        let diverts_in_direction = if next_head_here == head_there {
            from.diverts_in_direction.opposite()
        } else {
            from.diverts_in_direction
        };

        let orientation = match next.turnout_side {
            Some(side) => side.into(),
            None => {
                let inferred = if next_head_here {
                    self.orientation_from_neighbours(topology, next)
                } else {
                    None
                };
                inferred
                    .or_else(|| orientation_from_slots(current, next))
                    .unwrap_or(match from.diverts_in_direction {
                        Direction::Normal => Orientation::Left,
                        Direction::Reverse => Orientation::Right,
                    })
            }
        };

        OrientationState { orientation, diverts_in_direction }
    }

    /// Orientation of `node` judged from how its neighbours connect back to it.
    /// Only head-to-head, right-to-right and left-to-left joints give an answer.
    pub fn orientation_from_neighbours(&self, topology: &Topology, node: &Node) -> Option<Orientation> {
        let back = |slot: Slot| node.slot(slot).and_then(|nb| topology.connection_on(nb, &node.id));
        let head_connection = back(Slot::Head);
        let left_connection = back(Slot::Left);
        let right_connection = back(Slot::Right);

        if head_connection == Some(Slot::Head) {
            // Any classification on the left neighbour decides, even a head one.
            if let Some(connection) = left_connection {
                return slot_orientation(connection);
            }
            if let Some(connection) = right_connection {
                return slot_orientation(connection);
            }
        } else {
            let oriented = |slot: Slot| {
                node.slot(slot)
                    .and_then(|nb| self.states.get(nb))
                    .map(|s| s.orientation)
            };
            if right_connection == Some(Slot::Right) {
                return Some(if oriented(Slot::Right) == Some(Orientation::Right) {
                    Orientation::Right
                } else {
                    Orientation::Left
                });
            }
            if left_connection == Some(Slot::Left) {
                return Some(if oriented(Slot::Left) == Some(Orientation::Left) {
                    Orientation::Left
                } else {
                    Orientation::Right
                });
            }
        }
        None
    }
}

/// Orientation from the pair of slots joining two mutually connected nodes.
fn orientation_from_slots(current: &Node, next: &Node) -> Option<Orientation> {
    let next_left = next.points_at(Slot::Left, &current.id);
    let next_right = next.points_at(Slot::Right, &current.id);
    let here_left = current.points_at(Slot::Left, &next.id);
    let here_right = current.points_at(Slot::Right, &next.id);

    match (next_left, next_right, here_left, here_right) {
        (true, _, true, _) => Some(Orientation::Left),
        (_, true, _, true) => Some(Orientation::Right),
        (true, _, _, true) => Some(Orientation::Right),
        (_, true, true, _) => Some(Orientation::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackmodel::Edge;

    fn build(nodes: &[&str], links: &[(&str, Slot, &str, Slot)], edges: &[(&str, &str, &str)]) -> Topology {
        let mut topo = Topology::new();
        for n in nodes {
            topo.add_node(Node::new(*n)).unwrap();
        }
        for (a, sa, b, sb) in links {
            topo.connect(a, *sa, b, *sb).unwrap();
        }
        for (id, a, b) in edges {
            topo.add_edge(Edge::new(*id, *a, *b)).unwrap();
        }
        topo
    }

    fn single_switch() -> Topology {
        build(
            &["A", "B", "C", "D"],
            &[
                ("A", Slot::Head, "B", Slot::Head),
                ("B", Slot::Left, "C", Slot::Head),
                ("B", Slot::Right, "D", Slot::Head),
            ],
            &[("A-B", "A", "B"), ("B-C", "B", "C"), ("B-D", "B", "D")],
        )
    }

    fn state(orientation: Orientation, diverts_in_direction: Direction) -> OrientationState {
        OrientationState { orientation, diverts_in_direction }
    }

    #[test]
    fn single_switch_is_oriented() {
        let topo = single_switch();
        let o = Orientations::propagate(&topo, TieBreak::LowestId).unwrap();
        assert_eq!(o.len(), 4);
        assert_eq!(o.get("B"), Some(&state(Orientation::Left, Direction::Normal)));
        // head-to-head joint flips the sense
        assert_eq!(o.get("A"), Some(&state(Orientation::Left, Direction::Reverse)));
        assert_eq!(o.get("C"), Some(&state(Orientation::Left, Direction::Normal)));
        assert_eq!(o.get("D"), Some(&state(Orientation::Left, Direction::Normal)));
    }

    #[test]
    fn reverse_diversion_defaults_to_right() {
        let topo = build(
            &["a", "b", "f", "g"],
            &[
                ("a", Slot::Head, "b", Slot::Head),
                ("b", Slot::Left, "f", Slot::Left),
                ("b", Slot::Right, "f", Slot::Right),
                ("f", Slot::Head, "g", Slot::Head),
            ],
            &[("a-b", "a", "b"), ("up", "b", "f"), ("straight", "b", "f"), ("f-g", "f", "g")],
        );
        let o = Orientations::propagate(&topo, TieBreak::LowestId).unwrap();
        assert_eq!(o.get("b"), Some(&state(Orientation::Left, Direction::Normal)));
        assert_eq!(o.get("f"), Some(&state(Orientation::Left, Direction::Reverse)));
        // reached from f, which diverts in reverse
        assert_eq!(o.get("g"), Some(&state(Orientation::Right, Direction::Normal)));
    }

    #[test]
    fn seed_reverse_when_not_entered_on_head() {
        // start C enters B on its left branch
        let topo = build(
            &["A", "B", "C", "D"],
            &[
                ("A", Slot::Head, "B", Slot::Head),
                ("B", Slot::Left, "C", Slot::Head),
                ("B", Slot::Right, "D", Slot::Head),
            ],
            &[("B-C", "B", "C"), ("A-B", "A", "B"), ("B-D", "B", "D")],
        );
        let o = Orientations::propagate(&topo, TieBreak::FirstEncountered).unwrap();
        assert_eq!(o.get("B"), Some(&state(Orientation::Left, Direction::Reverse)));
    }

    #[test]
    fn propagation_is_deterministic() {
        let first = Orientations::propagate(&single_switch(), TieBreak::LowestId).unwrap();
        let second = Orientations::propagate(&single_switch().clone(), TieBreak::LowestId).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn assignment_never_overwrites() {
        let topo = single_switch();
        let mut o = Orientations::propagate(&topo, TieBreak::LowestId).unwrap();
        let before = *o.get("B").unwrap();
        assert!(!o.assign("B", state(before.orientation.opposite(), before.diverts_in_direction.opposite())));
        assert_eq!(o.get("B"), Some(&before));
    }

    #[test]
    fn turnout_side_wins() {
        let mut topo = single_switch();
        topo.nodes["B"].turnout_side = Some(Side::Right);
        topo.nodes["C"].turnout_side = Some(Side::Right);
        let o = Orientations::propagate(&topo, TieBreak::LowestId).unwrap();
        // the seed is fixed, later nodes follow their configured side
        assert_eq!(o.get("B").unwrap().orientation, Orientation::Left);
        assert_eq!(o.get("C").unwrap().orientation, Orientation::Right);
    }

    #[test]
    fn slot_rules() {
        let mut n = Node::new("n");
        let mut m = Node::new("m");
        n.left = Some("m".into());
        m.left = Some("n".into());
        assert_eq!(orientation_from_slots(&n, &m), Some(Orientation::Left));
        m.left = None;
        m.right = Some("n".into());
        assert_eq!(orientation_from_slots(&n, &m), Some(Orientation::Left));
        n.left = None;
        n.right = Some("m".into());
        assert_eq!(orientation_from_slots(&n, &m), Some(Orientation::Right));
        m.right = None;
        m.left = Some("n".into());
        assert_eq!(orientation_from_slots(&n, &m), Some(Orientation::Right));
        n.right = None;
        assert_eq!(orientation_from_slots(&n, &m), None);
    }

    #[test]
    fn neighbour_inference_head_to_head() {
        let topo = build(
            &["M", "H", "L", "R"],
            &[
                ("M", Slot::Head, "H", Slot::Head),
                ("M", Slot::Left, "L", Slot::Right),
                ("M", Slot::Right, "R", Slot::Head),
            ],
            &[],
        );
        let o = Orientations::default();
        let m = topo.node("M").unwrap();
        assert_eq!(o.orientation_from_neighbours(&topo, m), Some(Orientation::Right));
    }

    #[test]
    fn neighbour_inference_left_head_classification_gives_no_answer() {
        let topo = build(
            &["M", "H", "L", "R"],
            &[
                ("M", Slot::Head, "H", Slot::Head),
                ("M", Slot::Left, "L", Slot::Head),
                ("M", Slot::Right, "R", Slot::Left),
            ],
            &[],
        );
        let m = topo.node("M").unwrap();
        assert_eq!(Orientations::default().orientation_from_neighbours(&topo, m), None);
    }

    #[test]
    fn neighbour_inference_right_to_right() {
        let topo = build(
            &["M", "H", "R"],
            &[("M", Slot::Head, "H", Slot::Left), ("M", Slot::Right, "R", Slot::Right)],
            &[],
        );
        let m = topo.node("M").unwrap();
        let mut o = Orientations::default();
        assert_eq!(o.orientation_from_neighbours(&topo, m), Some(Orientation::Left));
        o.assign("R", state(Orientation::Right, Direction::Normal));
        assert_eq!(o.orientation_from_neighbours(&topo, m), Some(Orientation::Right));
    }

    #[test]
    fn loops_terminate() {
        // a -- b, with b's branches both reaching c and c returning to b
        let topo = build(
            &["a", "b", "c", "d"],
            &[
                ("a", Slot::Head, "b", Slot::Head),
                ("b", Slot::Left, "c", Slot::Left),
                ("b", Slot::Right, "c", Slot::Right),
                ("c", Slot::Head, "d", Slot::Head),
            ],
            &[("a-b", "a", "b"), ("b-c-1", "b", "c"), ("b-c-2", "b", "c"), ("c-d", "c", "d")],
        );
        let o = Orientations::propagate(&topo, TieBreak::LowestId).unwrap();
        assert_eq!(o.len(), 4);
    }

    #[test]
    fn disconnected_topology_is_rejected() {
        let topo = build(
            &["a", "b", "x", "y"],
            &[("a", Slot::Head, "b", Slot::Head), ("x", Slot::Head, "y", Slot::Head)],
            &[("a-b", "a", "b"), ("x-y", "x", "y")],
        );
        let err = Orientations::propagate(&topo, TieBreak::LowestId).unwrap_err();
        assert!(matches!(err, ExportError::Disconnected { element } if element == "x"));
    }

    #[test]
    fn start_without_neighbour_is_rejected() {
        let topo = build(&["a", "b"], &[], &[("a-b", "a", "b")]);
        let err = Orientations::propagate(&topo, TieBreak::LowestId).unwrap_err();
        assert!(matches!(err, ExportError::StartNodeWithoutNeighbour { .. }));
    }

    #[test]
    fn empty_topology_has_no_orientations() {
        assert!(Orientations::propagate(&Topology::new(), TieBreak::LowestId).unwrap().is_empty());
    }
}
