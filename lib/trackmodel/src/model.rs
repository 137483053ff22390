use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// track topology model: nodes with head/left/right neighbour slots,
// undirected edges between them, and the entities placed on edges.
//

pub type Id = String;
pub type IdRef = String;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown node {0}")]
    UnknownNode(IdRef),
    #[error("unknown edge {0}")]
    UnknownEdge(IdRef),
    #[error("unknown signal {0}")]
    UnknownSignal(IdRef),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: Id },
    #[error("malformed topology document: {0}")]
    Document(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub enum Slot {
    Head,
    Left,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Head, Slot::Left, Slot::Right];
}

/// Physical side a turnout branches to, when known independently of the graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub head: Option<IdRef>,
    #[serde(default)]
    pub left: Option<IdRef>,
    #[serde(default)]
    pub right: Option<IdRef>,
    #[serde(default)]
    pub turnout_side: Option<Side>,
}

impl Node {
    pub fn new(id: impl Into<Id>) -> Node {
        Node {
            id: id.into(),
            name: None,
            head: None,
            left: None,
            right: None,
            turnout_side: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Node {
        self.name = Some(name.into());
        self
    }

    pub fn slot(&self, slot: Slot) -> Option<&IdRef> {
        match slot {
            Slot::Head => self.head.as_ref(),
            Slot::Left => self.left.as_ref(),
            Slot::Right => self.right.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<IdRef> {
        match slot {
            Slot::Head => &mut self.head,
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        }
    }

    /// Whether `slot` is set and refers to `other`.
    pub fn points_at(&self, slot: Slot, other: &str) -> bool {
        self.slot(slot).map(|id| id.as_str()) == Some(other)
    }

    /// Set neighbour references in slot order: head, left, right.
    pub fn neighbours(&self) -> Vec<&IdRef> {
        Slot::ALL.iter().filter_map(|s| self.slot(*s)).collect()
    }

    /// The slot of this node that refers to `other`, checking head, right, left.
    pub fn connection_to(&self, other: &str) -> Option<Slot> {
        [Slot::Head, Slot::Right, Slot::Left]
            .iter()
            .copied()
            .find(|s| self.points_at(*s, other))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: Id,
    pub node_a: IdRef,
    pub node_b: IdRef,
    pub length: Option<f64>,
    /// Signal ids in insertion order.
    pub signals: Vec<IdRef>,
    pub vacancy_section: Option<IdRef>,
}

impl Edge {
    pub fn new(id: impl Into<Id>, node_a: impl Into<IdRef>, node_b: impl Into<IdRef>) -> Edge {
        Edge {
            id: id.into(),
            node_a: node_a.into(),
            node_b: node_b.into(),
            length: None,
            signals: Vec::new(),
            vacancy_section: None,
        }
    }

    pub fn with_length(mut self, length: f64) -> Edge {
        self.length = Some(length);
        self
    }

    pub fn touches(&self, node: &str) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The endpoint that is not `node`. For a self-loop this is `node` itself.
    pub fn other_end(&self, node: &str) -> &IdRef {
        if self.node_a != node {
            &self.node_a
        } else {
            &self.node_b
        }
    }

    /// Both endpoints of `other` are endpoints of this edge.
    pub fn parallel_to(&self, other: &Edge) -> bool {
        self.touches(&other.node_a) && self.touches(&other.node_b)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Route {
    pub id: Id,
    pub start_signal: IdRef,
    pub end_signal: IdRef,
    pub edges: Vec<IdRef>,
    #[serde(default)]
    pub vacancy_sections: Vec<IdRef>,
    #[serde(default)]
    pub maximum_speed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct VacancySection {
    pub id: Id,
    #[serde(default)]
    pub name: Option<String>,
}
