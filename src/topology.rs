use indexmap::IndexMap;
use itertools::Itertools;
use log::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use trackmodel::{Edge, Id, SignalDirection, Topology};

use crate::adjacency::edges_by_node;
use crate::config::{ExportConfig, SectionsKey};
use crate::error::Result;
use crate::orientation::Direction;

//
// Inventory records in the field naming of the interlocking UI.
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    #[serde(rename = "anschlussA")]
    pub anschluss_a: Option<Id>,
    #[serde(rename = "anschlussB")]
    pub anschluss_b: Option<Id>,
    pub id: Id,
    #[serde(rename = "knotenA")]
    pub knoten_a: Option<Id>,
    #[serde(rename = "knotenB")]
    pub knoten_b: Option<Id>,
    pub laenge: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub art: String,
    pub edge: Id,
    pub funktion: String,
    pub id: Id,
    pub name: String,
    pub offset: f64,
    #[serde(rename = "rastaId")]
    pub rasta_id: u64,
    pub wirkrichtung: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    pub id: Id,
    pub name: String,
    pub node: String,
    #[serde(rename = "rastaId")]
    pub rasta_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxleCountingHead {
    pub edge: Id,
    pub id: Id,
    pub limits: Vec<Id>,
    pub name: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacancySectionRecord {
    pub id: Id,
    pub limits: Vec<Id>,
    pub name: String,
    #[serde(rename = "rastaId")]
    pub rasta_id: Option<u64>,
    #[serde(rename = "tpsName")]
    pub tps_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub id: Id,
    pub start: Id,
    pub end: Id,
    pub points: Vec<Id>,
    pub tvps: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyExport {
    pub edges: IndexMap<Id, EdgeRecord>,
    pub nodes: IndexMap<Id, NodeRecord>,
    pub points: IndexMap<Id, PointRecord>,
    pub signals: IndexMap<Id, SignalRecord>,
    pub axle_counting_heads: IndexMap<Id, AxleCountingHead>,
    pub routes: IndexMap<Id, RouteRecord>,
    pub track_vacancy_sections: IndexMap<Id, VacancySectionRecord>,
    pub sections_key: SectionsKey,
}

impl Serialize for TopologyExport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("edges", &self.edges)?;
        map.serialize_entry("nodes", &self.nodes)?;
        map.serialize_entry("points", &self.points)?;
        map.serialize_entry("signals", &self.signals)?;
        map.serialize_entry("axleCountingHeads", &self.axle_counting_heads)?;
        map.serialize_entry(self.sections_key.as_str(), &self.routes)?;
        map.serialize_entry("trackVacancySections", &self.track_vacancy_sections)?;
        map.end()
    }
}

/// First eight characters of an id, used where the UI wants a short label.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Two heads per edge, one near each end, limiting the edge's vacancy section.
pub fn axle_counting_heads(topology: &Topology, config: &ExportConfig) -> Result<IndexMap<Id, AxleCountingHead>> {
    let mut heads = IndexMap::new();
    if !config.axle_counting_heads {
        return Ok(heads);
    }
    let [left, right] = config.axle_counting_head_positions;

    for edge in topology.edges.values() {
        let signals = topology.signals_on(edge)?;
        let label = |name: Option<&String>| name.cloned().unwrap_or_else(|| short_id(&edge.id));
        let limits: Vec<Id> = edge.vacancy_section.iter().cloned().collect();

        let head_l = AxleCountingHead {
            edge: edge.id.clone(),
            id: format!("{}-ach-l", edge.id),
            limits: limits.clone(),
            name: format!("{} / L", label(signals.first().and_then(|s| s.name.as_ref()))),
            position: left,
        };
        let head_r = AxleCountingHead {
            edge: edge.id.clone(),
            id: format!("{}-ach-r", edge.id),
            limits,
            name: format!("{} / R", label(signals.last().and_then(|s| s.name.as_ref()))),
            position: right,
        };
        heads.insert(head_l.id.clone(), head_l);
        heads.insert(head_r.id.clone(), head_r);
    }
    Ok(heads)
}

fn edge_record(edge: &Edge) -> EdgeRecord {
    EdgeRecord {
        anschluss_a: None,
        anschluss_b: None,
        id: edge.id.clone(),
        knoten_a: None,
        knoten_b: None,
        laenge: edge.length.map(|l| l.trunc() as i64),
    }
}

/// Compound node ids: one per pair of edges meeting at a node, named by
/// joining the two edge ids with a dot.
pub fn compound_nodes(topology: &Topology) -> IndexMap<Id, NodeRecord> {
    let mut nodes = IndexMap::new();
    for edges in edges_by_node(topology.edges.values()).values() {
        if edges.len() < 2 {
            continue;
        }
        for (a, b) in edges.iter().tuple_combinations() {
            let id = format!("{}.{}", a.id, b.id);
            nodes.insert(id.clone(), NodeRecord { id });
        }
    }
    nodes
}

pub fn export_topology(
    topology: &Topology,
    heads: &IndexMap<Id, AxleCountingHead>,
    config: &ExportConfig,
) -> Result<TopologyExport> {
    let edges = topology
        .edges
        .values()
        .map(|e| (e.id.clone(), edge_record(e)))
        .collect();

    let signals = topology
        .signals
        .values()
        .map(|s| {
            let record = SignalRecord {
                art: s.kind.to_string(),
                edge: s.edge.clone(),
                funktion: s.function.to_string(),
                id: s.id.clone(),
                name: s.name.clone().unwrap_or_default(),
                offset: s.distance_edge,
                rasta_id: config.signal_rasta_id,
                wirkrichtung: match s.direction {
                    SignalDirection::In => Direction::Normal,
                    SignalDirection::Gegen => Direction::Reverse,
                },
            };
            (s.id.clone(), record)
        })
        .collect();

    // qualifying points need all three slots, reciprocated or not
    let points = topology
        .nodes
        .values()
        .filter(|n| n.head.is_some() && n.left.is_some() && n.right.is_some())
        .map(|n| {
            let record = PointRecord {
                id: n.id.clone(),
                name: n.name.clone().unwrap_or_default(),
                node: String::new(),
                rasta_id: None,
            };
            (n.id.clone(), record)
        })
        .collect();

    let mut track_vacancy_sections: IndexMap<Id, VacancySectionRecord> = IndexMap::new();
    for edge in topology.edges.values() {
        let section = match &edge.vacancy_section {
            Some(section) => section,
            None => continue,
        };
        let limits = heads.values().filter(|h| h.edge == edge.id).map(|h| h.id.clone());
        track_vacancy_sections
            .entry(section.clone())
            .or_insert_with(|| VacancySectionRecord {
                id: section.clone(),
                limits: Vec::new(),
                name: config.vacancy_section_name.clone(),
                rasta_id: None,
                tps_name: short_id(&edge.id),
            })
            .limits
            .extend(limits);
    }

    let mut routes = IndexMap::new();
    for route in topology.routes.values() {
        let mut points = Vec::new();
        let mut tvps = Vec::new();
        for edge_id in &route.edges {
            let edge = topology.edge(edge_id)?;
            for node in [&edge.node_a, &edge.node_b] {
                if topology.is_point_id(node) && !points.contains(node) {
                    points.push(node.clone());
                }
            }
            tvps.extend(edge.vacancy_section.iter().cloned());
        }
        let record = RouteRecord {
            id: route.id.clone(),
            start: route.start_signal.clone(),
            end: route.end_signal.clone(),
            points,
            tvps,
        };
        routes.insert(route.id.clone(), record);
    }

    let export = TopologyExport {
        edges,
        nodes: compound_nodes(topology),
        points,
        signals,
        axle_counting_heads: heads.clone(),
        routes,
        track_vacancy_sections,
        sections_key: config.sections_key,
    };
    debug!(
        "Exported topology: {} edges, {} points, {} signals, {} compound nodes",
        export.edges.len(),
        export.points.len(),
        export.signals.len(),
        export.nodes.len()
    );
    Ok(export)
}
