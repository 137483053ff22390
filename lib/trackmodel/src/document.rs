use log::*;
use serde::Deserialize;

use crate::model::*;
use crate::signal::*;
use crate::topo::Topology;

//
// JSON input document. Lists instead of maps so that document order
// becomes the insertion order of the topology.
//

#[derive(Debug, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub vacancy_sections: Vec<VacancySection>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeEntry {
    pub id: Id,
    pub node_a: IdRef,
    pub node_b: IdRef,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub vacancy_section: Option<IdRef>,
}

#[derive(Debug, Deserialize)]
pub struct SignalEntry {
    pub id: Id,
    pub edge: IdRef,
    pub distance_edge: f64,
    pub direction: SignalDirection,
    pub function: SignalFunction,
    pub kind: SignalKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Falls back to the defaults of `kind` when absent.
    #[serde(default)]
    pub supported_states: Option<Vec<SignalState>>,
    #[serde(default)]
    pub additional_signals: Vec<AdditionalSignal>,
}

impl Topology {
    pub fn from_json(data: &str) -> Result<Topology, ModelError> {
        let doc: TopologyDocument = serde_json::from_str(data)?;
        Topology::from_document(doc)
    }

    pub fn from_document(doc: TopologyDocument) -> Result<Topology, ModelError> {
        let mut topo = Topology::new();

        for node in doc.nodes {
            topo.add_node(node)?;
        }
        for node in topo.nodes.values() {
            for nb in node.neighbours() {
                topo.node(nb)?;
            }
        }

        for section in doc.vacancy_sections {
            topo.add_vacancy_section(section)?;
        }

        for e in doc.edges {
            if let Some(vs) = &e.vacancy_section {
                if !topo.vacancy_sections.contains_key(vs) {
                    topo.add_vacancy_section(VacancySection { id: vs.clone(), name: None })?;
                }
            }
            topo.add_edge(Edge {
                id: e.id,
                node_a: e.node_a,
                node_b: e.node_b,
                length: e.length,
                signals: Vec::new(),
                vacancy_section: e.vacancy_section,
            })?;
        }

        for s in doc.signals {
            let supported_states = s.supported_states.unwrap_or_else(|| s.kind.default_states());
            topo.add_signal(Signal {
                id: s.id,
                edge: s.edge,
                distance_edge: s.distance_edge,
                direction: s.direction,
                function: s.function,
                kind: s.kind,
                name: s.name,
                supported_states,
                additional_signals: s.additional_signals,
            })?;
        }

        for route in doc.routes {
            topo.add_route(route)?;
        }

        info!(
            "Loaded topology with {} nodes, {} edges, {} signals, {} routes",
            topo.nodes.len(),
            topo.edges.len(),
            topo.signals.len(),
            topo.routes.len()
        );
        Ok(topo)
    }
}
