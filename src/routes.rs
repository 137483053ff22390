use log::*;
use serde::Serialize;

use trackmodel::{AdditionalSignal, Id, Route, Side, Signal, SignalDirection, SignalKind, SignalState, Slot, Topology};

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportedStates {
    pub main: Vec<SignalState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zs3: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zs3v: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetState {
    pub main: SignalState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zs3: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zs3v: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    Free,
}

/// One element a route needs set before it can be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteState {
    Signal {
        uuid: Id,
        name: Option<String>,
        supported_states: SupportedStates,
        state: TargetState,
    },
    VacancySection {
        uuid: Id,
        state: SectionState,
        previous_signals: Vec<Id>,
    },
    Point {
        uuid: Id,
        state: Side,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteExport {
    pub start_signal: Id,
    pub end_signal: Id,
    pub states: Vec<RouteState>,
}

/// The aspect and speed indication a route's start signal shows.
pub fn signal_state(signal: &Signal, maximum_speed: Option<u32>) -> Result<RouteState> {
    let mut supported = SupportedStates {
        main: signal.supported_states.clone(),
        ..SupportedStates::default()
    };
    let mut zs3 = None;
    let mut zs3v = None;
    let speed_class = maximum_speed.map(|v| v / 10);
    let shown = |symbols: &[u32]| speed_class.filter(|c| symbols.contains(c));

    for additional in &signal.additional_signals {
        match additional {
            AdditionalSignal::Zs3 { symbols } => {
                supported.zs3 = Some(symbols.clone());
                zs3 = shown(symbols);
            }
            AdditionalSignal::Zs3v { symbols } => {
                supported.zs3v = Some(symbols.clone());
                zs3v = shown(symbols);
            }
            // not shown by the interlocking UI
            AdditionalSignal::Zs2 { .. } | AdditionalSignal::Zs2v { .. } => continue,
            AdditionalSignal::Other { symbols } => supported.additional.extend(symbols.iter().cloned()),
        }
    }

    let main = if zs3.is_some() && signal.supports(SignalState::Hp2) {
        SignalState::Hp2
    } else if signal.supports(SignalState::Hp2) && !signal.supports(SignalState::Hp1) {
        SignalState::Hp2
    } else if signal.supports(SignalState::Hp1) {
        SignalState::Hp1
    } else if signal.kind == SignalKind::Mehrabschnittssignal && signal.supports(SignalState::Ks2) {
        SignalState::Ks2
    } else if signal.kind == SignalKind::Hauptsignal && signal.supports(SignalState::Ks1) {
        SignalState::Ks1
    } else {
        return Err(ExportError::UnsupportedMainAspect { signal: signal.id.clone() });
    };

    Ok(RouteState::Signal {
        uuid: signal.id.clone(),
        name: signal.name.clone(),
        supported_states: supported,
        state: TargetState { main, zs3, zs3v },
    })
}

fn vacancy_section_states(topology: &Topology, route: &Route) -> Result<Vec<RouteState>> {
    let mut sections: Vec<&Id> = route.vacancy_sections.iter().collect();
    if sections.is_empty() {
        for edge_id in &route.edges {
            if let Some(section) = &topology.edge(edge_id)?.vacancy_section {
                if !sections.contains(&section) {
                    sections.push(section);
                }
            }
        }
    }

    let mut states = Vec::new();
    for section in sections {
        let mut previous_signals = Vec::new();
        for edge_id in &route.edges {
            let edge = topology.edge(edge_id)?;
            if edge.vacancy_section.as_ref() != Some(section) {
                continue;
            }
            let first_main = topology
                .signals_on(edge)?
                .into_iter()
                .find(|s| s.kind == SignalKind::Hauptsignal);
            if let Some(signal) = first_main {
                previous_signals.push(signal.id.clone());
            }
        }
        states.push(RouteState::VacancySection {
            uuid: section.clone(),
            state: SectionState::Free,
            previous_signals,
        });
    }
    Ok(states)
}

fn branch_towards(topology: &Topology, point: &str, other: &str) -> Result<Option<Side>> {
    let node = topology.node(point)?;
    Ok(if node.points_at(Slot::Left, other) {
        Some(Side::Left)
    } else if node.points_at(Slot::Right, other) {
        Some(Side::Right)
    } else {
        None
    })
}

/// Point positions along the route, walking its edges from behind the start signal.
fn point_states(topology: &Topology, route: &Route, start: &Signal) -> Result<Vec<RouteState>> {
    let start_edge = topology.edge(&start.edge)?;
    let mut previous = match start.direction {
        SignalDirection::In => &start_edge.node_a,
        SignalDirection::Gegen => &start_edge.node_b,
    };

    let mut states = Vec::new();
    for edge_id in &route.edges {
        let edge = topology.edge(edge_id)?;
        let current = if &edge.node_a == previous { &edge.node_b } else { &edge.node_a };

        for (point, other) in [(previous, current), (current, previous)] {
            if let Some(side) = branch_towards(topology, point, other)? {
                states.push(RouteState::Point { uuid: point.clone(), state: side });
            }
        }
        previous = current;
    }
    Ok(states)
}

pub fn export_routes(topology: &Topology) -> Result<Vec<RouteExport>> {
    let mut output = Vec::new();
    for route in topology.routes.values() {
        let start = topology.signal(&route.start_signal)?;

        let mut states = vec![signal_state(start, route.maximum_speed)?];
        states.extend(vacancy_section_states(topology, route)?);
        states.extend(point_states(topology, route, start)?);

        output.push(RouteExport {
            start_signal: route.start_signal.clone(),
            end_signal: route.end_signal.clone(),
            states,
        });
    }
    debug!("Exported {} routes", output.len());
    Ok(output)
}
