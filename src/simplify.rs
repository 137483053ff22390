use itertools::Itertools;
use log::*;
use ordered_float::OrderedFloat;

use trackmodel::{Edge, Id, Slot, Topology};

use crate::error::Result;

/// Removes connector nodes that join exactly two edges, merging the two edges
/// into one. Returns the ids of the removed nodes.
///
/// Signals keep their order along the track: positions are re-expressed on the
/// merged edge in proportion to the edge lengths (equal weights when unknown),
/// and a signal on an edge traversed against its own sense gets its position
/// mirrored and its direction flipped. Zero total length counts as unknown.
/// The merged edge keeps a vacancy section, and routes refer to it in place
/// of the section of the removed edge.
pub fn simplify(topology: &mut Topology) -> Result<Vec<Id>> {
    let candidates: Vec<Id> = topology.nodes.keys().cloned().collect();
    let mut removed = Vec::new();

    for node in candidates {
        if let Some((first, second)) = mergeable_edges(topology, &node) {
            merge(topology, &node, &first, &second)?;
            removed.push(node);
        }
    }

    info!("Simplification removed {} connector nodes", removed.len());
    Ok(removed)
}

/// The two edges meeting at `node`, in edge order, when `node` is a plain
/// connector between two different neighbours.
fn mergeable_edges(topology: &Topology, node: &str) -> Option<(Id, Id)> {
    let n = topology.nodes.get(node)?;
    if n.neighbours().len() != 2 {
        return None;
    }
    let incident: Vec<&Edge> = topology.edges.values().filter(|e| e.touches(node)).collect();
    match incident.as_slice() {
        &[first, second] => {
            if first.node_a == first.node_b || second.node_a == second.node_b {
                return None;
            }
            if first.other_end(node) == second.other_end(node) {
                return None;
            }
            Some((first.id.clone(), second.id.clone()))
        }
        _ => None,
    }
}

fn merge(topology: &mut Topology, node: &str, first: &str, second: &str) -> Result<()> {
    let e1 = topology.edge(first)?.clone();
    let e2 = topology.edge(second)?.clone();
    let start = e1.other_end(node).clone();
    let end = e2.other_end(node).clone();
    debug!("Merging {} and {} over {} into {} -- {}", first, second, node, start, end);

    let (w1, w2) = match (e1.length.unwrap_or(1.0), e2.length.unwrap_or(1.0)) {
        (w1, w2) if w1 + w2 > 0.0 => (w1, w2),
        _ => (1.0, 1.0),
    };
    let total = w1 + w2;

    // e1 runs start -> node when node is its node_b
    let e1_forward = e1.node_b == node;
    let e2_forward = e2.node_a == node;
    for (edge, forward, offset, weight) in [(&e1, e1_forward, 0.0, w1), (&e2, e2_forward, w1, w2)] {
        for signal_id in &edge.signals {
            let signal = topology
                .signals
                .get_mut(signal_id)
                .ok_or_else(|| trackmodel::ModelError::UnknownSignal(signal_id.clone()))?;
            let along = if forward {
                signal.distance_edge
            } else {
                signal.direction = signal.direction.opposite();
                1.0 - signal.distance_edge
            };
            signal.distance_edge = (offset + along * weight) / total;
            signal.edge = e1.id.clone();
        }
    }

    let mut signals: Vec<Id> = e1.signals.iter().chain(e2.signals.iter()).cloned().collect();
    signals.sort_by_key(|s| OrderedFloat(topology.signals.get(s).map_or(0.0, |s| s.distance_edge)));

    if let Some(merged) = topology.edges.get_mut(first) {
        merged.node_a = start.clone();
        merged.node_b = end.clone();
        merged.length = match (e1.length, e2.length) {
            (Some(l1), Some(l2)) => Some(l1 + l2),
            _ => None,
        };
        merged.signals = signals;
        if merged.vacancy_section.is_none() {
            merged.vacancy_section = e2.vacancy_section.clone();
        }
    }
    topology.remove_edge(second);
    let merged_section = topology.edge(first)?.vacancy_section.clone();

    repoint(topology, &start, node, &end);
    repoint(topology, &end, node, &start);
    topology.remove_node(node);

    for route in topology.routes.values_mut() {
        for e in route.edges.iter_mut() {
            if e.as_str() == second {
                *e = first.to_string();
            }
        }
        route.edges.dedup();

        if let (Some(gone), Some(kept)) = (&e2.vacancy_section, &merged_section) {
            for s in route.vacancy_sections.iter_mut() {
                if s == gone {
                    *s = kept.clone();
                }
            }
        }
        route.vacancy_sections = std::mem::take(&mut route.vacancy_sections).into_iter().unique().collect();
    }

    if let Some(gone) = &e2.vacancy_section {
        if !topology.edges.values().any(|e| e.vacancy_section.as_ref() == Some(gone)) {
            debug!("Dropping vacancy section {} left without edges", gone);
            topology.vacancy_sections.shift_remove(gone);
        }
    }
    Ok(())
}

/// Points every slot of `anchor` that refers to `from` at `to` instead.
fn repoint(topology: &mut Topology, anchor: &str, from: &str, to: &str) {
    if let Some(n) = topology.nodes.get_mut(anchor) {
        for slot in Slot::ALL {
            let target = n.slot_mut(slot);
            if target.as_deref() == Some(from) {
                *target = Some(to.to_string());
            }
        }
    }
}
