use interlocking_exporter::{Direction, ExportConfig, ExportError, Exporter, Orientation, RouteState};
use serde_json::json;
use trackmodel::{Edge, Node, Side, Signal, SignalDirection, SignalFunction, SignalKind, SignalState, Slot, Topology};

// Two points joined by a pair of parallel edges, with a main signal on
// either side and a route running through the upper edge.
const SIMPLE_EXAMPLE: &str = r#"{
    "nodes": [
        {"id": "a", "head": "b"},
        {"id": "b", "head": "a", "left": "f", "right": "f"},
        {"id": "f", "head": "g", "left": "b", "right": "b"},
        {"id": "g", "head": "f"}
    ],
    "edges": [
        {"id": "a-b", "node_a": "a", "node_b": "b", "length": 120.0},
        {"id": "b-f-up", "node_a": "b", "node_b": "f", "length": 80.0},
        {"id": "b-f-straight", "node_a": "b", "node_b": "f", "length": 75.0},
        {"id": "f-g", "node_a": "f", "node_b": "g", "length": 150.0}
    ],
    "signals": [
        {"id": "A", "edge": "a-b", "distance_edge": 0.6, "direction": "in",
         "function": "Einfahr_Signal", "kind": "Hauptsignal", "name": "A",
         "additional_signals": [{"type": "Zs3", "symbols": [4, 6, 8]}]},
        {"id": "N", "edge": "a-b", "distance_edge": 0.2, "direction": "gegen",
         "function": "Ausfahr_Signal", "kind": "Hauptsignal", "name": "N"},
        {"id": "S", "edge": "f-g", "distance_edge": 0.3, "direction": "gegen",
         "function": "Einfahr_Signal", "kind": "Hauptsignal", "name": "S"},
        {"id": "P", "edge": "f-g", "distance_edge": 0.7, "direction": "in",
         "function": "Ausfahr_Signal", "kind": "Hauptsignal", "name": "P"}
    ],
    "routes": [
        {"id": "A-P", "start_signal": "A", "end_signal": "P",
         "edges": ["a-b", "b-f-up", "f-g"], "maximum_speed": 60}
    ]
}"#;

fn simple_example() -> Exporter {
    Exporter::new(Topology::from_json(SIMPLE_EXAMPLE).unwrap(), ExportConfig::default()).unwrap()
}

fn signal(id: &str, edge: &str, d: f64) -> Signal {
    Signal::new(id, edge, d, SignalDirection::In, SignalFunction::Block, SignalKind::Hauptsignal)
}

#[test]
fn linear_topology_has_no_points() {
    let mut topo = Topology::new();
    for n in ["A", "B", "C"] {
        topo.add_node(Node::new(n)).unwrap();
    }
    topo.connect("A", Slot::Head, "B", Slot::Head).unwrap();
    topo.connect("B", Slot::Left, "C", Slot::Head).unwrap();
    topo.add_edge(Edge::new("A-B", "A", "B")).unwrap();
    topo.add_edge(Edge::new("B-C", "B", "C")).unwrap();
    topo.add_signal(signal("s2", "A-B", 0.8)).unwrap();
    topo.add_signal(signal("s1", "A-B", 0.1)).unwrap();
    topo.add_signal(signal("s3", "B-C", 0.5)).unwrap();

    let config = ExportConfig { axle_counting_heads: false, ..ExportConfig::default() };
    let mut exporter = Exporter::new(topo, config).unwrap();
    let topology = exporter.export_topology().unwrap();
    assert_eq!(topology.edges.len(), 2);
    assert!(topology.points.is_empty());
    assert!(topology.axle_counting_heads.is_empty());

    let placement = exporter.export_placement().unwrap();
    assert!(placement.points.is_empty());
    assert_eq!(placement.edges["A-B"].items, vec!["s1", "s2"]);
    assert_eq!(placement.edges["B-C"].items, vec!["s3"]);
}

#[test]
fn single_switch_from_document() {
    let doc = r#"{
        "nodes": [
            {"id": "A", "head": "B"},
            {"id": "B", "head": "A", "left": "C", "right": "D"},
            {"id": "C", "head": "B"},
            {"id": "D", "head": "B"}
        ],
        "edges": [
            {"id": "A-B", "node_a": "A", "node_b": "B"},
            {"id": "B-C", "node_a": "B", "node_b": "C"},
            {"id": "B-D", "node_a": "B", "node_b": "D"}
        ]
    }"#;
    let mut exporter = Exporter::new(Topology::from_json(doc).unwrap(), ExportConfig::default()).unwrap();
    assert!(exporter.orientations().get("B").is_some());

    exporter.export_topology().unwrap();
    let placement = exporter.export_placement().unwrap();
    let b = &placement.points["B"];
    assert_eq!(b.toe, "A-B");
    let mut branches = vec![b.diverting.as_str(), b.through.as_str()];
    branches.sort();
    assert_eq!(branches, vec!["B-C", "B-D"]);
}

#[test]
fn simple_example_placement() {
    let mut exporter = simple_example();
    exporter.export_topology().unwrap();
    let placement = exporter.export_placement().unwrap();

    let b = &placement.points["b"];
    assert_eq!((b.diverting.as_str(), b.through.as_str()), ("b-f-up", "b-f-straight"));
    assert_eq!(b.diverts_in_direction, Direction::Normal);
    assert_eq!(b.orientation, Orientation::Left);

    let f = &placement.points["f"];
    assert_eq!((f.diverting.as_str(), f.through.as_str()), ("b-f-up", "b-f-straight"));
    assert_eq!(f.diverts_in_direction, Direction::Reverse);
    assert_eq!(f.orientation, Orientation::Left);

    for edge in placement.edges.values() {
        assert_eq!(edge.orientation, Some(Direction::Normal));
    }
    assert_eq!(placement.edges["a-b"].items, vec!["a-b-ach-l", "N", "A", "a-b-ach-r", "b"]);
    assert_eq!(placement.edges["f-g"].items, vec!["f", "f-g-ach-l", "S", "P", "f-g-ach-r"]);
    assert_eq!(placement.edges["b-f-up"].items, vec!["b", "b-f-up-ach-l", "b-f-up-ach-r", "f"]);
}

#[test]
fn simple_example_topology() {
    let mut exporter = simple_example();
    let topology = exporter.export_topology().unwrap();
    let json = serde_json::to_value(&topology).unwrap();

    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 7);
    assert_eq!(json["points"].as_object().unwrap().len(), 2);
    assert_eq!(json["nodes"].as_object().unwrap().len(), 5);
    assert!(json["nodes"].get("b-f-up.b-f-straight").is_some());
    assert_eq!(json["axleCountingHeads"].as_object().unwrap().len(), 8);
    // named after the first and last signal attached to the edge
    assert_eq!(json["axleCountingHeads"]["a-b-ach-l"]["name"], "A / L");
    assert_eq!(json["axleCountingHeads"]["a-b-ach-r"]["name"], "N / R");
    assert_eq!(
        json["routes"]["A-P"],
        json!({
            "id": "A-P", "start": "A", "end": "P", "points": ["b", "f"],
            "tvps": ["a-b-tvs", "b-f-up-tvs", "f-g-tvs"]
        })
    );
    assert_eq!(json["trackVacancySections"]["f-g-tvs"]["limits"], json!(["f-g-ach-l", "f-g-ach-r"]));
}

#[test]
fn simple_example_routes() {
    let exporter = simple_example();
    let routes = exporter.export_routes().unwrap();
    assert_eq!(routes.len(), 1);
    let route = &routes[0];
    assert_eq!((route.start_signal.as_str(), route.end_signal.as_str()), ("A", "P"));

    match &route.states[0] {
        RouteState::Signal { uuid, state, .. } => {
            assert_eq!(uuid, "A");
            assert_eq!(state.main, SignalState::Hp2);
            assert_eq!(state.zs3, Some(6));
        }
        other => panic!("route should start with its signal, got {:?}", other),
    }

    let sections: Vec<&str> = route
        .states
        .iter()
        .filter_map(|s| match s {
            RouteState::VacancySection { uuid, .. } => Some(uuid.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(sections, vec!["a-b-tvs", "b-f-up-tvs", "f-g-tvs"]);

    let points: Vec<(&str, Side)> = route
        .states
        .iter()
        .filter_map(|s| match s {
            RouteState::Point { uuid, state } => Some((uuid.as_str(), *state)),
            _ => None,
        })
        .collect();
    assert_eq!(points, vec![("b", Side::Left), ("f", Side::Left)]);
}

#[test]
fn unsupported_start_aspect_fails_the_export() {
    let doc = SIMPLE_EXAMPLE.replace(
        r#""function": "Einfahr_Signal", "kind": "Hauptsignal", "name": "A","#,
        r#""function": "Einfahr_Signal", "kind": "Sperrsignal", "name": "A","#,
    );
    let exporter = Exporter::new(Topology::from_json(&doc).unwrap(), ExportConfig::default()).unwrap();
    let err = exporter.export_routes().unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedMainAspect { signal } if signal == "A"));
}

#[test]
fn placement_before_topology_is_rejected() {
    let exporter = simple_example();
    assert!(matches!(exporter.export_placement(), Err(ExportError::MissingAxleCountingHeads)));
}

#[test]
fn repeated_exports_are_identical() {
    let render = || {
        let mut exporter = simple_example();
        let topology = serde_json::to_string(&exporter.export_topology().unwrap()).unwrap();
        let placement = serde_json::to_string(&exporter.export_placement().unwrap()).unwrap();
        (topology, placement)
    };
    assert_eq!(render(), render());

    let mut exporter = simple_example();
    exporter.export_topology().unwrap();
    let first = exporter.export_placement().unwrap();
    exporter.export_topology().unwrap();
    assert_eq!(exporter.export_placement().unwrap(), first);
}

#[test]
fn simplification_merges_connector_chain() {
    let mut topo = Topology::new();
    for n in ["A", "X", "Y", "B"] {
        topo.add_node(Node::new(n)).unwrap();
    }
    topo.connect("A", Slot::Head, "X", Slot::Head).unwrap();
    topo.connect("X", Slot::Left, "Y", Slot::Head).unwrap();
    topo.connect("Y", Slot::Left, "B", Slot::Head).unwrap();
    topo.add_edge(Edge::new("A-X", "A", "X").with_length(100.0)).unwrap();
    topo.add_edge(Edge::new("X-Y", "X", "Y").with_length(100.0)).unwrap();
    topo.add_edge(Edge::new("Y-B", "Y", "B").with_length(100.0)).unwrap();
    topo.add_signal(signal("s1", "A-X", 0.5)).unwrap();
    topo.add_signal(signal("s2", "X-Y", 0.5)).unwrap();
    topo.add_signal(signal("s3", "Y-B", 0.5)).unwrap();

    let config = ExportConfig { simplify: true, ..ExportConfig::default() };
    let mut exporter = Exporter::new(topo, config).unwrap();
    let merged = exporter.topology();
    assert!(!merged.nodes.contains_key("X"));
    assert!(!merged.nodes.contains_key("Y"));
    assert_eq!(merged.edges.len(), 1);
    let edge = &merged.edges["A-X"];
    assert_eq!((edge.node_a.as_str(), edge.node_b.as_str()), ("A", "B"));
    assert_eq!(edge.signals, vec!["s1", "s2", "s3"]);

    exporter.export_topology().unwrap();
    let placement = exporter.export_placement().unwrap();
    assert_eq!(placement.edges["A-X"].items, vec!["A-X-ach-l", "s1", "s2", "s3", "A-X-ach-r"]);
}

#[test]
fn disconnected_topology_is_rejected() {
    let mut topo = Topology::new();
    for n in ["a", "b", "x", "y"] {
        topo.add_node(Node::new(n)).unwrap();
    }
    topo.connect("a", Slot::Head, "b", Slot::Head).unwrap();
    topo.connect("x", Slot::Head, "y", Slot::Head).unwrap();
    topo.add_edge(Edge::new("a-b", "a", "b")).unwrap();
    topo.add_edge(Edge::new("x-y", "x", "y")).unwrap();

    let err = Exporter::new(topo, ExportConfig::default()).err().unwrap();
    assert!(matches!(err, ExportError::Disconnected { .. }));
}
