use circuitlab_core::{
    init_standard_catalog, ChangeKind, CircuitSnapshot, ComponentId, ComponentKind, EditorEvent,
    Point, TerminalRef, Wire,
};
use circuitlab_editor::{load_project, project_from_json, project_to_json, save_project};
use tempfile::TempDir;

use crate::common::{session, terminal};

#[test]
fn test_save_and_load_preserves_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blinker.json");

    let mut s = session();
    let bat = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let prefab = s
        .add_component(ComponentKind::Prefab555Blinker, Point::new(200.0, 0.0))
        .unwrap();
    s.rotate_component(&prefab, 1);
    s.add_wire(terminal(s.graph(), &bat, 0), terminal(s.graph(), &prefab, 0))
        .unwrap();

    save_project(&path, &s.project()).unwrap();
    let loaded = load_project(&path).unwrap();

    assert_eq!(loaded, s.project());
    let wire = &loaded.wires[0];
    let end = loaded.component(&wire.to.component_id).unwrap();
    assert!(end.terminal(&wire.to.terminal_id).is_some());
}

#[test]
fn test_session_open_replaces_graph_and_publishes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.json");

    let mut source = session();
    source.add_component(ComponentKind::Led, Point::new(40.0, 40.0)).unwrap();
    source.save_project_file(&path).unwrap();

    let mut target = session();
    let mut rx = target.bus().receiver();
    target.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    target.open_project_file(&path).unwrap();

    assert_eq!(target.project(), source.project());
    let kinds: Vec<ChangeKind> = std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|event| match event {
            EditorEvent::Graph(change) => Some(change.kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds.last(), Some(&ChangeKind::ProjectLoaded));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut s = session();
    let err = s
        .open_project_file(dir.path().join("absent.json"))
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read project file"));
    assert!(s.graph().is_empty());
}

#[test]
fn test_json_shape_is_camel_case() {
    let mut s = session();
    let bat = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let r = s.add_component(ComponentKind::Resistor, Point::new(100.0, 0.0)).unwrap();
    s.add_wire(terminal(s.graph(), &bat, 0), terminal(s.graph(), &r, 0)).unwrap();

    let json = project_to_json(&s.project()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["components"][0]["kind"], "battery");
    assert!(value["components"][0]["terminals"][0]["localPosition"].is_object());
    assert!(value["wires"][0]["from"]["componentId"].is_string());
    assert!(value["wires"][0].get("draft").is_none());
}

#[test]
fn test_duplicate_wires_in_file_are_collapsed() {
    let json = r#"{
        "components": [
            {"id": "c1", "kind": "battery", "name": "Battery", "position": {"x": 0, "y": 0},
             "terminals": [{"id": "p", "label": "+", "localPosition": {"x": -32, "y": 0}}],
             "value": "9 V"},
            {"id": "c2", "kind": "led", "name": "LED", "position": {"x": 200, "y": 0},
             "terminals": [{"id": "a", "label": "+", "localPosition": {"x": -26, "y": 0}}],
             "value": "Red"}
        ],
        "wires": [
            {"id": "w1", "from": {"componentId": "c1", "terminalId": "p"},
             "to": {"componentId": "c2", "terminalId": "a"}},
            {"id": "w2", "from": {"componentId": "c2", "terminalId": "a"},
             "to": {"componentId": "c1", "terminalId": "p"}, "draft": true}
        ]
    }"#;
    let project = project_from_json(json).unwrap();
    assert_eq!(project.components.len(), 2);
    assert_eq!(project.wires.len(), 1);
    assert_eq!(project.wires[0].id.as_str(), "w1");
}

#[test]
fn test_session_load_drops_what_the_graph_rejects() {
    let catalog = init_standard_catalog();
    let battery = catalog
        .get(ComponentKind::Battery)
        .unwrap()
        .instantiate(Point::zero());
    let mut resistor = catalog
        .get(ComponentKind::Resistor)
        .unwrap()
        .instantiate(Point::new(200.0, 0.0));
    resistor.terminals.push(resistor.terminals[0].clone());

    let mut clone = battery.clone();
    clone.position = Point::new(400.0, 0.0);

    let a = battery.terminal_ref(&battery.terminals[0]);
    let b = resistor.terminal_ref(&resistor.terminals[0]);
    let ghost = TerminalRef::new(ComponentId::from("ghost"), a.terminal_id.clone());
    let wires = vec![
        Wire::new(a.clone(), b.clone()),
        Wire::new(b.clone(), a.clone()),
        Wire::new(a.clone(), ghost),
        Wire::new(a.clone(), a.clone()),
    ];
    let kept = wires[0].id.clone();

    let mut s = session();
    s.load_project(CircuitSnapshot::new(
        vec![battery.clone(), resistor.clone(), clone],
        wires,
    ));

    let graph = s.graph();
    assert_eq!(graph.component_count(), 2);
    assert_eq!(graph.component(&battery.id).unwrap().position, Point::zero());
    assert_eq!(graph.component(&resistor.id).unwrap().terminals.len(), 2);
    assert_eq!(graph.wire_count(), 1);
    assert_eq!(graph.wires()[0].id, kept);

    assert!(s.undo());
    assert!(s.graph().is_empty());
}
