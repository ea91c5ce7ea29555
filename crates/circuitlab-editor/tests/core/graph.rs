use std::sync::Arc;

use circuitlab_core::{
    init_standard_catalog, ComponentId, ComponentKind, GraphError, Point, Rotation, TerminalId,
    TerminalRef,
};
use circuitlab_editor::{ComponentPatch, GraphModel};

use crate::common::terminal;

fn graph() -> GraphModel {
    GraphModel::new(Arc::new(init_standard_catalog()))
}

#[test]
fn test_every_catalog_kind_can_be_placed() {
    let mut g = graph();
    for (i, kind) in ComponentKind::ALL.into_iter().enumerate() {
        let placed = g
            .add_component(kind, Point::new(i as f64 * 120.0, 0.0))
            .unwrap();
        assert_eq!(placed.kind, kind);
    }
    assert_eq!(g.component_count(), ComponentKind::ALL.len());

    let mut all_terminals: Vec<&TerminalId> = g
        .components()
        .iter()
        .flat_map(|c| c.terminals.iter().map(|t| &t.id))
        .collect();
    let total = all_terminals.len();
    all_terminals.sort();
    all_terminals.dedup();
    assert_eq!(all_terminals.len(), total, "terminal ids must be unique");
}

#[test]
fn test_placement_snaps_to_configured_pitch() {
    let mut g = GraphModel::with_grid_pitch(Arc::new(init_standard_catalog()), 25.0);
    let placed = g
        .add_component(ComponentKind::Diode, Point::new(37.0, 63.0))
        .unwrap();
    assert_eq!(placed.position, Point::new(25.0, 75.0));
}

#[test]
fn test_wire_endpoints_must_exist() {
    let mut g = graph();
    let bat = g.add_component(ComponentKind::Battery, Point::zero()).unwrap().id.clone();
    let good = terminal(&g, &bat, 0);
    let bad_terminal = TerminalRef::new(bat.clone(), TerminalId::from("nope"));

    let err = g.try_add_wire(good, bad_terminal).unwrap_err();
    assert!(matches!(err, GraphError::InvalidWireEndpoint { .. }));
    assert_eq!(g.wire_count(), 0);
}

#[test]
fn test_wire_path_tracks_component_moves() {
    let mut g = graph();
    let bat = g.add_component(ComponentKind::Battery, Point::zero()).unwrap().id.clone();
    let led = g
        .add_component(ComponentKind::Led, Point::new(200.0, 0.0))
        .unwrap()
        .id
        .clone();
    let wire = g
        .add_wire(terminal(&g, &bat, 0), terminal(&g, &led, 0))
        .unwrap()
        .clone();

    let path = g.wire_path(&wire).unwrap();
    assert_eq!(path.first(), Some(&Point::new(-32.0, 0.0)));
    assert_eq!(path.last(), Some(&Point::new(174.0, 0.0)));

    g.update_component(&led, ComponentPatch::position(Point::new(200.0, 100.0)));
    let path = g.wire_path(&wire).unwrap();
    assert_eq!(path.last(), Some(&Point::new(174.0, 100.0)));
}

#[test]
fn test_wire_path_missing_after_cascade() {
    let mut g = graph();
    let bat = g.add_component(ComponentKind::Battery, Point::zero()).unwrap().id.clone();
    let r = g
        .add_component(ComponentKind::Resistor, Point::new(100.0, 0.0))
        .unwrap()
        .id
        .clone();
    let wire = g
        .add_wire(terminal(&g, &bat, 0), terminal(&g, &r, 0))
        .unwrap()
        .clone();

    g.remove_component(&bat);
    assert!(g.wire(&wire.id).is_none());
    assert!(g.wire_path(&wire).is_none());
}

#[test]
fn test_rotated_bounds_and_content_bounds() {
    let mut g = graph();
    assert!(g.content_bounds().is_none());

    let r = g.add_component(ComponentKind::Resistor, Point::zero()).unwrap().id.clone();
    g.rotate_component(&r, 1);
    let c = g.component(&r).unwrap();
    assert_eq!(c.rotation, Rotation::Deg90);

    let bounds = g.component_bounds(c);
    assert_eq!(bounds.width(), 40.0);
    assert_eq!(bounds.height(), 80.0);

    g.add_component(ComponentKind::Battery, Point::new(200.0, 0.0)).unwrap();
    let all = g.content_bounds().unwrap();
    assert_eq!(all.min_x, -20.0);
    assert_eq!(all.max_x, 240.0);
}

#[test]
fn test_snapshot_is_independent() {
    let mut g = graph();
    let id = g.add_component(ComponentKind::Led, Point::zero()).unwrap().id.clone();
    let snapshot = g.snapshot();

    g.set_component_value(&id, "Green");
    assert_eq!(snapshot.components[0].value, "Red");

    g.load_snapshot(snapshot.clone());
    assert_eq!(g.snapshot(), snapshot);

    g.clear();
    assert!(g.is_empty());
    assert!(g.component(&ComponentId::from("anything")).is_none());
}
