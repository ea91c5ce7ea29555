use circuitlab_core::{ComponentKind, Point};

use crate::common::{session, terminal};

#[test]
fn test_history_starts_empty() {
    let s = session();
    assert!(!s.history().can_undo());
    assert!(!s.history().can_redo());
    assert_eq!(s.history().undo_depth(), 0);
    assert_eq!(s.history().redo_depth(), 0);
    assert_eq!(s.history().max_depth(), 100);
}

#[test]
fn test_every_structural_edit_is_one_step() {
    let mut s = session();
    let bat = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let led = s.add_component(ComponentKind::Led, Point::new(200.0, 0.0)).unwrap();
    let wire = s
        .add_wire(terminal(s.graph(), &bat, 0), terminal(s.graph(), &led, 0))
        .unwrap();
    s.rotate_component(&led, 1);
    s.set_component_value(&bat, "4.5 V");
    s.remove_wire(&wire);
    s.remove_component(&led);
    assert_eq!(s.history().undo_depth(), 7);

    while s.undo() {}
    assert!(s.graph().is_empty());
    assert_eq!(s.history().redo_depth(), 7);
}

#[test]
fn test_undo_restores_cascaded_wires() {
    let mut s = session();
    let bat = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let r = s.add_component(ComponentKind::Resistor, Point::new(100.0, 0.0)).unwrap();
    s.add_wire(terminal(s.graph(), &bat, 0), terminal(s.graph(), &r, 0)).unwrap();
    s.add_wire(terminal(s.graph(), &bat, 1), terminal(s.graph(), &r, 1)).unwrap();
    let before = s.project();

    s.remove_component(&r);
    assert_eq!(s.graph().wire_count(), 0);

    s.undo();
    assert_eq!(s.project(), before);
}

#[test]
fn test_redo_after_undo() {
    let mut s = session();
    s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let after = s.project();

    assert!(s.undo());
    assert!(s.history().can_redo());
    assert!(s.redo());
    assert_eq!(s.project(), after);
    assert!(!s.history().can_redo());
    assert!(!s.redo());
}

#[test]
fn test_new_edit_after_undo_clears_redo() {
    let mut s = session();
    s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    s.undo();
    s.add_component(ComponentKind::Resistor, Point::zero()).unwrap();

    assert!(!s.history().can_redo());
    assert_eq!(s.history().undo_depth(), 1);
}

#[test]
fn test_project_load_is_undoable() {
    let mut s = session();
    s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
    let original = s.project();

    let mut other = session();
    other.add_component(ComponentKind::Speaker, Point::new(60.0, 60.0)).unwrap();
    s.load_project(other.project());
    assert_eq!(s.project(), other.project());

    s.undo();
    assert_eq!(s.project(), original);
}
