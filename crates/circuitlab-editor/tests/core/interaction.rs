//! Canvas gestures end to end. The default viewport has zoom 1 and no pan,
//! so screen and world coordinates coincide.

use std::sync::Arc;

use circuitlab_core::{
    ChangeKind, ComponentId, ComponentKind, EditorEvent, EventBus, Point, Rotation,
};
use circuitlab_editor::{
    ContextAction, ContextTarget, EditorSession, InteractionEngine, InteractionOutcome,
    InteractionState, Key, PointerButton, Selection,
};

use crate::common::session;

const BATTERY_PLUS: Point = Point::new(68.0, 100.0);
const BATTERY_MINUS: Point = Point::new(132.0, 100.0);
const RESISTOR_A: Point = Point::new(272.0, 100.0);
const RESISTOR_B: Point = Point::new(328.0, 100.0);

/// Battery at (100, 100) and resistor at (300, 100), no wires.
fn bench() -> (EditorSession, InteractionEngine, ComponentId, ComponentId) {
    let mut s = session();
    let bat = s.add_component(ComponentKind::Battery, Point::new(100.0, 100.0)).unwrap();
    let res = s.add_component(ComponentKind::Resistor, Point::new(300.0, 100.0)).unwrap();
    s.clear_selection();
    (s, InteractionEngine::default(), bat, res)
}

fn connect(s: &mut EditorSession, e: &mut InteractionEngine, from: Point, to: Point) -> InteractionOutcome {
    e.pointer_down(s, from, PointerButton::Primary);
    e.pointer_up(s, from);
    e.pointer_down(s, to, PointerButton::Primary)
}

#[test]
fn test_palette_drop_places_snapped_component() {
    let mut s = session();
    let mut e = InteractionEngine::default();
    e.viewport_mut().set_pan(100.0, 0.0);

    let outcome = e
        .place_component(&mut s, ComponentKind::Capacitor, Point::new(153.0, 47.0))
        .unwrap();
    let InteractionOutcome::ComponentPlaced(id) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(s.graph().component(&id).unwrap().position, Point::new(60.0, 40.0));
    assert_eq!(s.selected_component(), Some(&id));
}

#[test]
fn test_drag_snaps_and_records_one_step() {
    let (mut s, mut e, bat, _) = bench();
    let depth = s.history().undo_depth();

    let outcome = e.pointer_down(&mut s, Point::new(100.0, 105.0), PointerButton::Primary);
    assert_eq!(outcome, InteractionOutcome::ComponentSelected(bat.clone()));
    assert_eq!(s.selection(), &Selection::Component(bat.clone()));

    e.pointer_move(&mut s, Point::new(143.0, 112.0));
    assert_eq!(s.graph().component(&bat).unwrap().position, Point::new(140.0, 100.0));
    e.pointer_move(&mut s, Point::new(161.0, 130.0));
    assert_eq!(s.graph().component(&bat).unwrap().position, Point::new(160.0, 120.0));
    assert_eq!(s.history().undo_depth(), depth);

    let outcome = e.pointer_up(&mut s, Point::new(161.0, 130.0));
    assert_eq!(outcome, InteractionOutcome::DragCommitted(bat.clone()));
    assert!(e.is_idle());
    assert_eq!(s.history().undo_depth(), depth + 1);

    s.undo();
    assert_eq!(s.graph().component(&bat).unwrap().position, Point::new(100.0, 100.0));
}

#[test]
fn test_click_without_motion_records_nothing() {
    let (mut s, mut e, _, _) = bench();
    let depth = s.history().undo_depth();

    e.pointer_down(&mut s, Point::new(100.0, 105.0), PointerButton::Primary);
    e.pointer_move(&mut s, Point::new(104.0, 108.0));
    let outcome = e.pointer_up(&mut s, Point::new(104.0, 108.0));

    assert_eq!(outcome, InteractionOutcome::Nothing);
    assert_eq!(s.history().undo_depth(), depth);
}

#[test]
fn test_drag_publishes_moves() {
    let bus = Arc::new(EventBus::new());
    let mut rx = bus.receiver();
    let mut s = EditorSession::standard(bus);
    let mut e = InteractionEngine::default();
    s.add_component(ComponentKind::Battery, Point::new(100.0, 100.0)).unwrap();

    e.pointer_down(&mut s, Point::new(100.0, 105.0), PointerButton::Primary);
    e.pointer_move(&mut s, Point::new(140.0, 105.0));
    e.pointer_move(&mut s, Point::new(180.0, 105.0));
    e.pointer_up(&mut s, Point::new(180.0, 105.0));

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let EditorEvent::Graph(change) = event {
            kinds.push(change.kind);
        }
    }
    assert_eq!(
        kinds,
        vec![
            ChangeKind::ComponentAdded,
            ChangeKind::ComponentMoved,
            ChangeKind::ComponentMoved
        ]
    );
}

#[test]
fn test_escape_during_drag_restores_origin() {
    let (mut s, mut e, bat, _) = bench();
    let depth = s.history().undo_depth();

    e.pointer_down(&mut s, Point::new(100.0, 105.0), PointerButton::Primary);
    e.pointer_move(&mut s, Point::new(200.0, 205.0));
    assert_eq!(e.key_down(&mut s, Key::Escape), InteractionOutcome::DragCancelled);

    assert!(e.is_idle());
    assert_eq!(s.graph().component(&bat).unwrap().position, Point::new(100.0, 100.0));
    assert_eq!(s.history().undo_depth(), depth);
    assert_eq!(e.pointer_up(&mut s, Point::new(200.0, 205.0)), InteractionOutcome::Nothing);
}

#[test]
fn test_click_click_wire() {
    let (mut s, mut e, bat, res) = bench();

    let outcome = e.pointer_down(&mut s, BATTERY_MINUS, PointerButton::Primary);
    assert!(matches!(outcome, InteractionOutcome::DraftStarted(ref t) if t.component_id == bat));
    assert_eq!(e.pointer_up(&mut s, BATTERY_MINUS), InteractionOutcome::Nothing);
    assert!(e.draft().is_some());

    assert_eq!(e.pointer_move(&mut s, Point::new(200.0, 150.0)), InteractionOutcome::DraftMoved);
    let path = e.preview_path(s.graph()).unwrap();
    assert_eq!(path.first(), Some(&BATTERY_MINUS));
    assert_eq!(path.last(), Some(&Point::new(200.0, 150.0)));

    let outcome = e.pointer_down(&mut s, RESISTOR_A, PointerButton::Primary);
    let InteractionOutcome::WireCreated(id) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert!(e.is_idle());
    let wire = s.graph().wire(&id).unwrap();
    assert_eq!(wire.from.component_id, bat);
    assert_eq!(wire.to.component_id, res);
    assert!(!wire.draft);
}

#[test]
fn test_drag_to_connect() {
    let (mut s, mut e, _, res) = bench();

    e.pointer_down(&mut s, BATTERY_MINUS, PointerButton::Primary);
    e.pointer_move(&mut s, Point::new(270.0, 103.0));
    let hovered = e.hovered_terminal().cloned().unwrap();
    assert_eq!(hovered.component_id, res);
    assert_eq!(e.draft().unwrap().preview_wire().to, hovered);

    let outcome = e.pointer_up(&mut s, Point::new(270.0, 103.0));
    assert!(matches!(outcome, InteractionOutcome::WireCreated(_)));
    assert_eq!(s.graph().wire_count(), 1);
    assert!(e.hovered_terminal().is_none());
}

#[test]
fn test_duplicate_wire_is_rejected() {
    let (mut s, mut e, _, _) = bench();
    connect(&mut s, &mut e, BATTERY_MINUS, RESISTOR_A);
    let depth = s.history().undo_depth();

    let outcome = connect(&mut s, &mut e, RESISTOR_A, BATTERY_MINUS);
    assert_eq!(outcome, InteractionOutcome::WireRejected);
    assert!(e.is_idle());
    assert_eq!(s.graph().wire_count(), 1);
    assert_eq!(s.history().undo_depth(), depth);
}

#[test]
fn test_releasing_on_start_terminal_keeps_draft_and_second_press_cancels() {
    let (mut s, mut e, _, _) = bench();

    e.pointer_down(&mut s, BATTERY_PLUS, PointerButton::Primary);
    e.pointer_up(&mut s, BATTERY_PLUS);
    let outcome = e.pointer_down(&mut s, BATTERY_PLUS, PointerButton::Primary);

    assert_eq!(outcome, InteractionOutcome::DraftCancelled);
    assert!(e.is_idle());
    assert_eq!(s.graph().wire_count(), 0);
}

#[test]
fn test_pressing_empty_space_while_drafting_cancels() {
    let (mut s, mut e, _, _) = bench();
    e.pointer_down(&mut s, BATTERY_PLUS, PointerButton::Primary);
    e.pointer_up(&mut s, BATTERY_PLUS);

    let outcome = e.pointer_down(&mut s, Point::new(700.0, 700.0), PointerButton::Primary);
    assert_eq!(outcome, InteractionOutcome::DraftCancelled);
    assert!(e.is_idle());
}

#[test]
fn test_secondary_press_cancels_draft() {
    let (mut s, mut e, _, _) = bench();
    e.pointer_down(&mut s, BATTERY_PLUS, PointerButton::Primary);

    let outcome = e.pointer_down(&mut s, RESISTOR_A, PointerButton::Secondary);
    assert_eq!(outcome, InteractionOutcome::DraftCancelled);
    assert_eq!(s.graph().wire_count(), 0);
}

#[test]
fn test_wire_click_selects_and_delete_key_removes() {
    let (mut s, mut e, _, _) = bench();
    let InteractionOutcome::WireCreated(id) = connect(&mut s, &mut e, BATTERY_MINUS, RESISTOR_A)
    else {
        panic!("wire not created");
    };
    e.pointer_up(&mut s, RESISTOR_A);

    let outcome = e.pointer_down(&mut s, Point::new(200.0, 104.0), PointerButton::Primary);
    assert_eq!(outcome, InteractionOutcome::WireSelected(id.clone()));
    e.pointer_up(&mut s, Point::new(200.0, 104.0));

    assert_eq!(e.key_down(&mut s, Key::Delete), InteractionOutcome::WireDeleted(id));
    assert_eq!(s.graph().wire_count(), 0);
    assert_eq!(s.selection(), &Selection::None);
    assert_eq!(e.key_down(&mut s, Key::Backspace), InteractionOutcome::Nothing);
}

#[test]
fn test_context_menu_deletes_wire() {
    let (mut s, mut e, _, _) = bench();
    connect(&mut s, &mut e, BATTERY_MINUS, RESISTOR_A);

    let outcome = e.pointer_down(&mut s, Point::new(200.0, 100.0), PointerButton::Secondary);
    let InteractionOutcome::ContextMenuOpened(menu) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert!(matches!(menu.target, ContextTarget::Wire(_)));
    assert_eq!(menu.label(), "Delete wire");
    assert_eq!(menu.anchor, Point::new(200.0, 100.0));

    let outcome = e.choose_context_action(&mut s, ContextAction::DeleteWire);
    assert!(matches!(outcome, InteractionOutcome::WireDeleted(_)));
    assert!(e.is_idle());
    assert_eq!(s.graph().wire_count(), 0);
}

#[test]
fn test_context_menu_edits_terminal_value() {
    let (mut s, mut e, _, res) = bench();

    let outcome = e.pointer_down(&mut s, RESISTOR_B, PointerButton::Secondary);
    let InteractionOutcome::ContextMenuOpened(menu) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(menu.label(), "Edit value");
    assert!(menu.accepts(&ContextAction::EditValue("1 kΩ".into())));
    assert!(!menu.accepts(&ContextAction::DeleteWire));

    let outcome = e.choose_context_action(&mut s, ContextAction::EditValue("1 kΩ".into()));
    assert_eq!(outcome, InteractionOutcome::ValueEdited(res.clone()));
    assert_eq!(s.graph().component(&res).unwrap().value, "1 kΩ");
    assert_eq!(s.selected_component(), Some(&res));
}

#[test]
fn test_context_menu_closes_on_any_press_or_escape() {
    let (mut s, mut e, _, _) = bench();

    e.pointer_down(&mut s, RESISTOR_B, PointerButton::Secondary);
    assert!(e.context_menu().is_some());
    assert_eq!(
        e.pointer_down(&mut s, Point::new(600.0, 600.0), PointerButton::Primary),
        InteractionOutcome::ContextMenuClosed
    );
    assert!(e.is_idle());

    e.pointer_down(&mut s, RESISTOR_B, PointerButton::Secondary);
    assert_eq!(e.key_down(&mut s, Key::Escape), InteractionOutcome::ContextMenuClosed);
    assert!(e.is_idle());
}

#[test]
fn test_secondary_on_empty_space_does_nothing() {
    let (mut s, mut e, _, _) = bench();
    let outcome = e.pointer_down(&mut s, Point::new(600.0, 600.0), PointerButton::Secondary);
    assert_eq!(outcome, InteractionOutcome::Nothing);
    assert!(e.is_idle());
}

#[test]
fn test_pan_on_empty_space() {
    let (mut s, mut e, bat, _) = bench();
    s.select_component(bat);

    let outcome = e.pointer_down(&mut s, Point::new(800.0, 800.0), PointerButton::Primary);
    assert_eq!(outcome, InteractionOutcome::PanStarted);
    assert_eq!(s.selection(), &Selection::None);

    assert_eq!(e.pointer_move(&mut s, Point::new(850.0, 820.0)), InteractionOutcome::Panned);
    assert_eq!(e.viewport().pan(), (50.0, 20.0));
    e.pointer_up(&mut s, Point::new(850.0, 820.0));
    assert!(e.is_idle());

    // World coordinates now follow the pan.
    let outcome = e.pointer_down(&mut s, Point::new(150.0, 125.0), PointerButton::Primary);
    assert!(matches!(outcome, InteractionOutcome::ComponentSelected(_)));
}

#[test]
fn test_wheel_zooms_around_pointer() {
    let mut e = InteractionEngine::default();
    let cursor = Point::new(500.0, 300.0);
    let before = e.viewport().screen_to_world(cursor);

    let InteractionOutcome::Zoomed(zoom) = e.wheel(-100.0, cursor) else {
        panic!("expected zoom");
    };
    assert!((zoom - 1.1).abs() < 1e-9);

    let after = e.viewport().screen_to_world(cursor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn test_rotation_moves_terminal_hit_area() {
    let (mut s, mut e, _, res) = bench();
    s.rotate_component(&res, 1);
    assert_eq!(s.graph().component(&res).unwrap().rotation, Rotation::Deg90);

    // Quarter turn: terminal a moves from (-28, 0) to (0, -28).
    let outcome = e.pointer_down(&mut s, Point::new(300.0, 72.0), PointerButton::Primary);
    assert!(matches!(outcome, InteractionOutcome::DraftStarted(ref t) if t.component_id == res));
    assert_eq!(e.state(), &InteractionState::WireDrafting(e.draft().cloned().unwrap()));
}
