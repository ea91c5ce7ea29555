use std::sync::Arc;

use circuitlab_core::{init_standard_catalog, ComponentKind, Point};
use circuitlab_editor::{snap_to_grid, GraphModel};
use proptest::prelude::*;

use crate::common::{session, terminal};

fn kind() -> impl Strategy<Value = ComponentKind> {
    (0..ComponentKind::ALL.len()).prop_map(|i| ComponentKind::ALL[i])
}

fn coordinate() -> impl Strategy<Value = f64> {
    -5000.0..5000.0f64
}

proptest! {
    #[test]
    fn snap_is_idempotent(value in coordinate(), pitch in 1.0..100.0f64) {
        let once = snap_to_grid(value, pitch);
        prop_assert_eq!(snap_to_grid(once, pitch), once);
        prop_assert!((once - value).abs() <= pitch / 2.0 + 1e-9);
    }

    #[test]
    fn placed_components_sit_on_grid(kind in kind(), x in coordinate(), y in coordinate()) {
        let mut graph = GraphModel::new(Arc::new(init_standard_catalog()));
        let placed = graph.add_component(kind, Point::new(x, y)).unwrap();
        prop_assert_eq!(placed.position.x % 20.0, 0.0);
        prop_assert_eq!(placed.position.y % 20.0, 0.0);
    }

    #[test]
    fn repeated_wire_is_added_once(repeats in 1usize..6, reverse in any::<bool>()) {
        let mut s = session();
        let a = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
        let b = s.add_component(ComponentKind::Led, Point::new(200.0, 0.0)).unwrap();
        let from = terminal(s.graph(), &a, 0);
        let to = terminal(s.graph(), &b, 0);

        for i in 0..repeats {
            if reverse && i % 2 == 1 {
                s.add_wire(to.clone(), from.clone());
            } else {
                s.add_wire(from.clone(), to.clone());
            }
        }
        prop_assert_eq!(s.graph().wire_count(), 1);
        prop_assert_eq!(s.history().undo_depth(), 3);
    }

    #[test]
    fn removal_never_leaves_dangling_wires(count in 2usize..7, victim in 0usize..7) {
        let mut s = session();
        let ids: Vec<_> = (0..count)
            .map(|i| {
                s.add_component(ComponentKind::Resistor, Point::new(i as f64 * 100.0, 0.0))
                    .unwrap()
            })
            .collect();
        for pair in ids.windows(2) {
            s.add_wire(terminal(s.graph(), &pair[0], 1), terminal(s.graph(), &pair[1], 0));
        }

        s.remove_component(&ids[victim % count]);
        for wire in s.graph().wires() {
            prop_assert!(s.graph().has_terminal(&wire.from));
            prop_assert!(s.graph().has_terminal(&wire.to));
        }
    }

    #[test]
    fn undo_all_returns_to_start(kinds in prop::collection::vec(kind(), 1..8)) {
        let mut s = session();
        let start = s.project();
        for (i, kind) in kinds.iter().enumerate() {
            s.add_component(*kind, Point::new(i as f64 * 140.0, 0.0)).unwrap();
        }
        let end = s.project();

        for _ in 0..kinds.len() {
            prop_assert!(s.undo());
        }
        prop_assert_eq!(s.project(), start);
        for _ in 0..kinds.len() {
            prop_assert!(s.redo());
        }
        prop_assert_eq!(s.project(), end);
    }
}
