//! # CircuitLab Editor
//!
//! The interactive circuit graph editor: everything between a pointer event
//! on the canvas and a consistent circuit graph.
//!
//! ## Core Components
//!
//! - **Graph Model**: placed components, their terminals, and the wires
//!   between them. Owns identity and the structural invariants
//! - **History**: bounded snapshot-based undo/redo over the graph
//! - **Geometry & Viewport**: grid snapping, wire paths, screen/world mapping
//! - **Hit-Testing**: terminals, component bodies, and wires in world space
//! - **Interaction Engine**: the pointer/keyboard state machine (drag,
//!   wire-drafting, panning, context menus)
//! - **Diagnostics**: rule-based coaching checks over the graph
//! - **Session**: ties the above together and publishes graph changes on an
//!   [`EventBus`](circuitlab_core::EventBus)
//!
//! ## Architecture
//!
//! ```text
//! InteractionEngine (pointer/keys, viewport, hit-testing)
//!   └── EditorSession
//!         ├── GraphModel (components, wires)
//!         ├── HistoryManager (past/future snapshots)
//!         ├── Diagnostics (recomputed after every change)
//!         └── EventBus (Graph + Diagnostics events)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use circuitlab_editor::{EditorSession, InteractionEngine, PointerButton};
//!
//! let mut session = EditorSession::standard(bus);
//! let mut engine = InteractionEngine::new(&config);
//!
//! session.add_component(ComponentKind::Battery, Point::new(0.0, 0.0))?;
//! engine.pointer_down(&mut session, Point::new(640.0, 360.0), PointerButton::Primary);
//! ```

pub mod diagnostics;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod interaction;
pub mod serialization;
pub mod session;
pub mod viewport;

pub use diagnostics::evaluate_diagnostics;
pub use geometry::{point_to_segment_distance, snap_point, snap_to_grid, wire_path, Bounds};
pub use graph::{sanitize_snapshot, ComponentPatch, GraphModel};
pub use history::HistoryManager;
pub use hit_test::{HitTarget, HitTester, TerminalHit};
pub use interaction::{
    ContextAction, ContextMenu, ContextTarget, InteractionEngine, InteractionOutcome,
    InteractionState, Key, PointerButton, WireDraft,
};
pub use serialization::{load_project, project_from_json, project_to_json, save_project};
pub use session::{EditorSession, Selection};
pub use viewport::Viewport;
