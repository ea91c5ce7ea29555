//! Editor session: the graph, its history, the transient selection, and
//! the event bus they report to.
//!
//! Every structural edit runs the same sequence:
//! 1. record a history snapshot of the graph as it is now
//! 2. apply the mutation
//! 3. recompute diagnostics
//! 4. publish an [`EditorEvent::Graph`] event, then an
//!    [`EditorEvent::Diagnostics`] event
//!
//! Rejected edits (unknown ids, invalid wires) change nothing, record
//! nothing, and publish nothing.

use std::path::Path;
use std::sync::Arc;

use circuitlab_core::{
    init_standard_catalog, ChangeKind, CircuitSnapshot, ComponentCatalog, ComponentId,
    ComponentKind, DiagnosticMessage, EditorEvent, EventBus, GraphChange, GraphError, Point,
    TerminalRef, WireId,
};
use circuitlab_settings::Config;

use crate::diagnostics::evaluate_diagnostics;
use crate::graph::{ComponentPatch, GraphModel};
use crate::history::HistoryManager;
use crate::serialization;

/// The selected object. A component and a wire are never selected together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Component(ComponentId),
    Wire(WireId),
}

/// One open circuit being edited.
#[derive(Debug)]
pub struct EditorSession {
    graph: GraphModel,
    history: HistoryManager,
    selection: Selection,
    advanced_mode: bool,
    diagnostics: Vec<DiagnosticMessage>,
    bus: Arc<EventBus>,
}

impl EditorSession {
    /// Creates an empty session.
    pub fn new(catalog: Arc<ComponentCatalog>, config: &Config, bus: Arc<EventBus>) -> Self {
        let graph = GraphModel::with_grid_pitch(catalog, config.editor.grid_pitch);
        let diagnostics =
            evaluate_diagnostics(graph.components(), graph.wires(), config.editor.advanced_mode);
        Self {
            graph,
            history: HistoryManager::new(config.editor.history_depth),
            selection: Selection::None,
            advanced_mode: config.editor.advanced_mode,
            diagnostics,
            bus,
        }
    }

    /// Creates an empty session with the standard catalog and default
    /// configuration.
    pub fn standard(bus: Arc<EventBus>) -> Self {
        Self::new(Arc::new(init_standard_catalog()), &Config::default(), bus)
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_component(&self) -> Option<&ComponentId> {
        match &self.selection {
            Selection::Component(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected_wire(&self) -> Option<&WireId> {
        match &self.selection {
            Selection::Wire(id) => Some(id),
            _ => None,
        }
    }

    pub fn select_component(&mut self, id: ComponentId) {
        if self.graph.component(&id).is_some() {
            self.selection = Selection::Component(id);
        }
    }

    pub fn select_wire(&mut self, id: WireId) {
        if self.graph.wire(&id).is_some() {
            self.selection = Selection::Wire(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Places a component and selects it.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownComponentKind`] if the catalog cannot build
    /// `kind`. Nothing is recorded in that case.
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        position: Point,
    ) -> Result<ComponentId, GraphError> {
        if !self.graph.catalog().contains(kind) {
            return Err(GraphError::UnknownComponentKind {
                kind: kind.to_string(),
            });
        }
        self.history.snapshot(&self.graph);
        let id = self.graph.add_component(kind, position)?.id.clone();
        self.selection = Selection::Component(id.clone());
        self.publish_change(ChangeKind::ComponentAdded);
        Ok(id)
    }

    /// Removes a component and every wire attached to it.
    pub fn remove_component(&mut self, id: &ComponentId) -> bool {
        if self.graph.component(id).is_none() {
            return false;
        }
        self.history.snapshot(&self.graph);
        self.graph.remove_component(id);
        self.drop_stale_selection();
        self.publish_change(ChangeKind::ComponentRemoved);
        true
    }

    /// Merges fields into a component as one undoable edit.
    pub fn update_component(&mut self, id: &ComponentId, patch: ComponentPatch) -> bool {
        if patch.is_empty() || self.graph.component(id).is_none() {
            return false;
        }
        self.history.snapshot(&self.graph);
        self.graph.update_component(id, patch);
        self.publish_change(ChangeKind::ComponentUpdated);
        true
    }

    pub fn rotate_component(&mut self, id: &ComponentId, direction: i32) -> bool {
        if self.graph.component(id).is_none() {
            return false;
        }
        self.history.snapshot(&self.graph);
        self.graph.rotate_component(id, direction);
        self.publish_change(ChangeKind::ComponentUpdated);
        true
    }

    pub fn set_component_value(&mut self, id: &ComponentId, value: impl Into<String>) -> bool {
        self.update_component(id, ComponentPatch::value(value))
    }

    /// Moves a component without recording history. Used while dragging; the
    /// drag records a single entry on release with [`commit_snapshot`].
    ///
    /// [`commit_snapshot`]: EditorSession::commit_snapshot
    pub fn move_component(&mut self, id: &ComponentId, position: Point) -> bool {
        match self.graph.component(id) {
            Some(c) if c.position != position => {}
            _ => return false,
        }
        self.graph.update_component(id, ComponentPatch::position(position));
        self.publish_change(ChangeKind::ComponentMoved);
        true
    }

    /// Records a state captured earlier as one undo step.
    pub fn commit_snapshot(&mut self, before: CircuitSnapshot) {
        self.history.record(before);
    }

    /// Connects two terminals. Rejected wires return `None` and change
    /// nothing.
    pub fn add_wire(&mut self, from: TerminalRef, to: TerminalRef) -> Option<WireId> {
        match self.try_add_wire(from, to) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!("Wire rejected: {}", e);
                None
            }
        }
    }

    /// Connects two terminals, reporting why a wire was rejected.
    pub fn try_add_wire(&mut self, from: TerminalRef, to: TerminalRef) -> Result<WireId, GraphError> {
        self.graph.check_wire(&from, &to)?;
        self.history.snapshot(&self.graph);
        let id = self.graph.try_add_wire(from, to)?.id.clone();
        self.publish_change(ChangeKind::WireAdded);
        Ok(id)
    }

    pub fn remove_wire(&mut self, id: &WireId) -> bool {
        if self.graph.wire(id).is_none() {
            return false;
        }
        self.history.snapshot(&self.graph);
        self.graph.remove_wire(id);
        self.drop_stale_selection();
        self.publish_change(ChangeKind::WireRemoved);
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.graph) {
            return false;
        }
        self.drop_stale_selection();
        self.publish_change(ChangeKind::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.graph) {
            return false;
        }
        self.drop_stale_selection();
        self.publish_change(ChangeKind::Redo);
        true
    }

    /// Replaces the graph with a loaded project. The previous graph stays on
    /// the undo stack. Invalid wires and repeated ids are dropped.
    pub fn load_project(&mut self, project: CircuitSnapshot) {
        self.history.snapshot(&self.graph);
        self.graph.load_project(project);
        self.selection = Selection::None;
        self.publish_change(ChangeKind::ProjectLoaded);
    }

    /// The graph in its persisted shape.
    pub fn project(&self) -> CircuitSnapshot {
        self.graph.snapshot()
    }

    pub fn open_project_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let project = serialization::load_project(path)?;
        self.load_project(project);
        Ok(())
    }

    pub fn save_project_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        serialization::save_project(path, &self.graph.snapshot())
    }

    /// Diagnostics for the current graph.
    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    pub fn advanced_mode(&self) -> bool {
        self.advanced_mode
    }

    /// Toggles advanced mode, which silences the short-circuit rule.
    pub fn set_advanced_mode(&mut self, enabled: bool) {
        if self.advanced_mode == enabled {
            return;
        }
        self.advanced_mode = enabled;
        self.refresh_diagnostics();
        self.publish(EditorEvent::Diagnostics(self.diagnostics.clone()));
    }

    fn refresh_diagnostics(&mut self) {
        self.diagnostics = evaluate_diagnostics(
            self.graph.components(),
            self.graph.wires(),
            self.advanced_mode,
        );
    }

    fn drop_stale_selection(&mut self) {
        let stale = match &self.selection {
            Selection::None => false,
            Selection::Component(id) => self.graph.component(id).is_none(),
            Selection::Wire(id) => self.graph.wire(id).is_none(),
        };
        if stale {
            self.selection = Selection::None;
        }
    }

    fn publish_change(&mut self, kind: ChangeKind) {
        self.refresh_diagnostics();
        self.publish(EditorEvent::Graph(GraphChange::new(
            kind,
            self.graph.snapshot(),
        )));
        self.publish(EditorEvent::Diagnostics(self.diagnostics.clone()));
    }

    fn publish(&self, event: EditorEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::trace!("Event not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuitlab_core::{EventCategory, EventFilter};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<ChangeKind>>>);

    impl Recorder {
        fn kinds(&self) -> Vec<ChangeKind> {
            self.0.lock().unwrap().clone()
        }
    }

    fn session() -> (EditorSession, Recorder) {
        let bus = Arc::new(EventBus::new());
        let recorder = Recorder::default();
        let seen = recorder.0.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Graph]),
            move |event| {
                if let EditorEvent::Graph(change) = event {
                    seen.lock().unwrap().push(change.kind);
                }
            },
        );
        (EditorSession::standard(bus), recorder)
    }

    #[test]
    fn test_add_component_selects_and_publishes() {
        let (mut s, recorder) = session();
        let id = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();

        assert_eq!(s.selected_component(), Some(&id));
        assert_eq!(s.history().undo_depth(), 1);
        assert_eq!(recorder.kinds(), vec![ChangeKind::ComponentAdded]);
        assert!(s.diagnostics().iter().any(|d| d.id == "no-wires"));
    }

    #[test]
    fn test_rejected_edits_record_nothing() {
        let (mut s, recorder) = session();
        let id = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
        let terminal = {
            let c = s.graph().component(&id).unwrap();
            c.terminal_ref(&c.terminals[0])
        };

        assert!(s.add_wire(terminal.clone(), terminal).is_none());
        assert!(!s.remove_component(&ComponentId::from("ghost")));
        assert!(!s.remove_wire(&WireId::from("ghost")));
        assert_eq!(s.history().undo_depth(), 1);
        assert_eq!(recorder.kinds().len(), 1);
    }

    #[test]
    fn test_undo_drops_stale_selection() {
        let (mut s, recorder) = session();
        s.add_component(ComponentKind::Led, Point::zero()).unwrap();
        assert!(s.selected_component().is_some());

        assert!(s.undo());
        assert_eq!(s.selection(), &Selection::None);
        assert_eq!(s.diagnostics().len(), 1);
        assert_eq!(
            recorder.kinds(),
            vec![ChangeKind::ComponentAdded, ChangeKind::Undo]
        );
    }

    #[test]
    fn test_move_records_no_history() {
        let (mut s, _) = session();
        let id = s.add_component(ComponentKind::Resistor, Point::zero()).unwrap();
        let before = s.project();

        assert!(s.move_component(&id, Point::new(40.0, 20.0)));
        assert!(!s.move_component(&id, Point::new(40.0, 20.0)));
        assert_eq!(s.history().undo_depth(), 1);

        s.commit_snapshot(before.clone());
        assert!(s.undo());
        assert_eq!(s.project(), before);
    }

    #[test]
    fn test_advanced_mode_recomputes_diagnostics() {
        let (mut s, _) = session();
        let bat = s.add_component(ComponentKind::Battery, Point::zero()).unwrap();
        let r = s.add_component(ComponentKind::Resistor, Point::new(100.0, 0.0)).unwrap();
        let (b0, b1, r0, r1) = {
            let bat = s.graph().component(&bat).unwrap();
            let r = s.graph().component(&r).unwrap();
            (
                bat.terminal_ref(&bat.terminals[0]),
                bat.terminal_ref(&bat.terminals[1]),
                r.terminal_ref(&r.terminals[0]),
                r.terminal_ref(&r.terminals[1]),
            )
        };
        s.add_wire(b0, r0).unwrap();
        s.add_wire(b1, r1).unwrap();
        assert!(s.diagnostics().iter().any(|d| d.id == "possible-short"));

        s.set_advanced_mode(true);
        assert!(s.diagnostics().is_empty());
    }
}
