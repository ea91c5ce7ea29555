//! Pointer and keyboard interaction state machine.
//!
//! The engine turns canvas input into graph edits on an
//! [`EditorSession`]. Pointer positions arrive in screen pixels and are
//! converted to world coordinates before any hit-testing.
//!
//! ```text
//! Idle ──press terminal──▶ WireDrafting ──press other terminal──▶ Idle (+wire)
//!  │                          └──press same terminal / Escape──▶ Idle
//!  ├──press component──▶ Dragging ──release──▶ Idle (+1 history entry)
//!  ├──press empty──▶ Panning ──release──▶ Idle
//!  └──secondary press on wire/terminal──▶ ContextMenuOpen ──action/click──▶ Idle
//! ```

use circuitlab_core::{
    CircuitSnapshot, ComponentId, ComponentKind, GraphError, Point, TerminalRef, Wire, WireId,
};
use circuitlab_settings::Config;

use crate::geometry::{snap_point, wire_path};
use crate::graph::GraphModel;
use crate::hit_test::{HitTarget, HitTester};
use crate::session::EditorSession;
use crate::viewport::Viewport;

/// Mouse button of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
}

/// An in-progress wire. Never part of the graph or its history.
#[derive(Debug, Clone, PartialEq)]
pub struct WireDraft {
    pub from: TerminalRef,
    /// Pointer position in world coordinates.
    pub preview_point: Point,
    /// Terminal under the pointer, other than `from`.
    pub hovered: Option<TerminalRef>,
}

impl WireDraft {
    /// Transient wire for rendering. While nothing is hovered both ends sit
    /// on the starting terminal; draw it to [`preview_point`] instead.
    ///
    /// [`preview_point`]: WireDraft::preview_point
    pub fn preview_wire(&self) -> Wire {
        Wire {
            id: WireId::from("draft"),
            from: self.from.clone(),
            to: self.hovered.clone().unwrap_or_else(|| self.from.clone()),
            draft: true,
        }
    }
}

/// What a context menu was opened on.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextTarget {
    Wire(WireId),
    Terminal(TerminalRef),
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub target: ContextTarget,
    /// Where the menu was opened, in screen pixels.
    pub anchor: Point,
}

impl ContextMenu {
    /// Label of the single action this menu offers.
    pub fn label(&self) -> &'static str {
        match self.target {
            ContextTarget::Wire(_) => "Delete wire",
            ContextTarget::Terminal(_) => "Edit value",
        }
    }

    /// Whether `action` applies to this menu's target.
    pub fn accepts(&self, action: &ContextAction) -> bool {
        matches!(
            (&self.target, action),
            (ContextTarget::Wire(_), ContextAction::DeleteWire)
                | (ContextTarget::Terminal(_), ContextAction::EditValue(_))
        )
    }
}

/// Action picked from a context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    DeleteWire,
    /// Sets the display value of the terminal's component.
    EditValue(String),
}

/// Interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        component_id: ComponentId,
        /// Pointer position minus component position at the press.
        pointer_offset: Point,
        origin: Point,
        before: CircuitSnapshot,
    },
    WireDrafting(WireDraft),
    Panning {
        last_pointer: Point,
    },
    ContextMenuOpen(ContextMenu),
}

/// Result of feeding one input event to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Nothing,
    ComponentPlaced(ComponentId),
    ComponentSelected(ComponentId),
    WireSelected(WireId),
    PanStarted,
    Panned,
    Zoomed(f64),
    DraftStarted(TerminalRef),
    DraftMoved,
    DraftCancelled,
    WireCreated(WireId),
    WireRejected,
    ComponentMoved(ComponentId),
    DragCommitted(ComponentId),
    DragCancelled,
    ContextMenuOpened(ContextMenu),
    ContextMenuClosed,
    WireDeleted(WireId),
    ValueEdited(ComponentId),
}

/// Canvas input handling for one editor view.
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    state: InteractionState,
    viewport: Viewport,
    hit_tester: HitTester,
    grid_pitch: f64,
    wheel_zoom_factor: f64,
    hovered_terminal: Option<TerminalRef>,
}

impl InteractionEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            state: InteractionState::Idle,
            viewport: Viewport::from_settings(&config.view),
            hit_tester: HitTester::from_settings(&config.editor),
            grid_pitch: config.editor.grid_pitch,
            wheel_zoom_factor: config.view.wheel_zoom_factor,
            hovered_terminal: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn draft(&self) -> Option<&WireDraft> {
        match &self.state {
            InteractionState::WireDrafting(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        match &self.state {
            InteractionState::ContextMenuOpen(menu) => Some(menu),
            _ => None,
        }
    }

    /// Terminal currently under the pointer, for highlighting.
    pub fn hovered_terminal(&self) -> Option<&TerminalRef> {
        self.hovered_terminal.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    /// Rendered path of the draft wire, from its starting terminal to the
    /// hovered terminal or the pointer.
    pub fn preview_path(&self, graph: &GraphModel) -> Option<Vec<Point>> {
        let draft = self.draft()?;
        let start = graph.terminal_position(&draft.from)?;
        let end = draft
            .hovered
            .as_ref()
            .and_then(|t| graph.terminal_position(t))
            .unwrap_or(draft.preview_point);
        Some(wire_path(start, end))
    }

    /// Drops a catalog part at a screen position (palette drag and drop).
    pub fn place_component(
        &mut self,
        session: &mut EditorSession,
        kind: ComponentKind,
        screen: Point,
    ) -> Result<InteractionOutcome, GraphError> {
        let world = self.viewport.screen_to_world(screen);
        let id = session.add_component(kind, world)?;
        Ok(InteractionOutcome::ComponentPlaced(id))
    }

    pub fn pointer_down(
        &mut self,
        session: &mut EditorSession,
        screen: Point,
        button: PointerButton,
    ) -> InteractionOutcome {
        let world = self.viewport.screen_to_world(screen);
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => match button {
                PointerButton::Primary => self.press_idle(session, world, screen),
                PointerButton::Secondary => self.open_context_menu(session, world, screen),
            },
            InteractionState::WireDrafting(draft) => {
                self.press_while_drafting(session, draft, world, button)
            }
            InteractionState::ContextMenuOpen(_) => InteractionOutcome::ContextMenuClosed,
            busy => {
                // A second button pressed mid-drag or mid-pan.
                self.state = busy;
                InteractionOutcome::Nothing
            }
        }
    }

    pub fn pointer_move(&mut self, session: &mut EditorSession, screen: Point) -> InteractionOutcome {
        let world = self.viewport.screen_to_world(screen);
        let tester = self.hit_tester;

        match &mut self.state {
            InteractionState::Idle => {
                self.hovered_terminal = tester
                    .terminal_at(session.graph(), world)
                    .map(|hit| hit.terminal);
                InteractionOutcome::Nothing
            }
            InteractionState::Dragging {
                component_id,
                pointer_offset,
                ..
            } => {
                let target = snap_point(world - *pointer_offset, self.grid_pitch);
                if session.move_component(component_id, target) {
                    InteractionOutcome::ComponentMoved(component_id.clone())
                } else {
                    InteractionOutcome::Nothing
                }
            }
            InteractionState::WireDrafting(draft) => {
                draft.preview_point = world;
                draft.hovered = tester
                    .terminal_at(session.graph(), world)
                    .map(|hit| hit.terminal)
                    .filter(|t| t != &draft.from);
                self.hovered_terminal = draft.hovered.clone();
                InteractionOutcome::DraftMoved
            }
            InteractionState::Panning { last_pointer } => {
                let delta = screen - *last_pointer;
                *last_pointer = screen;
                self.viewport.pan_by(delta.x, delta.y);
                InteractionOutcome::Panned
            }
            InteractionState::ContextMenuOpen(_) => InteractionOutcome::Nothing,
        }
    }

    pub fn pointer_up(&mut self, session: &mut EditorSession, screen: Point) -> InteractionOutcome {
        let world = self.viewport.screen_to_world(screen);
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging {
                component_id,
                origin,
                before,
                ..
            } => {
                let moved = session
                    .graph()
                    .component(&component_id)
                    .is_some_and(|c| c.position != origin);
                if moved {
                    session.commit_snapshot(before);
                    InteractionOutcome::DragCommitted(component_id)
                } else {
                    InteractionOutcome::Nothing
                }
            }
            InteractionState::Panning { .. } => InteractionOutcome::Nothing,
            InteractionState::WireDrafting(draft) => {
                // Releasing over another terminal finishes a drag-to-connect;
                // otherwise the draft stays open for a click-to-connect.
                let target = self
                    .hit_tester
                    .terminal_at(session.graph(), world)
                    .map(|hit| hit.terminal)
                    .filter(|t| t != &draft.from);
                match target {
                    Some(to) => self.complete_wire(session, draft.from, to),
                    None => {
                        self.state = InteractionState::WireDrafting(draft);
                        InteractionOutcome::Nothing
                    }
                }
            }
            other => {
                self.state = other;
                InteractionOutcome::Nothing
            }
        }
    }

    pub fn key_down(&mut self, session: &mut EditorSession, key: Key) -> InteractionOutcome {
        match key {
            Key::Escape => self.escape(session),
            Key::Delete | Key::Backspace => {
                if !self.is_idle() {
                    return InteractionOutcome::Nothing;
                }
                match session.selected_wire().cloned() {
                    Some(id) if session.remove_wire(&id) => InteractionOutcome::WireDeleted(id),
                    _ => InteractionOutcome::Nothing,
                }
            }
        }
    }

    /// Mouse-wheel zoom around the pointer.
    pub fn wheel(&mut self, delta_y: f64, screen: Point) -> InteractionOutcome {
        self.viewport
            .apply_wheel(delta_y, screen, self.wheel_zoom_factor);
        InteractionOutcome::Zoomed(self.viewport.zoom())
    }

    /// Runs an action from the open context menu and closes it.
    pub fn choose_context_action(
        &mut self,
        session: &mut EditorSession,
        action: ContextAction,
    ) -> InteractionOutcome {
        let menu = match std::mem::take(&mut self.state) {
            InteractionState::ContextMenuOpen(menu) => menu,
            other => {
                self.state = other;
                return InteractionOutcome::Nothing;
            }
        };
        match (menu.target, action) {
            (ContextTarget::Wire(id), ContextAction::DeleteWire) if session.remove_wire(&id) => {
                InteractionOutcome::WireDeleted(id)
            }
            (ContextTarget::Terminal(terminal), ContextAction::EditValue(value)) => {
                let id = terminal.component_id;
                if session.set_component_value(&id, value) {
                    session.select_component(id.clone());
                    InteractionOutcome::ValueEdited(id)
                } else {
                    InteractionOutcome::ContextMenuClosed
                }
            }
            _ => InteractionOutcome::ContextMenuClosed,
        }
    }

    fn press_idle(
        &mut self,
        session: &mut EditorSession,
        world: Point,
        screen: Point,
    ) -> InteractionOutcome {
        match self.hit_tester.hit(session.graph(), world) {
            HitTarget::Terminal(hit) => {
                self.state = InteractionState::WireDrafting(WireDraft {
                    from: hit.terminal.clone(),
                    preview_point: hit.position,
                    hovered: None,
                });
                InteractionOutcome::DraftStarted(hit.terminal)
            }
            HitTarget::Component(id) => {
                let Some(origin) = session.graph().component(&id).map(|c| c.position) else {
                    return InteractionOutcome::Nothing;
                };
                self.state = InteractionState::Dragging {
                    component_id: id.clone(),
                    pointer_offset: world - origin,
                    origin,
                    before: session.project(),
                };
                session.select_component(id.clone());
                InteractionOutcome::ComponentSelected(id)
            }
            HitTarget::Wire(id) => {
                session.select_wire(id.clone());
                InteractionOutcome::WireSelected(id)
            }
            HitTarget::Empty => {
                session.clear_selection();
                self.state = InteractionState::Panning {
                    last_pointer: screen,
                };
                InteractionOutcome::PanStarted
            }
        }
    }

    fn press_while_drafting(
        &mut self,
        session: &mut EditorSession,
        draft: WireDraft,
        world: Point,
        button: PointerButton,
    ) -> InteractionOutcome {
        self.hovered_terminal = None;
        if button == PointerButton::Secondary {
            return InteractionOutcome::DraftCancelled;
        }
        match self.hit_tester.terminal_at(session.graph(), world) {
            Some(hit) if hit.terminal != draft.from => {
                self.complete_wire(session, draft.from, hit.terminal)
            }
            _ => InteractionOutcome::DraftCancelled,
        }
    }

    fn complete_wire(
        &mut self,
        session: &mut EditorSession,
        from: TerminalRef,
        to: TerminalRef,
    ) -> InteractionOutcome {
        self.hovered_terminal = None;
        match session.add_wire(from, to) {
            Some(id) => InteractionOutcome::WireCreated(id),
            None => InteractionOutcome::WireRejected,
        }
    }

    fn open_context_menu(
        &mut self,
        session: &mut EditorSession,
        world: Point,
        screen: Point,
    ) -> InteractionOutcome {
        let target = if let Some(id) = self.hit_tester.wire_at(session.graph(), world) {
            ContextTarget::Wire(id)
        } else if let Some(hit) = self.hit_tester.terminal_at(session.graph(), world) {
            ContextTarget::Terminal(hit.terminal)
        } else {
            return InteractionOutcome::Nothing;
        };
        let menu = ContextMenu {
            target,
            anchor: screen,
        };
        self.state = InteractionState::ContextMenuOpen(menu.clone());
        InteractionOutcome::ContextMenuOpened(menu)
    }

    fn escape(&mut self, session: &mut EditorSession) -> InteractionOutcome {
        self.hovered_terminal = None;
        match std::mem::take(&mut self.state) {
            InteractionState::Idle | InteractionState::Panning { .. } => InteractionOutcome::Nothing,
            InteractionState::Dragging {
                component_id,
                origin,
                ..
            } => {
                session.move_component(&component_id, origin);
                InteractionOutcome::DragCancelled
            }
            InteractionState::WireDrafting(_) => InteractionOutcome::DraftCancelled,
            InteractionState::ContextMenuOpen(_) => InteractionOutcome::ContextMenuClosed,
        }
    }
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
