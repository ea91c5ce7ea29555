//! Circuit graph model.
//!
//! The graph owns every placed component and every wire. Wires always join
//! two existing terminals; removing a component removes its wires with it.
//! Operations on missing ids are no-ops rather than errors.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use circuitlab_core::{
    CircuitSnapshot, ComponentCatalog, ComponentId, ComponentInstance, ComponentKind, GraphError,
    Point, Rotation, Size, TerminalRef, Wire, WireId,
};

use crate::geometry::{snap_point, wire_path, Bounds};

/// Body size used when a component's kind is missing from the catalog.
pub const DEFAULT_BODY_SIZE: Size = Size::new(80.0, 40.0);

/// Grid pitch used when none is configured.
pub const DEFAULT_GRID_PITCH: f64 = 20.0;

/// Fields merged by [`GraphModel::update_component`]. `None` leaves the
/// field untouched; metadata entries are merged key by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentPatch {
    pub position: Option<Point>,
    pub rotation: Option<Rotation>,
    pub value: Option<String>,
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl ComponentPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.value.is_none()
            && self.metadata.is_none()
    }
}

/// In-memory circuit graph.
#[derive(Debug, Clone)]
pub struct GraphModel {
    catalog: Arc<ComponentCatalog>,
    grid_pitch: f64,
    components: Vec<ComponentInstance>,
    wires: Vec<Wire>,
}

impl GraphModel {
    /// Creates an empty graph backed by `catalog`.
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        Self::with_grid_pitch(catalog, DEFAULT_GRID_PITCH)
    }

    /// Creates an empty graph that snaps placements to `grid_pitch`.
    pub fn with_grid_pitch(catalog: Arc<ComponentCatalog>, grid_pitch: f64) -> Self {
        Self {
            catalog,
            grid_pitch,
            components: Vec::new(),
            wires: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    pub fn grid_pitch(&self) -> f64 {
        self.grid_pitch
    }

    /// Components in placement order; later entries draw on top.
    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn component(&self, id: &ComponentId) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| &c.id == id)
    }

    pub fn wire(&self, id: &WireId) -> Option<&Wire> {
        self.wires.iter().find(|w| &w.id == id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.wires.is_empty()
    }

    /// Places a new instance of `kind` at the grid point nearest `position`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownComponentKind`] when the catalog has no
    /// entry for `kind`; the graph is left untouched.
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        position: Point,
    ) -> Result<&ComponentInstance, GraphError> {
        let entry = self
            .catalog
            .get(kind)
            .ok_or_else(|| GraphError::UnknownComponentKind {
                kind: kind.to_string(),
            })?;
        let instance = entry.instantiate(snap_point(position, self.grid_pitch));
        tracing::debug!(
            "Placed {} {} at {}",
            instance.kind,
            instance.id,
            instance.position
        );
        self.components.push(instance);
        Ok(&self.components[self.components.len() - 1])
    }

    /// Merges `patch` into an existing component. Returns false if `id` is
    /// unknown.
    pub fn update_component(&mut self, id: &ComponentId, patch: ComponentPatch) -> bool {
        let Some(component) = self.components.iter_mut().find(|c| &c.id == id) else {
            return false;
        };
        if let Some(position) = patch.position {
            component.position = position;
        }
        if let Some(rotation) = patch.rotation {
            component.rotation = rotation;
        }
        if let Some(value) = patch.value {
            component.value = value;
        }
        if let Some(metadata) = patch.metadata {
            component.metadata.extend(metadata);
        }
        true
    }

    /// Turns a component a quarter step; positive `direction` is clockwise.
    pub fn rotate_component(&mut self, id: &ComponentId, direction: i32) -> bool {
        let Some(rotation) = self.component(id).map(|c| c.rotation.turned(direction)) else {
            return false;
        };
        self.update_component(
            id,
            ComponentPatch {
                rotation: Some(rotation),
                ..Default::default()
            },
        )
    }

    /// Sets a component's display value.
    pub fn set_component_value(&mut self, id: &ComponentId, value: impl Into<String>) -> bool {
        self.update_component(id, ComponentPatch::value(value))
    }

    /// Removes a component together with every wire attached to it.
    pub fn remove_component(&mut self, id: &ComponentId) -> Option<ComponentInstance> {
        let index = self.components.iter().position(|c| &c.id == id)?;
        let removed = self.components.remove(index);
        let before = self.wires.len();
        self.wires.retain(|w| !w.touches(id));
        tracing::debug!(
            "Removed {} {} and {} attached wires",
            removed.kind,
            removed.id,
            before - self.wires.len()
        );
        Some(removed)
    }

    /// True if `terminal` names a terminal of an existing component.
    pub fn has_terminal(&self, terminal: &TerminalRef) -> bool {
        self.component(&terminal.component_id)
            .is_some_and(|c| c.terminal(&terminal.terminal_id).is_some())
    }

    /// Checks whether a wire from `from` to `to` would be accepted.
    pub fn check_wire(&self, from: &TerminalRef, to: &TerminalRef) -> Result<(), GraphError> {
        if from == to {
            return Err(GraphError::InvalidWireEndpoint {
                reason: format!("wire starts and ends on {}", from),
            });
        }
        for endpoint in [from, to] {
            if !self.has_terminal(endpoint) {
                return Err(GraphError::InvalidWireEndpoint {
                    reason: format!("no terminal {}", endpoint),
                });
            }
        }
        if self.wires.iter().any(|w| w.joins(from, to)) {
            return Err(GraphError::DuplicateWire {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Adds a wire, reporting why it was rejected.
    pub fn try_add_wire(&mut self, from: TerminalRef, to: TerminalRef) -> Result<&Wire, GraphError> {
        self.check_wire(&from, &to)?;
        let wire = Wire::new(from, to);
        tracing::debug!("Wired {} -> {} ({})", wire.from, wire.to, wire.id);
        self.wires.push(wire);
        Ok(&self.wires[self.wires.len() - 1])
    }

    /// Adds a wire. Dangling, self-referencing, and duplicate wires are
    /// rejected with `None`.
    pub fn add_wire(&mut self, from: TerminalRef, to: TerminalRef) -> Option<&Wire> {
        match self.try_add_wire(from, to) {
            Ok(wire) => Some(wire),
            Err(e) => {
                tracing::debug!("Wire rejected: {}", e);
                None
            }
        }
    }

    pub fn remove_wire(&mut self, id: &WireId) -> Option<Wire> {
        let index = self.wires.iter().position(|w| &w.id == id)?;
        Some(self.wires.remove(index))
    }

    /// World position of a terminal, or `None` if it does not exist.
    pub fn terminal_position(&self, terminal: &TerminalRef) -> Option<Point> {
        let component = self.component(&terminal.component_id)?;
        let t = component.terminal(&terminal.terminal_id)?;
        Some(component.terminal_world_position(t))
    }

    /// World positions of both ends of a wire.
    pub fn wire_endpoints(&self, wire: &Wire) -> Option<(Point, Point)> {
        Some((
            self.terminal_position(&wire.from)?,
            self.terminal_position(&wire.to)?,
        ))
    }

    /// Flattened rendered path of a wire.
    pub fn wire_path(&self, wire: &Wire) -> Option<Vec<Point>> {
        self.wire_endpoints(wire)
            .map(|(start, end)| wire_path(start, end))
    }

    /// Unrotated body size of a kind.
    pub fn body_size(&self, kind: ComponentKind) -> Size {
        self.catalog
            .get(kind)
            .map(|e| e.body_size)
            .unwrap_or(DEFAULT_BODY_SIZE)
    }

    /// Body box of a placed component.
    pub fn component_bounds(&self, component: &ComponentInstance) -> Bounds {
        Bounds::around(
            component.position,
            self.body_size(component.kind),
            component.rotation,
        )
    }

    /// Box covering every component body, or `None` for an empty graph.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.components
            .iter()
            .map(|c| self.component_bounds(c))
            .reduce(|a, b| a.union(&b))
    }

    /// Independent copy of the whole graph.
    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot::new(self.components.clone(), self.wires.clone())
    }

    /// Replaces the whole graph with `snapshot`.
    ///
    /// The snapshot is taken as is. Use [`GraphModel::load_project`] for
    /// snapshots that did not come from a graph.
    pub fn load_snapshot(&mut self, snapshot: CircuitSnapshot) {
        self.components = snapshot.components;
        self.wires = snapshot.wires;
    }

    /// Replaces the whole graph with an external project, dropping whatever
    /// the graph would not accept. See [`sanitize_snapshot`].
    pub fn load_project(&mut self, project: CircuitSnapshot) {
        self.load_snapshot(sanitize_snapshot(project));
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.wires.clear();
    }
}

/// Brings an external snapshot in line with the graph invariants.
///
/// Repeated component ids keep their first occurrence, and repeated terminal
/// ids within a component keep their first terminal. Wires that are dangling,
/// self-referencing, or duplicate (in either direction) are dropped. Kept
/// wires lose their draft flag.
pub fn sanitize_snapshot(snapshot: CircuitSnapshot) -> CircuitSnapshot {
    let CircuitSnapshot { components, wires } = snapshot;

    let mut seen = HashSet::new();
    let mut kept_components = Vec::with_capacity(components.len());
    for mut component in components {
        if !seen.insert(component.id.clone()) {
            tracing::warn!("Dropped repeated component {}", component.id);
            continue;
        }
        let mut terminal_ids = HashSet::new();
        let before = component.terminals.len();
        component.terminals.retain(|t| terminal_ids.insert(t.id.clone()));
        if component.terminals.len() < before {
            tracing::warn!(
                "Dropped {} repeated terminals from {}",
                before - component.terminals.len(),
                component.id
            );
        }
        kept_components.push(component);
    }

    let resolves = |end: &TerminalRef| {
        kept_components
            .iter()
            .find(|c| c.id == end.component_id)
            .is_some_and(|c| c.terminal(&end.terminal_id).is_some())
    };
    let total = wires.len();
    let mut kept_wires: Vec<Wire> = Vec::with_capacity(total);
    for wire in wires {
        let valid = wire.from != wire.to
            && resolves(&wire.from)
            && resolves(&wire.to)
            && !kept_wires.iter().any(|w| w.id == wire.id || w.joins(&wire.from, &wire.to));
        if valid {
            kept_wires.push(Wire {
                draft: false,
                ..wire
            });
        }
    }
    if kept_wires.len() < total {
        tracing::warn!("Dropped {} invalid wires from project", total - kept_wires.len());
    }

    CircuitSnapshot::new(kept_components, kept_wires)
}
