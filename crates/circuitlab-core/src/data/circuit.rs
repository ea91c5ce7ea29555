//! Circuit graph values: placed components, their terminals, and wires.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{ComponentId, Point, Rotation, TerminalId, WireId};
use crate::error::GraphError;

/// Every kind of part the catalog can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "battery")]
    Battery,
    #[serde(rename = "dc-source")]
    DcSource,
    #[serde(rename = "resistor")]
    Resistor,
    #[serde(rename = "capacitor")]
    Capacitor,
    #[serde(rename = "led")]
    Led,
    #[serde(rename = "diode")]
    Diode,
    #[serde(rename = "npn-transistor")]
    NpnTransistor,
    #[serde(rename = "mosfet")]
    Mosfet,
    #[serde(rename = "pushbutton")]
    Pushbutton,
    #[serde(rename = "potentiometer")]
    Potentiometer,
    #[serde(rename = "timer-555")]
    Timer555,
    #[serde(rename = "speaker")]
    Speaker,
    #[serde(rename = "prefab-555-blinker")]
    Prefab555Blinker,
}

impl ComponentKind {
    /// All kinds, in palette order.
    pub const ALL: [ComponentKind; 13] = [
        ComponentKind::Battery,
        ComponentKind::DcSource,
        ComponentKind::Resistor,
        ComponentKind::Capacitor,
        ComponentKind::Led,
        ComponentKind::Diode,
        ComponentKind::NpnTransistor,
        ComponentKind::Mosfet,
        ComponentKind::Pushbutton,
        ComponentKind::Potentiometer,
        ComponentKind::Timer555,
        ComponentKind::Speaker,
        ComponentKind::Prefab555Blinker,
    ];

    /// The kebab-case name used on the wire and in project files.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Battery => "battery",
            ComponentKind::DcSource => "dc-source",
            ComponentKind::Resistor => "resistor",
            ComponentKind::Capacitor => "capacitor",
            ComponentKind::Led => "led",
            ComponentKind::Diode => "diode",
            ComponentKind::NpnTransistor => "npn-transistor",
            ComponentKind::Mosfet => "mosfet",
            ComponentKind::Pushbutton => "pushbutton",
            ComponentKind::Potentiometer => "potentiometer",
            ComponentKind::Timer555 => "timer-555",
            ComponentKind::Speaker => "speaker",
            ComponentKind::Prefab555Blinker => "prefab-555-blinker",
        }
    }

    /// Whether this kind supplies power to a circuit.
    pub fn is_power_source(self) -> bool {
        matches!(self, ComponentKind::Battery | ComponentKind::DcSource)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GraphError::UnknownComponentKind {
                kind: s.to_string(),
            })
    }
}

/// Electrical role of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
    #[serde(rename = "gate")]
    Gate,
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "drain")]
    Drain,
    #[serde(rename = "collector")]
    Collector,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "emitter")]
    Emitter,
    #[serde(rename = "input")]
    Input,
    #[serde(rename = "output")]
    Output,
    #[serde(rename = "control")]
    Control,
}

/// A connection point on a placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub id: TerminalId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    /// Offset from the component origin before rotation.
    pub local_position: Point,
}

/// A component placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: Rotation,
    pub terminals: Vec<Terminal>,
    pub value: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ComponentInstance {
    /// Looks up one of this component's terminals.
    pub fn terminal(&self, terminal_id: &TerminalId) -> Option<&Terminal> {
        self.terminals.iter().find(|t| &t.id == terminal_id)
    }

    /// World position of a terminal: the local offset is rotated, then
    /// translated by the component position.
    pub fn terminal_world_position(&self, terminal: &Terminal) -> Point {
        self.position + self.rotation.apply(terminal.local_position)
    }

    /// Reference to one of this component's terminals.
    pub fn terminal_ref(&self, terminal: &Terminal) -> TerminalRef {
        TerminalRef::new(self.id.clone(), terminal.id.clone())
    }
}

/// One end of a wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalRef {
    pub component_id: ComponentId,
    pub terminal_id: TerminalId,
}

impl TerminalRef {
    pub fn new(component_id: ComponentId, terminal_id: TerminalId) -> Self {
        Self {
            component_id,
            terminal_id,
        }
    }
}

impl fmt::Display for TerminalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component_id, self.terminal_id)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A connection between two terminals.
///
/// Endpoint order is kept for identity, but two wires with swapped endpoints
/// describe the same connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub id: WireId,
    pub from: TerminalRef,
    pub to: TerminalRef,
    /// Set only on the preview wire built from an in-progress draft.
    #[serde(default, skip_serializing_if = "is_false")]
    pub draft: bool,
}

impl Wire {
    /// Creates a committed wire with a fresh id.
    pub fn new(from: TerminalRef, to: TerminalRef) -> Self {
        Self {
            id: WireId::generate(),
            from,
            to,
            draft: false,
        }
    }

    /// True if either endpoint sits on `component_id`.
    pub fn touches(&self, component_id: &ComponentId) -> bool {
        &self.from.component_id == component_id || &self.to.component_id == component_id
    }

    /// True if this wire joins `a` and `b`, in either order.
    pub fn joins(&self, a: &TerminalRef, b: &TerminalRef) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }
}

/// Flat copy of the whole graph. Used for undo/redo, for graph pushes to the
/// simulation bridge, and as the persisted project shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl CircuitSnapshot {
    pub fn new(components: Vec<ComponentInstance>, wires: Vec<Wire>) -> Self {
        Self { components, wires }
    }

    /// Looks up a component by id.
    pub fn component(&self, id: &ComponentId) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// True when nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.wires.is_empty()
    }
}
