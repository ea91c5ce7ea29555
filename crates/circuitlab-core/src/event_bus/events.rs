//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so hosts can log or replay them.

use serde::{Deserialize, Serialize};

use crate::data::{CircuitSnapshot, DiagnosticMessage, SimulationReading};

/// Root event enum for everything published on an editor bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditorEvent {
    /// The circuit graph changed
    Graph(GraphChange),
    /// Diagnostics were recomputed
    Diagnostics(Vec<DiagnosticMessage>),
    /// Simulation bridge activity
    Simulation(SimulationEvent),
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::Graph(_) => EventCategory::Graph,
            EditorEvent::Diagnostics(_) => EventCategory::Diagnostics,
            EditorEvent::Simulation(_) => EventCategory::Simulation,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::Graph(change) => format!(
                "{} ({} components, {} wires)",
                change.kind,
                change.snapshot.components.len(),
                change.snapshot.wires.len()
            ),
            EditorEvent::Diagnostics(messages) => {
                format!("{} diagnostics", messages.len())
            }
            EditorEvent::Simulation(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Graph,
    Diagnostics,
    Simulation,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Graph => write!(f, "Graph"),
            EventCategory::Diagnostics => write!(f, "Diagnostics"),
            EventCategory::Simulation => write!(f, "Simulation"),
        }
    }
}

/// What kind of edit produced a graph change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    ComponentAdded,
    ComponentMoved,
    ComponentUpdated,
    ComponentRemoved,
    WireAdded,
    WireRemoved,
    Undo,
    Redo,
    ProjectLoaded,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ChangeKind::ComponentAdded => "Component added",
            ChangeKind::ComponentMoved => "Component moved",
            ChangeKind::ComponentUpdated => "Component updated",
            ChangeKind::ComponentRemoved => "Component removed",
            ChangeKind::WireAdded => "Wire added",
            ChangeKind::WireRemoved => "Wire removed",
            ChangeKind::Undo => "Undo",
            ChangeKind::Redo => "Redo",
            ChangeKind::ProjectLoaded => "Project loaded",
        };
        f.write_str(text)
    }
}

/// A graph change together with the graph as it is after the change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphChange {
    pub kind: ChangeKind,
    pub snapshot: CircuitSnapshot,
}

impl GraphChange {
    pub fn new(kind: ChangeKind, snapshot: CircuitSnapshot) -> Self {
        Self { kind, snapshot }
    }
}

/// Simulation bridge events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// The evaluation task finished initializing
    Ready,
    /// Ticking started
    Running,
    /// Ticking paused
    Paused,
    /// Readings and diagnostics were cleared
    Reset,
    /// A tick was applied
    Tick {
        /// Latest readings, replacing any earlier set.
        readings: Vec<SimulationReading>,
        /// Estimated blink frequency in Hz, when the circuit oscillates.
        frequency: Option<f64>,
    },
    /// The evaluation task reported or suffered an error
    Failed {
        /// Human-readable reason.
        reason: String,
    },
    /// The bridge was stopped
    Stopped,
}

impl SimulationEvent {
    fn description(&self) -> String {
        match self {
            SimulationEvent::Ready => "Simulation ready".to_string(),
            SimulationEvent::Running => "Simulation running".to_string(),
            SimulationEvent::Paused => "Simulation paused".to_string(),
            SimulationEvent::Reset => "Simulation reset".to_string(),
            SimulationEvent::Tick { readings, frequency } => match frequency {
                Some(hz) => format!("Tick: {} readings, {:.2} Hz", readings.len(), hz),
                None => format!("Tick: {} readings", readings.len()),
            },
            SimulationEvent::Failed { reason } => format!("Simulation failed: {}", reason),
            SimulationEvent::Stopped => "Simulation stopped".to_string(),
        }
    }
}
