//! Circuit evaluation behind the bridge.
//!
//! [`Evaluator`] is the seam a real solver would plug into. The bundled
//! [`HeuristicEvaluator`] only produces plausible-looking numbers so the
//! editor has something to display.

use std::collections::HashSet;
use std::time::Duration;

use circuitlab_core::{
    CircuitSnapshot, ComponentInstance, ComponentKind, DiagnosticMessage, Polarity,
    SimulationError, SimulationReading,
};
use circuitlab_editor::evaluate_diagnostics;

/// Supply voltage at power source `+` terminals.
pub const SUPPLY_VOLTAGE: f64 = 5.0;
/// Forward voltage reported at LED anodes.
pub const LED_FORWARD_VOLTAGE: f64 = 2.1;
/// High level of the blinker outputs.
pub const BLINKER_HIGH_VOLTAGE: f64 = 3.3;
/// Blinker square wave frequency in Hz.
pub const BLINKER_FREQUENCY: f64 = 2.0;

/// Output of one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub readings: Vec<SimulationReading>,
    /// Every diagnostic that currently fires, before coaching filtering.
    pub diagnostics: Vec<DiagnosticMessage>,
    pub frequency: Option<f64>,
}

/// Computes readings for a graph snapshot.
pub trait Evaluator: Send + 'static {
    /// Evaluates `snapshot` at `elapsed` time since the run started.
    ///
    /// # Errors
    ///
    /// [`SimulationError::EvaluationTaskFailure`] when the snapshot cannot be
    /// evaluated.
    fn evaluate(
        &mut self,
        snapshot: &CircuitSnapshot,
        elapsed: Duration,
        advanced_mode: bool,
    ) -> Result<Evaluation, SimulationError>;
}

/// Stand-in evaluator with fixed per-kind voltages and currents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn voltage(component: &ComponentInstance, polarity: Option<Polarity>, blink: bool) -> f64 {
        match (component.kind, polarity) {
            (_, Some(Polarity::Negative)) => 0.0,
            (ComponentKind::Battery | ComponentKind::DcSource, Some(Polarity::Positive)) => {
                SUPPLY_VOLTAGE
            }
            (ComponentKind::Led, Some(Polarity::Positive)) => LED_FORWARD_VOLTAGE,
            (ComponentKind::Prefab555Blinker, Some(Polarity::Positive)) => {
                if blink {
                    BLINKER_HIGH_VOLTAGE
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    fn current(kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Resistor => 0.015,
            ComponentKind::Led => 0.012,
            ComponentKind::Prefab555Blinker => 0.020,
            _ => 0.005,
        }
    }

    /// Blink rate estimate for a discrete timer circuit.
    fn frequency(snapshot: &CircuitSnapshot) -> Option<f64> {
        let has = |kind| snapshot.components.iter().any(|c| c.kind == kind);
        if has(ComponentKind::Timer555) && has(ComponentKind::Capacitor) && has(ComponentKind::Resistor)
        {
            Some(2.0 / snapshot.wires.len().max(1) as f64)
        } else {
            None
        }
    }
}

/// High during the first half of each blinker period.
fn blink_phase(elapsed: Duration) -> bool {
    (elapsed.as_secs_f64() * BLINKER_FREQUENCY).fract() < 0.5
}

impl Evaluator for HeuristicEvaluator {
    fn evaluate(
        &mut self,
        snapshot: &CircuitSnapshot,
        elapsed: Duration,
        advanced_mode: bool,
    ) -> Result<Evaluation, SimulationError> {
        for wire in &snapshot.wires {
            for end in [&wire.from, &wire.to] {
                if snapshot.component(&end.component_id).is_none() {
                    return Err(SimulationError::EvaluationTaskFailure {
                        reason: format!(
                            "wire {} references missing component {}",
                            wire.id, end.component_id
                        ),
                    });
                }
            }
        }

        let blink = blink_phase(elapsed);
        let readings = snapshot
            .components
            .iter()
            .flat_map(|component| {
                component.terminals.iter().map(move |terminal| SimulationReading {
                    component_id: component.id.clone(),
                    terminal_id: terminal.id.clone(),
                    voltage: Self::voltage(component, terminal.polarity, blink),
                    current: Self::current(component.kind),
                })
            })
            .collect();

        Ok(Evaluation {
            readings,
            diagnostics: evaluate_diagnostics(&snapshot.components, &snapshot.wires, advanced_mode),
            frequency: Self::frequency(snapshot),
        })
    }
}

/// Drops coaching messages that were already shown.
///
/// An id that stops firing is forgotten, so the same advice can come back if
/// the problem is reintroduced.
#[derive(Debug, Clone, Default)]
pub struct CoachingFilter {
    shown: HashSet<String>,
}

impl CoachingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages in `current` that have not been shown yet and
    /// marks them as shown.
    pub fn filter(&mut self, current: Vec<DiagnosticMessage>) -> Vec<DiagnosticMessage> {
        let active: HashSet<&str> = current.iter().map(|m| m.id.as_str()).collect();
        self.shown.retain(|id| active.contains(id.as_str()));

        current
            .into_iter()
            .filter(|m| self.shown.insert(m.id.clone()))
            .collect()
    }

    pub fn is_shown(&self, id: &str) -> bool {
        self.shown.contains(id)
    }

    pub fn reset(&mut self) {
        self.shown.clear();
    }
}
