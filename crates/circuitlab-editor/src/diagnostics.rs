//! Rule-based coaching checks over the circuit graph.
//!
//! Diagnostics are a pure function of the graph and the advanced-mode flag.
//! They are recomputed from scratch after every change and emitted in a
//! fixed rule order.

use std::collections::HashSet;

use circuitlab_core::{ComponentInstance, ComponentKind, DiagnosticMessage, Severity, Wire};

pub const NO_POWER: &str = "no-power";
pub const LED_NO_RESISTOR: &str = "led-no-resistor";
pub const POSSIBLE_SHORT: &str = "possible-short";
pub const NO_WIRES: &str = "no-wires";

/// Runs every rule against the graph.
pub fn evaluate_diagnostics(
    components: &[ComponentInstance],
    wires: &[Wire],
    advanced_mode: bool,
) -> Vec<DiagnosticMessage> {
    let mut messages = Vec::new();

    if !components.iter().any(|c| c.kind.is_power_source()) {
        messages.push(
            DiagnosticMessage::new(
                NO_POWER,
                Severity::Warning,
                "Add a power source",
                "Drop a Battery or DC Source so your circuit comes alive.",
            )
            .with_hint("Find batteries under Power in the left palette."),
        );
    }

    let has_resistor = components.iter().any(|c| c.kind == ComponentKind::Resistor);
    if let Some(led) = components.iter().find(|c| c.kind == ComponentKind::Led) {
        if !has_resistor {
            messages.push(
                DiagnosticMessage::new(
                    LED_NO_RESISTOR,
                    Severity::Warning,
                    "Protect your LED",
                    "Add a resistor to limit current. Try 330 Ω for starters.",
                )
                .with_hint("Snap the resistor between the battery + and the LED + terminal.")
                .with_component(led.id.clone()),
            );
        }
    }

    if count_wire_loops(wires) > 0 && !advanced_mode {
        messages.push(
            DiagnosticMessage::new(
                POSSIBLE_SHORT,
                Severity::Error,
                "Possible short circuit",
                "A loop without resistance could be a short. Check your wiring.",
            )
            .with_hint("Look for bright red wires. Hover them to view their voltage and current."),
        );
    }

    if !components.is_empty() && wires.is_empty() {
        messages.push(
            DiagnosticMessage::new(
                NO_WIRES,
                Severity::Info,
                "Connect your parts",
                "Drag from one terminal to another to create glowing wires.",
            )
            .with_hint("Terminals light up when you hover with a wire."),
        );
    }

    messages
}

/// Counts wires whose ordered (from component, to component) pair was
/// already seen. Two parallel wires between the same parts count as one
/// loop; this is a heuristic, not a topological short detector.
pub fn count_wire_loops(wires: &[Wire]) -> usize {
    let mut seen = HashSet::new();
    wires
        .iter()
        .filter(|w| !seen.insert((&w.from.component_id, &w.to.component_id)))
        .count()
}
