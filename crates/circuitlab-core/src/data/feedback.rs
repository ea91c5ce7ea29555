//! Values produced for display: live readings and coaching diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ComponentId, TerminalId};

/// Voltage and current at one terminal, replaced wholesale every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReading {
    pub component_id: ComponentId,
    pub terminal_id: TerminalId,
    pub voltage: f64,
    pub current: f64,
}

/// How loudly a diagnostic should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// A coaching message derived from the current graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticMessage {
    /// Stable rule id, e.g. `led-no-resistor`.
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_component_id: Option<ComponentId>,
}

impl DiagnosticMessage {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            description: description.into(),
            hint: None,
            related_component_id: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_component(mut self, component_id: ComponentId) -> Self {
        self.related_component_id = Some(component_id);
        self
    }
}
