//! Messages exchanged with the evaluation task.
//!
//! Both directions use a closed tagged union serialized as
//! `{"type": ..., "payload": ...}` so a task hosted out of process could speak
//! the same protocol as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use circuitlab_core::{CircuitSnapshot, DiagnosticMessage, SimulationReading};

/// Editor → evaluation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum BridgeRequest {
    /// First message on every task. The task answers with
    /// [`EvaluatorMessage::Ready`] and stamps its ticks with `generation`.
    Init { generation: u64 },
    /// Latest graph. Only the most recent snapshot is kept by the task.
    UpdateGraph(CircuitSnapshot),
    Run,
    Pause,
    /// Stops ticking, forgets shown coaching and starts a new generation.
    Reset { generation: u64 },
    /// Toggles the short-circuit coaching rule.
    SetAdvancedMode(bool),
}

impl BridgeRequest {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeRequest::Init { .. } => "init",
            BridgeRequest::UpdateGraph(_) => "updateGraph",
            BridgeRequest::Run => "run",
            BridgeRequest::Pause => "pause",
            BridgeRequest::Reset { .. } => "reset",
            BridgeRequest::SetAdvancedMode(_) => "setAdvancedMode",
        }
    }

    pub fn to_json(&self) -> circuitlab_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> circuitlab_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPayload {
    /// Generation the tick was produced in; older generations are stale.
    pub generation: u64,
    /// Full replacement reading set.
    pub readings: Vec<SimulationReading>,
    /// Coaching messages not shown before.
    pub diagnostics: Vec<DiagnosticMessage>,
    /// Ids of every coaching message still firing. Earlier messages missing
    /// from this list no longer apply.
    #[serde(default)]
    pub active: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

/// Evaluation task → editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum EvaluatorMessage {
    Ready,
    Tick(TickPayload),
    Error { generation: u64, reason: String },
}

impl EvaluatorMessage {
    pub fn to_json(&self) -> circuitlab_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> circuitlab_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
