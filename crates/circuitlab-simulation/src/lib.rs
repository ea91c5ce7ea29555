//! # CircuitLab Simulation
//!
//! The bridge between the editor and a background evaluation task.
//!
//! The editor pushes graph snapshots and run/pause/reset commands as
//! [`BridgeRequest`]s; the task answers with [`EvaluatorMessage`]s carrying
//! live readings and new coaching diagnostics. The task never sees the graph
//! model itself, only value copies.

pub mod bridge;
pub mod evaluator;
pub mod protocol;

pub use bridge::{BridgeConfig, BridgeSender, BridgeStatus, SimulationBridge, EVALUATION_FAILURE};
pub use evaluator::{CoachingFilter, Evaluation, Evaluator, HeuristicEvaluator};
pub use protocol::{BridgeRequest, EvaluatorMessage, TickPayload};
