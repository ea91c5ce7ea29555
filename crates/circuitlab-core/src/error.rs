//! Error handling for CircuitLab
//!
//! Provides error types for each layer of the engine:
//! - Graph errors (catalog misses, rejected wires)
//! - Simulation errors (evaluation task faults, bridge lifecycle)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Graph model error type
///
/// Only `UnknownComponentKind` reaches callers as a failure; wire rejections
/// are reported by the fallible variants of the graph API and otherwise
/// degrade to a silent no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The catalog has no entry for the requested kind
    #[error("Unknown component kind: {kind}")]
    UnknownComponentKind {
        /// The kind that was requested.
        kind: String,
    },

    /// A wire endpoint is dangling or the wire loops onto one terminal
    #[error("Invalid wire endpoint: {reason}")]
    InvalidWireEndpoint {
        /// Why the endpoint was rejected.
        reason: String,
    },

    /// A wire between the same two terminals already exists
    #[error("Duplicate wire between {from} and {to}")]
    DuplicateWire {
        /// First endpoint, as `component:terminal`.
        from: String,
        /// Second endpoint, as `component:terminal`.
        to: String,
    },

    /// No component with this id
    #[error("Component {id} not found")]
    ComponentNotFound {
        /// The missing component id.
        id: String,
    },
}

/// Simulation bridge error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The evaluation task crashed or reported an error
    #[error("Evaluation task failure: {reason}")]
    EvaluationTaskFailure {
        /// The reason reported by (or inferred from) the task.
        reason: String,
    },

    /// The bridge has been stopped
    #[error("Simulation bridge terminated")]
    BridgeTerminated,

    /// The bridge was started outside a tokio runtime
    #[error("No async runtime available to host the evaluation task")]
    NoRuntime,
}

/// Main error type for CircuitLab
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Graph error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Simulation error
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Project or message (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a graph error
    pub fn is_graph_error(&self) -> bool {
        matches!(self, Error::Graph(_))
    }

    /// Check if this is a simulation error
    pub fn is_simulation_error(&self) -> bool {
        matches!(self, Error::Simulation(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
