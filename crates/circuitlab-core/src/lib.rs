//! # CircuitLab Core
//!
//! Core types, the component catalog, error types, and the event bus shared by
//! every CircuitLab crate.
//!
//! The data model lives here (rather than in the editor) because the editor,
//! the simulation bridge, and the project serializer all exchange the same
//! value types: [`ComponentInstance`], [`Wire`], and [`CircuitSnapshot`].

pub mod catalog;
pub mod data;
pub mod error;
pub mod event_bus;

pub use catalog::{
    init_standard_catalog, starter_kits, CatalogEntry, ComponentCatalog, ComponentCategory,
    EditableField, FieldOption, FieldType, FieldValue, KitItem, StarterKit, TerminalTemplate,
};

pub use data::{
    CircuitSnapshot, ComponentId, ComponentInstance, ComponentKind, DiagnosticMessage, Point,
    Polarity, Rotation, Severity, SimulationReading, Size, Terminal, TerminalId, TerminalRef,
    Wire, WireId,
};

pub use error::{Error, GraphError, Result, SimulationError};

pub use event_bus::{
    ChangeKind, EditorEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    GraphChange, SimulationEvent, SubscriptionId,
};
