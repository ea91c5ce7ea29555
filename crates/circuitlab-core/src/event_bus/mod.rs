//! # Event Bus Module
//!
//! Publish/subscribe plumbing between the editor session, the diagnostics
//! engine, and the simulation bridge.
//!
//! ## Overview
//!
//! - The editor session publishes a [`EditorEvent::Graph`] event after every
//!   structural change, followed by the recomputed diagnostics
//! - The simulation bridge subscribes to graph events and forwards each
//!   snapshot to its evaluation task
//! - Hosts subscribe to whatever they render
//!
//! The bus is an ordinary value. Create one per editor and share it through
//! an `Arc`; there is no process-wide instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use circuitlab_core::event_bus::{EditorEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Graph]),
//!     |event| {
//!         if let EditorEvent::Graph(change) = event {
//!             println!("graph changed: {:?}", change.kind);
//!         }
//!     },
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
