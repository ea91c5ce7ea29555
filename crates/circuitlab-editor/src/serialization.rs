//! Project file save/load.
//!
//! A project is persisted as the bare graph: `{ "components": [...],
//! "wires": [...] }` in camelCase JSON. Terminal ids are written as they are,
//! so wires still resolve after a round trip.

use anyhow::{Context, Result};
use std::path::Path;

use circuitlab_core::CircuitSnapshot;

use crate::graph::sanitize_snapshot;

/// Serializes a graph to pretty-printed project JSON.
pub fn project_to_json(snapshot: &CircuitSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to serialize project")
}

/// Parses project JSON.
///
/// Anything the graph would reject (repeated ids, dangling,
/// self-referencing or duplicate wires) is dropped with a warning.
pub fn project_from_json(json: &str) -> Result<CircuitSnapshot> {
    let snapshot: CircuitSnapshot =
        serde_json::from_str(json).context("Failed to parse project file")?;
    Ok(sanitize_snapshot(snapshot))
}

/// Save a project to file
pub fn save_project(path: impl AsRef<Path>, snapshot: &CircuitSnapshot) -> Result<()> {
    let json = project_to_json(snapshot)?;
    std::fs::write(path.as_ref(), json).context("Failed to write project file")?;
    tracing::info!(
        "Saved project with {} components to {}",
        snapshot.components.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a project from file
pub fn load_project(path: impl AsRef<Path>) -> Result<CircuitSnapshot> {
    let content =
        std::fs::read_to_string(path.as_ref()).context("Failed to read project file")?;
    project_from_json(&content)
        .with_context(|| format!("Invalid project {}", path.as_ref().display()))
}
