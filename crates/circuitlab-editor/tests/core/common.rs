use std::sync::Arc;

use circuitlab_core::{ComponentId, EventBus, TerminalRef};
use circuitlab_editor::{EditorSession, GraphModel};

pub fn session() -> EditorSession {
    EditorSession::standard(Arc::new(EventBus::new()))
}

/// Reference to the `index`-th terminal of a component.
pub fn terminal(graph: &GraphModel, component: &ComponentId, index: usize) -> TerminalRef {
    let c = graph
        .component(component)
        .unwrap_or_else(|| panic!("no component {component}"));
    c.terminal_ref(&c.terminals[index])
}
