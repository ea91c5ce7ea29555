//! # CircuitLab
//!
//! Engine for an interactive toy-circuit editor: a component catalog, a
//! circuit graph with undo/redo, a pointer-driven interaction engine and a
//! background simulation bridge that annotates the circuit with live
//! readings and coaching hints.
//!
//! ## Architecture
//!
//! CircuitLab is organized as a workspace with multiple crates:
//!
//! 1. **circuitlab-core** - Data model, component catalog, errors, event bus
//! 2. **circuitlab-settings** - Configuration files
//! 3. **circuitlab-editor** - Graph model, history, hit-testing, interaction engine, diagnostics
//! 4. **circuitlab-simulation** - Simulation bridge and evaluation task
//! 5. **circuitlab** - This crate; composes the others into a [`Workbench`]
//!
//! Rendering is left to the host. Everything a renderer needs (positions,
//! wire paths, hovered terminal, draft preview, readings) is exposed through
//! the workbench.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

pub use circuitlab_core::{
    init_standard_catalog, starter_kits, CatalogEntry, ChangeKind, CircuitSnapshot,
    ComponentCatalog, ComponentCategory, ComponentId, ComponentInstance, ComponentKind,
    DiagnosticMessage, EditorEvent, Error, EventBus, EventCategory, EventFilter, GraphChange,
    GraphError, Point, Polarity, Result, Rotation, Severity, SimulationError, SimulationEvent,
    SimulationReading, StarterKit, Terminal, TerminalId, TerminalRef, Wire, WireId,
};
pub use circuitlab_editor::{
    evaluate_diagnostics, ComponentPatch, ContextAction, ContextMenu, ContextTarget,
    EditorSession, GraphModel, HistoryManager, HitTarget, HitTester, InteractionEngine,
    InteractionOutcome, InteractionState, Key, PointerButton, Selection, Viewport, WireDraft,
};
pub use circuitlab_settings::{Config, EditorSettings, SimulationSettings, ViewSettings};
pub use circuitlab_simulation::{
    BridgeConfig, BridgeStatus, Evaluator, EvaluatorMessage, HeuristicEvaluator,
    SimulationBridge,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, `info` when unset
///
/// Returns an error instead of panicking if a global subscriber is already
/// installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Logging is already initialized")
}

/// Summary of the workbench for a host status bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchStatus {
    pub components: usize,
    pub wires: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub zoom: f64,
    pub diagnostics: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<String>,
}

/// One editor window's worth of engine: session, interaction engine and an
/// optional simulation bridge, all sharing one event bus.
pub struct Workbench {
    config: Config,
    bus: Arc<EventBus>,
    session: EditorSession,
    interaction: InteractionEngine,
    simulation: Option<SimulationBridge>,
}

impl Workbench {
    /// Builds a workbench over the standard catalog.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_catalog(config, init_standard_catalog())
    }

    pub fn with_catalog(config: Config, catalog: ComponentCatalog) -> anyhow::Result<Self> {
        config.validate().context("Invalid configuration")?;
        let bus = Arc::new(EventBus::new());
        let session = EditorSession::new(Arc::new(catalog), &config, Arc::clone(&bus));
        let interaction = InteractionEngine::new(&config);
        tracing::debug!("Workbench created");
        Ok(Self {
            config,
            bus,
            session,
            interaction,
            simulation: None,
        })
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Config::load_or_default(path.as_ref())
            .with_context(|| format!("Failed to load {}", path.as_ref().display()))?;
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn interaction(&self) -> &InteractionEngine {
        &self.interaction
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.interaction.viewport_mut()
    }

    pub fn simulation(&self) -> Option<&SimulationBridge> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut SimulationBridge> {
        self.simulation.as_mut()
    }

    /// Starts the simulation bridge, subscribes it to graph changes and
    /// sends it the current graph. Does nothing if it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_simulation(&mut self) -> std::result::Result<&mut SimulationBridge, SimulationError> {
        if self.simulation.as_ref().is_some_and(|b| !b.is_terminated()) {
            return self.simulation.as_mut().ok_or(SimulationError::BridgeTerminated);
        }
        let mut bridge = SimulationBridge::start(BridgeConfig::from_settings(&self.config.simulation))?;
        bridge.attach(Arc::clone(&self.bus));
        if self.session.advanced_mode() {
            bridge.set_advanced_mode(true)?;
        }
        bridge.update_graph(self.session.project())?;
        Ok(self.simulation.insert(bridge))
    }

    /// Stops and drops the simulation bridge.
    pub fn stop_simulation(&mut self) {
        if let Some(mut bridge) = self.simulation.take() {
            bridge.stop();
        }
    }

    /// Toggles advanced mode in the editor diagnostics and the simulation.
    pub fn set_advanced_mode(&mut self, enabled: bool) {
        self.session.set_advanced_mode(enabled);
        if let Some(bridge) = self.simulation.as_mut() {
            if let Err(e) = bridge.set_advanced_mode(enabled) {
                tracing::warn!("Advanced mode not sent to simulation: {}", e);
            }
        }
    }

    pub fn place_component(
        &mut self,
        kind: ComponentKind,
        screen: Point,
    ) -> std::result::Result<InteractionOutcome, GraphError> {
        self.interaction.place_component(&mut self.session, kind, screen)
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> InteractionOutcome {
        self.interaction.pointer_down(&mut self.session, screen, button)
    }

    pub fn pointer_move(&mut self, screen: Point) -> InteractionOutcome {
        self.interaction.pointer_move(&mut self.session, screen)
    }

    pub fn pointer_up(&mut self, screen: Point) -> InteractionOutcome {
        self.interaction.pointer_up(&mut self.session, screen)
    }

    pub fn key_down(&mut self, key: Key) -> InteractionOutcome {
        self.interaction.key_down(&mut self.session, key)
    }

    pub fn wheel(&mut self, delta_y: f64, screen: Point) -> InteractionOutcome {
        self.interaction.wheel(delta_y, screen)
    }

    pub fn choose_context_action(&mut self, action: ContextAction) -> InteractionOutcome {
        self.interaction.choose_context_action(&mut self.session, action)
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    /// Rendered path of the wire being drafted, if any.
    pub fn draft_path(&self) -> Option<Vec<Point>> {
        self.interaction.preview_path(self.session.graph())
    }

    pub fn open_project(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.session.open_project_file(path)
    }

    pub fn save_project(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.session.save_project_file(path)
    }

    pub fn status(&self) -> WorkbenchStatus {
        let graph = self.session.graph();
        WorkbenchStatus {
            components: graph.component_count(),
            wires: graph.wire_count(),
            can_undo: self.session.history().can_undo(),
            can_redo: self.session.history().can_redo(),
            zoom: self.interaction.viewport().zoom(),
            diagnostics: self.session.diagnostics().len(),
            simulation: self.simulation.as_ref().map(|b| b.status().to_string()),
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
