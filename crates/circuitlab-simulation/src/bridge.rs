//! Simulation bridge.
//!
//! Owns the background evaluation task and the live readings shown in the
//! editor. Requests sent before the task reports ready are queued and
//! flushed in order. Incoming messages are applied when the host calls
//! [`SimulationBridge::poll`] or awaits [`SimulationBridge::recv`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use circuitlab_core::{
    CircuitSnapshot, DiagnosticMessage, EditorEvent, EventBus, EventCategory, EventFilter,
    Severity, SimulationError, SimulationEvent, SimulationReading, SubscriptionId,
};
use circuitlab_settings::SimulationSettings;

use crate::evaluator::{CoachingFilter, Evaluator, HeuristicEvaluator};
use crate::protocol::{BridgeRequest, EvaluatorMessage, TickPayload};

/// Id of the diagnostic shown while the evaluation task is failing.
pub const EVALUATION_FAILURE: &str = "evaluation-failure";

type EvaluatorFactory = Arc<dyn Fn() -> Box<dyn Evaluator> + Send + Sync>;

/// Bridge configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// Time between ticks while running
    pub tick_interval: Duration,
    /// Queue a `run` right after `init`
    pub auto_run: bool,
}

impl BridgeConfig {
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            tick_interval: Duration::from_millis(settings.tick_interval_ms.max(1)),
            auto_run: settings.auto_run,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_settings(&SimulationSettings::default())
    }
}

/// Lifecycle of the bridge as seen by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    /// Waiting for the task to answer `init`
    Starting,
    /// Task ready, never run since the last reset
    Ready,
    Running,
    Paused,
    /// The task reported an error or died
    Failed,
    Stopped,
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
            Self::Failed => write!(f, "Failed"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Outgoing side of the bridge, shared with bus subscribers.
struct Outbox {
    tx: Option<mpsc::UnboundedSender<BridgeRequest>>,
    ready: bool,
    pending: VecDeque<BridgeRequest>,
    latest_graph: Option<CircuitSnapshot>,
    terminated: bool,
}

impl Outbox {
    fn new(tx: mpsc::UnboundedSender<BridgeRequest>) -> Self {
        Self {
            tx: Some(tx),
            ready: false,
            pending: VecDeque::new(),
            latest_graph: None,
            terminated: false,
        }
    }

    fn send(&mut self, request: BridgeRequest) -> Result<(), SimulationError> {
        if self.terminated {
            return Err(SimulationError::BridgeTerminated);
        }
        if let BridgeRequest::UpdateGraph(snapshot) = &request {
            self.latest_graph = Some(snapshot.clone());
        }
        if !self.ready {
            tracing::trace!("Queued {} until the evaluation task is ready", request.name());
            self.pending.push_back(request);
            return Ok(());
        }
        self.deliver(request)
    }

    fn deliver(&self, request: BridgeRequest) -> Result<(), SimulationError> {
        let tx = self.tx.as_ref().ok_or(SimulationError::BridgeTerminated)?;
        tx.send(request)
            .map_err(|e| SimulationError::EvaluationTaskFailure {
                reason: format!("evaluation task is gone, {} was dropped", e.0.name()),
            })
    }

    fn mark_ready(&mut self) -> Result<(), SimulationError> {
        self.ready = true;
        while let Some(request) = self.pending.pop_front() {
            self.deliver(request)?;
        }
        Ok(())
    }

    /// Points the outbox at a fresh task. Anything still queued belongs to
    /// the old task and is discarded.
    fn rebind(&mut self, tx: mpsc::UnboundedSender<BridgeRequest>) {
        self.tx = Some(tx);
        self.ready = false;
        self.pending.clear();
    }
}

/// Cloneable handle for pushing requests from other owners, such as an
/// event bus subscription.
#[derive(Clone)]
pub struct BridgeSender {
    outbox: Arc<Mutex<Outbox>>,
}

impl BridgeSender {
    pub fn send(&self, request: BridgeRequest) -> Result<(), SimulationError> {
        self.outbox.lock().send(request)
    }

    pub fn update_graph(&self, snapshot: CircuitSnapshot) -> Result<(), SimulationError> {
        self.send(BridgeRequest::UpdateGraph(snapshot))
    }
}

impl fmt::Debug for BridgeSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSender").finish_non_exhaustive()
    }
}

/// Editor-side end of the simulation.
///
/// Readings and the coaching feed live here and are only touched by the
/// owning thread. Dropping the bridge stops the task.
pub struct SimulationBridge {
    config: BridgeConfig,
    runtime: Handle,
    factory: EvaluatorFactory,
    outbox: Arc<Mutex<Outbox>>,
    inbound: mpsc::UnboundedReceiver<EvaluatorMessage>,
    task: Option<JoinHandle<()>>,
    task_lost: bool,
    bus: Option<Arc<EventBus>>,
    subscription: Option<SubscriptionId>,
    status: BridgeStatus,
    readings: Vec<SimulationReading>,
    diagnostics: Vec<DiagnosticMessage>,
    frequency: Option<f64>,
    last_tick_at: Option<DateTime<Utc>>,
    generation: u64,
    advanced_mode: bool,
    wants_running: bool,
}

impl SimulationBridge {
    /// Starts a bridge backed by [`HeuristicEvaluator`].
    ///
    /// # Errors
    ///
    /// [`SimulationError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(config: BridgeConfig) -> Result<Self, SimulationError> {
        Self::start_with(config, || Box::new(HeuristicEvaluator::new()))
    }

    /// Starts a bridge whose task evaluates with evaluators built by
    /// `factory`. The factory is called again on [`restart`].
    ///
    /// [`restart`]: SimulationBridge::restart
    pub fn start_with<F>(config: BridgeConfig, factory: F) -> Result<Self, SimulationError>
    where
        F: Fn() -> Box<dyn Evaluator> + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| SimulationError::NoRuntime)?;
        let factory: EvaluatorFactory = Arc::new(factory);
        let (tx, inbound, task) = spawn_task(&runtime, config.tick_interval, factory(), 0)?;

        let mut bridge = Self {
            config,
            runtime,
            factory,
            outbox: Arc::new(Mutex::new(Outbox::new(tx))),
            inbound,
            task: Some(task),
            task_lost: false,
            bus: None,
            subscription: None,
            status: BridgeStatus::Starting,
            readings: Vec::new(),
            diagnostics: Vec::new(),
            frequency: None,
            last_tick_at: None,
            generation: 0,
            advanced_mode: false,
            wants_running: false,
        };
        tracing::info!(
            "Simulation bridge started, ticking every {:?}",
            config.tick_interval
        );
        if config.auto_run {
            bridge.run()?;
        }
        Ok(bridge)
    }

    /// Forwards every graph change published on `bus` to the task and
    /// publishes simulation events back on it.
    pub fn attach(&mut self, bus: Arc<EventBus>) -> SubscriptionId {
        self.detach();
        let sender = self.sender();
        let id = bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Graph]),
            move |event| {
                if let EditorEvent::Graph(change) = event {
                    if let Err(e) = sender.update_graph(change.snapshot) {
                        tracing::debug!("Graph change not forwarded: {}", e);
                    }
                }
            },
        );
        self.bus = Some(bus);
        self.subscription = Some(id);
        id
    }

    /// Drops the bus subscription made by [`attach`](Self::attach).
    pub fn detach(&mut self) {
        if let (Some(bus), Some(id)) = (&self.bus, self.subscription.take()) {
            bus.unsubscribe(id);
        }
    }

    pub fn sender(&self) -> BridgeSender {
        BridgeSender {
            outbox: Arc::clone(&self.outbox),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn status(&self) -> BridgeStatus {
        self.status
    }

    /// Latest reading set; empty after reset or failure.
    pub fn readings(&self) -> &[SimulationReading] {
        &self.readings
    }

    /// Coaching messages shown since the last reset, oldest first.
    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    /// Estimated blink frequency from the latest tick.
    pub fn frequency(&self) -> Option<f64> {
        self.frequency
    }

    pub fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        self.last_tick_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn advanced_mode(&self) -> bool {
        self.advanced_mode
    }

    pub fn is_ready(&self) -> bool {
        self.outbox.lock().ready
    }

    pub fn is_terminated(&self) -> bool {
        self.outbox.lock().terminated
    }

    /// Requests waiting for the task to become ready.
    pub fn pending_requests(&self) -> usize {
        self.outbox.lock().pending.len()
    }

    pub fn update_graph(&self, snapshot: CircuitSnapshot) -> Result<(), SimulationError> {
        self.outbox.lock().send(BridgeRequest::UpdateGraph(snapshot))
    }

    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.send(BridgeRequest::Run)?;
        self.wants_running = true;
        self.status = BridgeStatus::Running;
        self.publish(SimulationEvent::Running);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SimulationError> {
        self.send(BridgeRequest::Pause)?;
        self.wants_running = false;
        if self.status != BridgeStatus::Starting {
            self.status = BridgeStatus::Paused;
        }
        self.publish(SimulationEvent::Paused);
        Ok(())
    }

    /// Clears readings and coaching right away and pauses the task. Ticks
    /// the task produced before it saw the reset are discarded on arrival.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        if self.is_terminated() {
            return Err(SimulationError::BridgeTerminated);
        }
        self.generation += 1;
        self.readings.clear();
        self.diagnostics.clear();
        self.frequency = None;
        self.last_tick_at = None;
        self.wants_running = false;
        if self.status != BridgeStatus::Starting {
            self.status = BridgeStatus::Paused;
        }
        self.publish(SimulationEvent::Reset);
        self.send(BridgeRequest::Reset {
            generation: self.generation,
        })
    }

    pub fn set_advanced_mode(&mut self, enabled: bool) -> Result<(), SimulationError> {
        self.send(BridgeRequest::SetAdvancedMode(enabled))?;
        self.advanced_mode = enabled;
        Ok(())
    }

    /// Applies every message already received. Returns how many were
    /// applied, stale ones included.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.inbound.try_recv() {
                Ok(_) if self.is_terminated() => {}
                Ok(message) => {
                    self.apply(message);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.on_task_lost();
                    break;
                }
            }
        }
        applied
    }

    /// Waits for the next message from the task, applies it and returns it.
    /// Returns `None` once the bridge is stopped or the task has died.
    pub async fn recv(&mut self) -> Option<EvaluatorMessage> {
        if self.is_terminated() {
            return None;
        }
        match self.inbound.recv().await {
            Some(message) => {
                self.apply(message.clone());
                Some(message)
            }
            None => {
                self.on_task_lost();
                None
            }
        }
    }

    /// Replaces a failed task with a fresh one, then re-sends `init`, the
    /// latest graph, advanced mode and the run state.
    pub fn restart(&mut self) -> Result<(), SimulationError> {
        if self.is_terminated() {
            return Err(SimulationError::BridgeTerminated);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let (tx, inbound, task) = spawn_task(
            &self.runtime,
            self.config.tick_interval,
            (self.factory)(),
            self.generation,
        )?;
        self.inbound = inbound;
        self.task = Some(task);
        self.task_lost = false;
        self.readings.clear();
        self.diagnostics.retain(|m| m.id != EVALUATION_FAILURE);
        self.status = BridgeStatus::Starting;

        {
            let mut outbox = self.outbox.lock();
            outbox.rebind(tx);
            if let Some(graph) = outbox.latest_graph.clone() {
                outbox.pending.push_back(BridgeRequest::UpdateGraph(graph));
            }
            if self.advanced_mode {
                outbox.pending.push_back(BridgeRequest::SetAdvancedMode(true));
            }
            if self.wants_running {
                outbox.pending.push_back(BridgeRequest::Run);
            }
        }
        tracing::info!("Simulation evaluation task restarted");
        Ok(())
    }

    /// Terminates the task. Safe to call more than once; later calls do
    /// nothing.
    pub fn stop(&mut self) {
        {
            let mut outbox = self.outbox.lock();
            if outbox.terminated {
                return;
            }
            outbox.terminated = true;
            outbox.tx = None;
            outbox.pending.clear();
        }
        self.detach();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.inbound.close();
        while self.inbound.try_recv().is_ok() {}

        self.status = BridgeStatus::Stopped;
        self.publish(SimulationEvent::Stopped);
        tracing::info!("Simulation bridge stopped");
    }

    fn send(&self, request: BridgeRequest) -> Result<(), SimulationError> {
        self.outbox.lock().send(request)
    }

    fn apply(&mut self, message: EvaluatorMessage) {
        match message {
            EvaluatorMessage::Ready => {
                // Release the lock before publishing; subscribers may send.
                let flushed = self.outbox.lock().mark_ready();
                if let Err(e) = flushed {
                    tracing::warn!("Could not flush queued requests: {}", e);
                }
                if self.status == BridgeStatus::Starting {
                    self.status = BridgeStatus::Ready;
                }
                tracing::debug!("Evaluation task ready");
                self.publish(SimulationEvent::Ready);
            }
            EvaluatorMessage::Tick(tick) => self.apply_tick(tick),
            EvaluatorMessage::Error { generation, reason } => {
                if generation < self.generation {
                    tracing::trace!("Discarding stale error from generation {}", generation);
                    return;
                }
                self.surface_failure(reason);
            }
        }
    }

    fn apply_tick(&mut self, tick: TickPayload) {
        if tick.generation < self.generation {
            tracing::trace!("Discarding stale tick from generation {}", tick.generation);
            return;
        }
        self.readings = tick.readings;
        self.frequency = tick.frequency;
        self.last_tick_at = Some(tick.timestamp);
        // Also drops the failure diagnostic, which is never active.
        self.diagnostics.retain(|m| tick.active.contains(&m.id));
        for message in tick.diagnostics {
            self.diagnostics.retain(|m| m.id != message.id);
            self.diagnostics.push(message);
        }
        if self.status == BridgeStatus::Failed {
            self.status = BridgeStatus::Running;
        }
        self.publish(SimulationEvent::Tick {
            readings: self.readings.clone(),
            frequency: self.frequency,
        });
    }

    fn on_task_lost(&mut self) {
        if self.task_lost || self.is_terminated() {
            return;
        }
        self.task_lost = true;
        self.surface_failure("evaluation task stopped unexpectedly".to_string());
    }

    fn surface_failure(&mut self, reason: String) {
        tracing::warn!("Simulation failed: {}", reason);
        self.readings.clear();
        self.frequency = None;
        if !self.diagnostics.iter().any(|m| m.id == EVALUATION_FAILURE) {
            self.diagnostics.push(
                DiagnosticMessage::new(
                    EVALUATION_FAILURE,
                    Severity::Error,
                    "Simulation stopped",
                    "The simulator hit a problem and is not producing readings.",
                )
                .with_hint("Check for wires that lead nowhere, then run the simulation again."),
            );
        }
        self.status = BridgeStatus::Failed;
        self.publish(SimulationEvent::Failed { reason });
    }

    fn publish(&self, event: SimulationEvent) {
        if let Some(bus) = &self.bus {
            if let Err(e) = bus.publish(EditorEvent::Simulation(event)) {
                tracing::trace!("Simulation event not delivered: {}", e);
            }
        }
    }
}

impl fmt::Debug for SimulationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationBridge")
            .field("config", &self.config)
            .field("status", &self.status)
            .field("generation", &self.generation)
            .field("readings", &self.readings.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl Drop for SimulationBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

type TaskChannels = (
    mpsc::UnboundedSender<BridgeRequest>,
    mpsc::UnboundedReceiver<EvaluatorMessage>,
    JoinHandle<()>,
);

fn spawn_task(
    runtime: &Handle,
    tick_interval: Duration,
    evaluator: Box<dyn Evaluator>,
    generation: u64,
) -> Result<TaskChannels, SimulationError> {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let handle = runtime.spawn(evaluation_loop(evaluator, request_rx, event_tx, tick_interval));

    // `init` goes out ahead of the queue; everything else waits for `ready`.
    request_tx
        .send(BridgeRequest::Init { generation })
        .map_err(|_| SimulationError::EvaluationTaskFailure {
            reason: "evaluation task exited before init".to_string(),
        })?;
    Ok((request_tx, event_rx, handle))
}

/// State private to the evaluation task.
#[derive(Default)]
struct TaskState {
    latest: CircuitSnapshot,
    running: bool,
    generation: u64,
    advanced_mode: bool,
    elapsed: Duration,
    coaching: CoachingFilter,
}

impl TaskState {
    /// Returns false when the bridge side is gone.
    fn apply(
        &mut self,
        request: BridgeRequest,
        events: &mpsc::UnboundedSender<EvaluatorMessage>,
    ) -> bool {
        match request {
            BridgeRequest::Init { generation } => {
                self.generation = generation;
                return events.send(EvaluatorMessage::Ready).is_ok();
            }
            BridgeRequest::UpdateGraph(snapshot) => self.latest = snapshot,
            BridgeRequest::Run => self.running = true,
            BridgeRequest::Pause => self.running = false,
            BridgeRequest::Reset { generation } => {
                self.running = false;
                self.generation = generation;
                self.elapsed = Duration::ZERO;
                self.coaching.reset();
            }
            BridgeRequest::SetAdvancedMode(enabled) => self.advanced_mode = enabled,
        }
        true
    }

    fn tick(&mut self, evaluator: &mut dyn Evaluator, step: Duration) -> EvaluatorMessage {
        self.elapsed += step;
        match evaluator.evaluate(&self.latest, self.elapsed, self.advanced_mode) {
            Ok(evaluation) => {
                let active = evaluation.diagnostics.iter().map(|m| m.id.clone()).collect();
                EvaluatorMessage::Tick(TickPayload {
                    generation: self.generation,
                    readings: evaluation.readings,
                    diagnostics: self.coaching.filter(evaluation.diagnostics),
                    active,
                    timestamp: Utc::now(),
                    frequency: evaluation.frequency,
                })
            }
            Err(e) => EvaluatorMessage::Error {
                generation: self.generation,
                reason: e.to_string(),
            },
        }
    }
}

async fn evaluation_loop(
    mut evaluator: Box<dyn Evaluator>,
    mut requests: mpsc::UnboundedReceiver<BridgeRequest>,
    events: mpsc::UnboundedSender<EvaluatorMessage>,
    tick_interval: Duration,
) {
    let tick_interval = tick_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut state = TaskState::default();

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                // Drain whatever else is queued so only the newest graph
                // is ever evaluated.
                let mut next = Some(request);
                while let Some(request) = next {
                    if !state.apply(request, &events) {
                        return;
                    }
                    next = requests.try_recv().ok();
                }
            }
            _ = ticker.tick(), if state.running => {
                let message = state.tick(evaluator.as_mut(), tick_interval);
                if events.send(message).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Evaluation task finished");
}
