//! Snapshot-based undo/redo.
//!
//! A snapshot of the graph is recorded *before* each structural change.
//! Undo swaps the current graph for the most recent snapshot and keeps the
//! current graph on the redo stack; any new record clears the redo stack.
//! Only graph content is captured, so drafts, hover, selection, and the
//! viewport are never brought back by undo or redo.

use std::collections::VecDeque;

use circuitlab_core::CircuitSnapshot;

use crate::graph::GraphModel;

/// Bounded undo/redo stacks of graph snapshots.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    past: VecDeque<CircuitSnapshot>,
    future: Vec<CircuitSnapshot>,
    max_depth: usize,
}

impl HistoryManager {
    /// Creates an empty history keeping at most `max_depth` undo steps.
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Records the graph's current state as an undo step.
    pub fn snapshot(&mut self, graph: &GraphModel) {
        self.record(graph.snapshot());
    }

    /// Records an already captured state as an undo step.
    pub fn record(&mut self, snapshot: CircuitSnapshot) {
        self.past.push_back(snapshot);
        self.future.clear();
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }

    /// Restores the most recent snapshot. Returns false if there is nothing
    /// to undo.
    pub fn undo(&mut self, graph: &mut GraphModel) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future.push(graph.snapshot());
        graph.load_snapshot(previous);
        true
    }

    /// Re-applies the most recently undone state. Returns false if there is
    /// nothing to redo.
    pub fn redo(&mut self, graph: &mut GraphModel) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push_back(graph.snapshot());
        graph.load_snapshot(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(100)
    }
}
