//! Event system for randomizer monitoring.
//!
//! Listeners receive notifications about attempt lifecycle, sphere
//! emission, stage placement and retries. The randomizer also carries a
//! shared cancel flag checked at sphere boundaries; cancellation is
//! cooperative.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::OutOfLocationsError;
use crate::group::PlacementState;

/// Listener for randomizer lifecycle events.
pub trait RandomizerEventListener: Debug + Send + Sync {
    /// Called when an attempt begins (1-based).
    fn on_attempt_started(&self, _attempt: u32) {}

    /// Called after a stage's spheres are turned into placements.
    fn on_stage_placed(&self, _stage: &str, _state: PlacementState) {}

    /// Called when an attempt fails recoverably and a retry is scheduled.
    fn on_retry(&self, _error: &OutOfLocationsError) {}

    /// Called once a run validates.
    fn on_finished(&self, _attempts: u32) {}
}

/// Broadcaster for randomizer events.
#[derive(Debug, Default)]
pub struct EventSupport {
    listeners: Vec<Arc<dyn RandomizerEventListener>>,
}

impl EventSupport {
    pub fn new() -> Self {
        EventSupport::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn RandomizerEventListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn fire_attempt_started(&self, attempt: u32) {
        for listener in &self.listeners {
            listener.on_attempt_started(attempt);
        }
    }

    pub(crate) fn fire_stage_placed(&self, stage: &str, state: PlacementState) {
        for listener in &self.listeners {
            listener.on_stage_placed(stage, state);
        }
    }

    pub(crate) fn fire_retry(&self, error: &OutOfLocationsError) {
        for listener in &self.listeners {
            listener.on_retry(error);
        }
    }

    pub(crate) fn fire_finished(&self, attempts: u32) {
        for listener in &self.listeners {
            listener.on_finished(attempts);
        }
    }
}

/// Counts events; useful in tests and smoke monitoring.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    attempts: AtomicU32,
    retries: AtomicU32,
    stages_placed: AtomicU32,
    finishes: AtomicU32,
}

impl CountingEventListener {
    pub fn new() -> Self {
        CountingEventListener::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::Relaxed)
    }

    pub fn stages_placed(&self) -> u32 {
        self.stages_placed.load(Ordering::Relaxed)
    }

    pub fn finishes(&self) -> u32 {
        self.finishes.load(Ordering::Relaxed)
    }
}

impl RandomizerEventListener for CountingEventListener {
    fn on_attempt_started(&self, _attempt: u32) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn on_stage_placed(&self, _stage: &str, _state: PlacementState) {
        self.stages_placed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_retry(&self, _error: &OutOfLocationsError) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    fn on_finished(&self, _attempts: u32) {
        self.finishes.fetch_add(1, Ordering::Relaxed);
    }
}
