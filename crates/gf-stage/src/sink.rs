//! Notification sinks
//!
//! The session controllers own a `Box<dyn StageSink>` and push every stage
//! into it. Sinks must not fail and must not block: a sound or animation
//! layer that cannot keep up drops events on its own side.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::StageEvent;
use crate::trace::StageTrace;

/// Receiver for stage events
pub trait StageSink: Send {
    /// Deliver one event. Fire-and-forget.
    fn emit(&mut self, event: &StageEvent);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StageSink for NullSink {
    fn emit(&mut self, _event: &StageEvent) {}
}

/// Sink that forwards every event to the `log` facade at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl StageSink for LogSink {
    fn emit(&mut self, event: &StageEvent) {
        log::debug!(
            "[spin {}] {:>8.0}ms {}",
            event.spin_index,
            event.timestamp_ms,
            event.type_name()
        );
    }
}

/// Cloneable recorder; every clone appends to the same trace
#[derive(Debug, Clone)]
pub struct StageRecorder {
    trace: Arc<Mutex<StageTrace>>,
}

impl StageRecorder {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            trace: Arc::new(Mutex::new(StageTrace::new(game_id))),
        }
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> StageTrace {
        self.trace.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.trace.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.lock().is_empty()
    }

    /// Drop all recorded events, keeping the game id
    pub fn clear(&self) {
        self.trace.lock().events.clear();
    }
}

impl StageSink for StageRecorder {
    fn emit(&mut self, event: &StageEvent) {
        self.trace.lock().push(event.clone());
    }
}
