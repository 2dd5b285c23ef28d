//! Headless session controllers
//!
//! A session owns a [`GemEngine`](crate::GemEngine) plus the player-facing
//! state around it (tokens, score, free spins, the visible grid) and turns
//! player actions into engine calls. Every observable moment is pushed to a
//! [`StageSink`] as a [`StageEvent`]; timestamps come from the configured
//! timing profile so a presentation layer can replay them.
//!
//! Sessions never sleep. Pacing is the caller's job: call the phase methods
//! (`begin_spin` / `resolve_spin`, `start_spin` / `advance`) from whatever
//! timer drives the UI.

mod cascade;
mod classic;

pub use cascade::{CascadeRound, CascadeSession};
pub use classic::{ClassicOutcome, ClassicSession};

use gf_stage::{NullSink, Stage, StageEvent, StageSink};
use serde::{Deserialize, Serialize};

use crate::timing::{TimestampGenerator, TimingConfig};

/// Session state tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Ready for input
    #[default]
    Idle,
    /// Symbols rerolled, waiting for the spin to resolve
    Spinning,
    /// Cascade chain in progress
    Cascading,
    /// Classic spin resolved, spin button locked out
    Cooldown,
    /// Out of tokens; only restart leaves this state
    GameOver,
}

impl GameState {
    /// A spin is being resolved
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Spinning | Self::Cascading | Self::Cooldown)
    }
}

/// Timestamps and spin numbering for outgoing stage events
struct StageEmitter {
    sink: Box<dyn StageSink>,
    timestamps: TimestampGenerator,
    spin_index: u64,
    /// Current spin came out of the free-spin pool
    free_spin: bool,
}

impl StageEmitter {
    fn new(timing: TimingConfig) -> Self {
        Self {
            sink: Box::new(NullSink),
            timestamps: TimestampGenerator::new(timing),
            spin_index: 0,
            free_spin: false,
        }
    }

    /// Number the next spin and restart the clock
    fn next_spin(&mut self, free_spin: bool) {
        self.spin_index += 1;
        self.free_spin = free_spin;
        self.timestamps.reset();
    }

    fn emit(&mut self, stage: Stage) {
        let mut event = StageEvent::new(stage, self.timestamps.current()).with_spin(self.spin_index);
        if self.free_spin {
            event = event.with_tag("free_spin");
        }
        self.sink.emit(&event);
    }
}
