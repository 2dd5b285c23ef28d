//! JSON summary printed at the end of a run

use gf_engine::{GameState, SessionStats, Variant};
use serde::Serialize;

/// Outcome of one simulator run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub game: String,
    pub variant: Variant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub spins_requested: u64,
    pub stats: SessionStats,
    /// Percent of tokens staked returned as score
    pub rtp: f64,
    /// Percent of spins that paid
    pub hit_rate: f64,
    pub final_state: FinalState,
    /// Events written to the trace file, if one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_events: Option<usize>,
}

/// Player-facing state when the run stopped
#[derive(Debug, Clone, Serialize)]
pub struct FinalState {
    pub state: GameState,
    pub tokens: u64,
    pub score: u64,
    pub free_spins: u32,
}

impl SimReport {
    pub fn new(
        game: impl Into<String>,
        variant: Variant,
        seed: Option<u64>,
        spins_requested: u64,
        stats: &SessionStats,
        final_state: FinalState,
    ) -> Self {
        Self {
            game: game.into(),
            variant,
            seed,
            spins_requested,
            rtp: stats.rtp(),
            hit_rate: stats.hit_rate(),
            stats: stats.clone(),
            final_state,
            trace_events: None,
        }
    }
}
