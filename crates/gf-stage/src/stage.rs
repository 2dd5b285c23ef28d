//! Stage — The enum defining all canonical Gemfall moments
//!
//! A Stage is NOT an animation and NOT a sound.
//! A Stage is the SEMANTIC MEANING of a moment in the game flow.

use serde::{Deserialize, Serialize};

/// Canonical game stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, symbols are being rerolled
    SpinStart,

    /// Grid settled, wins being evaluated
    EvaluateWins,

    /// Round complete, ready for next spin
    SpinEnd,

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Win celebration starting
    WinPresent {
        /// Payout credited for this evaluation (multiplier applied)
        #[serde(default)]
        win_amount: u64,
        /// Number of highlighted cells
        #[serde(default)]
        cell_count: u32,
    },

    /// Evaluation produced nothing
    Lose,

    // ═══════════════════════════════════════════════════════════════════════
    // CASCADE
    // ═══════════════════════════════════════════════════════════════════════
    /// First winning evaluation of a cascading round
    CascadeStart,

    /// Winners cleared, symbols fell and the grid was refilled
    CascadeStep {
        /// Step index (0-based)
        step_index: u32,
        /// Multiplier applied to this evaluation's payout
        multiplier: u32,
    },

    /// Cascade chain finished
    CascadeEnd {
        /// Number of winning evaluations in the chain
        total_steps: u32,
        /// Sum of all step payouts
        total_win: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // FEATURES
    // ═══════════════════════════════════════════════════════════════════════
    /// Scatter trigger granted free spins
    FreeSpinsAwarded {
        /// Spins granted by this trigger
        count: u32,
        /// Pool size after the grant
        remaining: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // UI
    // ═══════════════════════════════════════════════════════════════════════
    /// Player toggled a cell lock
    GemLock {
        row: u8,
        col: u8,
        /// New lock state of the cell
        locked: bool,
    },

    /// Out of tokens
    GameOver {
        /// Score at the moment the session ended
        final_score: u64,
    },

    /// Session reset to its initial state
    Restart,
}

impl Stage {
    /// Get the category of this stage
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::SpinStart | Stage::EvaluateWins | Stage::SpinEnd => StageCategory::SpinLifecycle,
            Stage::WinPresent { .. } | Stage::Lose => StageCategory::WinLifecycle,
            Stage::CascadeStart | Stage::CascadeStep { .. } | Stage::CascadeEnd { .. } => {
                StageCategory::Cascade
            }
            Stage::FreeSpinsAwarded { .. } => StageCategory::Feature,
            Stage::GemLock { .. } | Stage::GameOver { .. } | Stage::Restart => StageCategory::UI,
        }
    }

    /// Get stage type name (snake_case, matches serde tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart => "spin_start",
            Stage::EvaluateWins => "evaluate_wins",
            Stage::SpinEnd => "spin_end",
            Stage::WinPresent { .. } => "win_present",
            Stage::Lose => "lose",
            Stage::CascadeStart => "cascade_start",
            Stage::CascadeStep { .. } => "cascade_step",
            Stage::CascadeEnd { .. } => "cascade_end",
            Stage::FreeSpinsAwarded { .. } => "free_spins_awarded",
            Stage::GemLock { .. } => "gem_lock",
            Stage::GameOver { .. } => "game_over",
            Stage::Restart => "restart",
        }
    }

    /// Does this stage end a session?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::GameOver { .. })
    }
}

/// Stage category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    SpinLifecycle,
    WinLifecycle,
    Cascade,
    Feature,
    UI,
}

impl StageCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SpinLifecycle => "Spin Lifecycle",
            Self::WinLifecycle => "Win Lifecycle",
            Self::Cascade => "Cascade",
            Self::Feature => "Features",
            Self::UI => "UI",
        }
    }
}
