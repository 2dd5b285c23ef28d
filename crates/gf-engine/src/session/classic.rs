//! Classic single-row machine with one lockable gem and a combo streak

use std::collections::BTreeSet;

use gf_stage::{Stage, StageSink};
use serde::{Deserialize, Serialize};

use super::{GameState, StageEmitter};
use crate::config::ClassicRules;
use crate::engine::{GemEngine, SessionStats};
use crate::error::SessionError;
use crate::grid::{CellId, Grid};
use crate::paytable::TallyEvaluation;
use crate::symbols::SymbolId;

/// What one resolved classic spin produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicOutcome {
    pub evaluation: TallyEvaluation,
    /// Combo-adjusted payout added to the score
    pub win: u64,
    /// Streak after this spin
    pub combo_streak: u32,
    pub state: GameState,
}

/// Classic session: tally scoring, one locked cell, combo streak.
///
/// Winnings go to the score, never back to the token balance.
pub struct ClassicSession {
    engine: GemEngine,
    initial_grid: Grid,
    grid: Grid,
    locked: Option<CellId>,
    tokens: u64,
    score: u64,
    combo_streak: u32,
    last_win: u64,
    winning_symbol: Option<SymbolId>,
    winning_cells: BTreeSet<CellId>,
    state: GameState,
    emitter: StageEmitter,
}

impl ClassicSession {
    pub fn new(mut engine: GemEngine) -> Self {
        let initial_grid = engine.generate_grid();
        let emitter = StageEmitter::new(engine.timing_config());
        Self {
            tokens: engine.config().classic.initial_tokens,
            grid: initial_grid.clone(),
            initial_grid,
            engine,
            locked: None,
            score: 0,
            combo_streak: 0,
            last_win: 0,
            winning_symbol: None,
            winning_cells: BTreeSet::new(),
            state: GameState::Idle,
            emitter,
        }
    }

    /// Route stage events to `sink`
    pub fn with_sink(mut self, sink: impl StageSink + 'static) -> Self {
        self.emitter.sink = Box::new(sink);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    pub fn last_win(&self) -> u64 {
        self.last_win
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn locked_cell(&self) -> Option<CellId> {
        self.locked
    }

    /// Symbol behind the last win
    pub fn winning_symbol(&self) -> Option<SymbolId> {
        self.winning_symbol
    }

    /// Cells to highlight after the last spin
    pub fn winning_cells(&self) -> &BTreeSet<CellId> {
        &self.winning_cells
    }

    pub fn engine(&self) -> &GemEngine {
        &self.engine
    }

    pub fn stats(&self) -> &SessionStats {
        self.engine.stats()
    }

    fn rules(&self) -> &ClassicRules {
        &self.engine.config().classic
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Toggle the lock on `cell`. Any other locked cell is released.
    ///
    /// Returns the new lock state of `cell`.
    pub fn toggle_lock(&mut self, cell: CellId) -> Result<bool, SessionError> {
        if self.state == GameState::Spinning {
            return Err(SessionError::Busy(self.state));
        }
        if !self.grid.contains(cell) {
            return Err(SessionError::UnknownCell(cell));
        }

        let locked = self.locked != Some(cell);
        self.locked = locked.then_some(cell);
        self.emitter.emit(Stage::GemLock {
            row: cell.row,
            col: cell.col,
            locked,
        });
        Ok(locked)
    }

    /// Pay for a spin and reroll every unlocked cell
    pub fn begin_spin(&mut self) -> Result<(), SessionError> {
        match self.state {
            GameState::GameOver => return Err(SessionError::GameOver),
            state if state.is_busy() => return Err(SessionError::Busy(state)),
            _ => {}
        }

        let cost = self.rules().spin_cost;
        if self.tokens < cost {
            let have = self.tokens;
            self.enter_game_over();
            return Err(SessionError::InsufficientTokens { have, need: cost });
        }

        self.tokens -= cost;
        self.last_win = 0;
        self.winning_symbol = None;
        self.winning_cells.clear();

        let locked: BTreeSet<CellId> = self.locked.into_iter().collect();
        self.engine.reroll_unlocked(&mut self.grid, &locked);
        self.state = GameState::Spinning;

        self.emitter.next_spin(false);
        self.emitter.emit(Stage::SpinStart);
        Ok(())
    }

    /// Score the rerolled grid
    pub fn resolve_spin(&mut self) -> Result<ClassicOutcome, SessionError> {
        if self.state != GameState::Spinning {
            return Err(SessionError::NoSpinInProgress);
        }

        self.emitter.timestamps.spin_settle();
        self.emitter.emit(Stage::EvaluateWins);

        let evaluation = self.engine.evaluate_classic(&self.grid);
        let win = if evaluation.is_win() {
            let win = self.rules().combo_payout(evaluation.base_win, self.combo_streak);
            self.combo_streak += 1;
            win
        } else {
            self.combo_streak = 0;
            0
        };

        self.score += win;
        self.last_win = win;
        self.winning_symbol = evaluation.winning_symbol;
        self.winning_cells = evaluation.winning.clone();

        let cost = self.rules().spin_cost;
        self.engine.stats_mut().record_spin(cost, win, false);

        self.emitter.timestamps.win_reveal();
        if win > 0 {
            self.emitter.emit(Stage::WinPresent {
                win_amount: win,
                cell_count: self.winning_cells.len() as u32,
            });
        } else {
            self.emitter.emit(Stage::Lose);
        }

        if self.tokens == 0 && win == 0 {
            self.enter_game_over();
        } else {
            self.state = GameState::Cooldown;
        }

        Ok(ClassicOutcome {
            evaluation,
            win,
            combo_streak: self.combo_streak,
            state: self.state,
        })
    }

    /// Cooldown elapsed. No effect in any other state.
    pub fn end_cooldown(&mut self) {
        if self.state == GameState::Cooldown {
            self.emitter.timestamps.cooldown();
            self.emitter.emit(Stage::SpinEnd);
            self.state = GameState::Idle;
        }
    }

    /// Begin, resolve and cool down in one call
    pub fn play_round(&mut self) -> Result<ClassicOutcome, SessionError> {
        self.begin_spin()?;
        let outcome = self.resolve_spin()?;
        self.end_cooldown();
        Ok(ClassicOutcome {
            state: self.state,
            ..outcome
        })
    }

    /// Back to a fresh session on the original grid. Stats are kept.
    pub fn restart(&mut self) {
        self.tokens = self.rules().initial_tokens;
        self.score = 0;
        self.combo_streak = 0;
        self.last_win = 0;
        self.grid = self.initial_grid.clone();
        self.locked = None;
        self.winning_symbol = None;
        self.winning_cells.clear();
        self.state = GameState::Idle;

        log::info!("classic session restarted with {} tokens", self.tokens);
        self.emitter.timestamps.reset();
        self.emitter.emit(Stage::Restart);
    }

    fn enter_game_over(&mut self) {
        self.state = GameState::GameOver;
        log::info!("classic session over, final score {}", self.score);
        self.emitter.emit(Stage::GameOver {
            final_score: self.score,
        });
    }
}
