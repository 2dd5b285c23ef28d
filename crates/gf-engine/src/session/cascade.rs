//! Cascade machine: paid and free spins, each resolved as a cascade chain

use std::collections::BTreeSet;

use gf_stage::{Stage, StageSink};
use serde::{Deserialize, Serialize};

use super::{GameState, StageEmitter};
use crate::cascade::{CascadeResolver, CascadeStep};
use crate::config::CascadeRules;
use crate::engine::{GemEngine, SessionStats};
use crate::error::SessionError;
use crate::grid::{CellId, Grid};

/// Summary of one spin's chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeRound {
    /// Every evaluation, the terminal one last
    pub steps: Vec<CascadeStep>,
    /// Sum of step payouts
    pub total_win: u64,
    pub free_spins_awarded: u32,
    /// The spin came out of the free-spin pool
    pub used_free_spin: bool,
}

impl CascadeRound {
    /// Evaluations that paid or landed scatters
    pub fn winning_steps(&self) -> u32 {
        self.steps.iter().filter(|s| !s.is_terminal()).count() as u32
    }
}

/// Cascade session.
///
/// Payouts go to the score; tokens only pay for spins. Free spins cost
/// nothing and start the chain at the free-spin multiplier.
pub struct CascadeSession {
    engine: GemEngine,
    grid: Grid,
    tokens: u64,
    score: u64,
    free_spins: u32,
    winning_cells: BTreeSet<CellId>,
    state: GameState,
    resolver: Option<CascadeResolver>,
    round: Option<CascadeRound>,
    emitter: StageEmitter,
}

impl CascadeSession {
    pub fn new(mut engine: GemEngine) -> Self {
        let grid = engine.generate_grid();
        let emitter = StageEmitter::new(engine.timing_config());
        Self {
            tokens: engine.config().cascade.initial_tokens,
            engine,
            grid,
            score: 0,
            free_spins: 0,
            winning_cells: BTreeSet::new(),
            state: GameState::Idle,
            resolver: None,
            round: None,
            emitter,
        }
    }

    /// Route stage events to `sink`
    pub fn with_sink(mut self, sink: impl StageSink + 'static) -> Self {
        self.emitter.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn free_spins(&self) -> u32 {
        self.free_spins
    }

    /// Last evaluated grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cells highlighted by the last evaluation; empty once a chain ends
    pub fn winning_cells(&self) -> &BTreeSet<CellId> {
        &self.winning_cells
    }

    /// Multiplier the next evaluation of the running chain will use
    pub fn multiplier(&self) -> Option<u32> {
        self.resolver.as_ref().map(CascadeResolver::multiplier)
    }

    pub fn engine(&self) -> &GemEngine {
        &self.engine
    }

    pub fn stats(&self) -> &SessionStats {
        self.engine.stats()
    }

    fn rules(&self) -> &CascadeRules {
        &self.engine.config().cascade
    }

    /// No free spin left and not enough tokens for a paid one
    pub fn is_broke(&self) -> bool {
        self.free_spins == 0 && self.tokens < self.rules().spin_cost
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STEP MODE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pay for (or take a free) spin and deal a fresh grid.
    ///
    /// Drive the chain with [`advance`](Self::advance) until it reports the
    /// terminal step.
    pub fn start_spin(&mut self) -> Result<(), SessionError> {
        match self.state {
            GameState::GameOver => return Err(SessionError::GameOver),
            state if state.is_busy() => return Err(SessionError::Busy(state)),
            _ => {}
        }

        let rules = self.rules().clone();
        let used_free_spin = self.free_spins > 0;
        let multiplier = if used_free_spin {
            rules.free_spin_multiplier
        } else if self.tokens < rules.spin_cost {
            let have = self.tokens;
            self.enter_game_over();
            return Err(SessionError::InsufficientTokens {
                have,
                need: rules.spin_cost,
            });
        } else {
            self.tokens -= rules.spin_cost;
            rules.base_multiplier
        };

        self.winning_cells.clear();
        self.grid = self.engine.generate_grid();
        self.resolver = Some(self.engine.cascade_resolver(self.grid.clone(), multiplier));
        self.round = Some(CascadeRound {
            steps: Vec::new(),
            total_win: 0,
            free_spins_awarded: 0,
            used_free_spin,
        });
        self.state = GameState::Cascading;

        self.emitter.next_spin(used_free_spin);
        self.emitter.emit(Stage::SpinStart);
        Ok(())
    }

    /// Evaluate the current grid of the running chain.
    ///
    /// Returns `Ok(Some(round))` with the finished round once the terminal
    /// step has been applied, `Ok(None)` while the chain continues.
    pub fn advance(&mut self) -> Result<Option<CascadeRound>, SessionError> {
        let (Some(resolver), Some(round)) = (self.resolver.as_mut(), self.round.as_mut()) else {
            return Err(SessionError::NoSpinInProgress);
        };

        if round.steps.is_empty() {
            self.emitter.timestamps.spin_settle();
        } else {
            self.emitter.timestamps.cascade_step();
        }
        self.emitter.emit(Stage::EvaluateWins);

        let Some(step) = self.engine.step(resolver) else {
            return Err(SessionError::NoSpinInProgress);
        };
        self.grid = step.grid.clone();

        if step.is_terminal() {
            self.winning_cells.clear();
        } else {
            self.score += step.payout;
            round.total_win += step.payout;
            self.winning_cells = step.evaluation.winning.clone();

            self.emitter.timestamps.win_reveal();
            if step.index == 0 {
                self.emitter.emit(Stage::CascadeStart);
            }
            if step.payout > 0 {
                self.emitter.emit(Stage::WinPresent {
                    win_amount: step.payout,
                    cell_count: self.winning_cells.len() as u32,
                });
            }
            if step.free_spins_awarded > 0 {
                self.free_spins += step.free_spins_awarded;
                round.free_spins_awarded += step.free_spins_awarded;
                log::info!(
                    "{} free spins awarded ({} scatters), {} remaining",
                    step.free_spins_awarded,
                    step.evaluation.scatter_count,
                    self.free_spins
                );
                self.emitter.emit(Stage::FreeSpinsAwarded {
                    count: step.free_spins_awarded,
                    remaining: self.free_spins,
                });
            }
            self.emitter.emit(Stage::CascadeStep {
                step_index: step.index,
                multiplier: step.multiplier,
            });
        }

        let finished = resolver.is_finished();
        round.steps.push(step);
        if finished {
            Ok(self.finish_round())
        } else {
            Ok(None)
        }
    }

    fn finish_round(&mut self) -> Option<CascadeRound> {
        self.resolver = None;
        // A depth-guarded chain ends on a winning step
        self.winning_cells.clear();
        let round = self.round.take()?;
        let winning_steps = round.winning_steps();

        if round.used_free_spin {
            self.free_spins = self.free_spins.saturating_sub(1);
        }
        let staked = if round.used_free_spin {
            0
        } else {
            self.rules().spin_cost
        };
        let stats = self.engine.stats_mut();
        stats.record_spin(staked, round.total_win, round.used_free_spin);
        stats.record_chain(winning_steps, round.free_spins_awarded);

        if winning_steps > 0 {
            self.emitter.emit(Stage::CascadeEnd {
                total_steps: winning_steps,
                total_win: round.total_win,
            });
        }
        if round.total_win == 0 {
            self.emitter.emit(Stage::Lose);
        }
        self.emitter.emit(Stage::SpinEnd);

        if self.is_broke() {
            self.enter_game_over();
        } else {
            self.state = GameState::Idle;
        }
        Some(round)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WHOLE SPINS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play one spin and its whole chain
    pub fn spin(&mut self) -> Result<CascadeRound, SessionError> {
        self.start_spin()?;
        loop {
            if let Some(round) = self.advance()? {
                return Ok(round);
            }
        }
    }

    /// Drop any running chain and return to a fresh session. Stats are kept.
    pub fn restart(&mut self) {
        self.resolver = None;
        self.round = None;
        self.tokens = self.rules().initial_tokens;
        self.score = 0;
        self.free_spins = 0;
        self.winning_cells.clear();
        self.grid = self.engine.generate_grid();
        self.state = GameState::Idle;

        log::info!("cascade session restarted with {} tokens", self.tokens);
        self.emitter.free_spin = false;
        self.emitter.timestamps.reset();
        self.emitter.emit(Stage::Restart);
    }

    fn enter_game_over(&mut self) {
        self.state = GameState::GameOver;
        log::info!("cascade session over, final score {}", self.score);
        self.emitter.emit(Stage::GameOver {
            final_score: self.score,
        });
    }
}
