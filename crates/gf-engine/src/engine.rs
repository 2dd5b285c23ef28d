//! Gem engine: config, pay table and RNG behind one handle

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::cascade::{self, CascadeResolver, CascadeStep};
use crate::config::{GameConfig, Variant};
use crate::error::{EngineError, EngineResult};
use crate::grid::{self, CellId, Grid, random_symbol};
use crate::paytable::{Evaluation, PayTable, TallyEvaluation};
use crate::timing::TimingConfig;

/// Gem engine: generates grids and scores them for one config
#[derive(Debug, Clone)]
pub struct GemEngine {
    config: GameConfig,
    paytable: PayTable,
    rng: StdRng,
    stats: SessionStats,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Spins played, free spins included
    pub total_spins: u64,
    pub free_spins_played: u64,
    pub total_staked: u64,
    pub total_won: u64,
    pub wins: u64,
    pub losses: u64,
    /// Spins whose chain had at least one winning cascade evaluation
    pub cascade_chains: u64,
    /// Most winning evaluations in one chain
    pub longest_chain: u32,
    pub free_spins_awarded: u64,
    pub max_round_win: u64,
}

impl SessionStats {
    /// Return to player, in percent of tokens staked
    pub fn rtp(&self) -> f64 {
        if self.total_staked > 0 {
            (self.total_won as f64 / self.total_staked as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Winning spins, in percent of spins played
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Record one finished spin
    pub fn record_spin(&mut self, staked: u64, won: u64, free_spin: bool) {
        self.total_spins += 1;
        self.total_staked += staked;
        self.total_won += won;
        if free_spin {
            self.free_spins_played += 1;
        }
        if won > 0 {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.max_round_win = self.max_round_win.max(won);
    }

    /// Record the winning depth of a finished cascade chain
    pub fn record_chain(&mut self, winning_steps: u32, free_spins_awarded: u32) {
        if winning_steps > 0 {
            self.cascade_chains += 1;
        }
        self.longest_chain = self.longest_chain.max(winning_steps);
        self.free_spins_awarded += free_spins_awarded as u64;
    }
}

impl GemEngine {
    /// Build an engine for a validated config, seeded from the OS
    pub fn new(config: GameConfig) -> EngineResult<Self> {
        config.validate()?;
        let paytable = PayTable::new(config.symbol_set())?;
        check_chain_ends(&config, &paytable)?;
        Ok(Self::with_parts(config, paytable))
    }

    /// Classic single-row gem machine
    pub fn classic() -> Self {
        Self::with_parts(GameConfig::classic(), PayTable::classic())
    }

    /// 4×5 cascade machine
    pub fn cascade() -> Self {
        Self::with_parts(GameConfig::cascade(), PayTable::standard())
    }

    fn with_parts(config: GameConfig, paytable: PayTable) -> Self {
        Self {
            config,
            paytable,
            rng: StdRng::from_os_rng(),
            stats: SessionStats::default(),
        }
    }

    /// Builder-style seeding
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed(seed);
        self
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    pub fn timing_config(&self) -> TimingConfig {
        TimingConfig::from_profile(self.config.timing)
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SessionStats {
        &mut self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GRIDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fresh grid of the configured shape
    pub fn generate_grid(&mut self) -> Grid {
        grid::generate_grid(self.config.grid, self.paytable.alphabet(), &mut self.rng)
    }

    /// Redraw every cell not in `locked`
    pub fn reroll_unlocked(&mut self, grid: &mut Grid, locked: &BTreeSet<CellId>) {
        let alphabet = self.paytable.alphabet();
        let cells: Vec<CellId> = grid
            .cells()
            .map(|(cell, _)| cell)
            .filter(|cell| !locked.contains(cell))
            .collect();
        for cell in cells {
            grid.set(cell, Some(random_symbol(alphabet, &mut self.rng)));
        }
    }

    /// Reject grids this engine cannot score
    pub fn check_grid(&self, grid: &Grid) -> EngineResult<()> {
        self.paytable.check_grid(grid, self.config.grid)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Payline evaluation
    pub fn evaluate(&self, grid: &Grid) -> Evaluation {
        self.paytable.evaluate(grid)
    }

    /// Frequency-tally evaluation
    pub fn evaluate_classic(&self, grid: &Grid) -> TallyEvaluation {
        self.paytable.evaluate_tally(grid, &self.config.classic)
    }

    /// Run a whole cascade chain with the configured rules
    pub fn resolve_cascade(&mut self, grid: Grid, initial_multiplier: u32) -> Vec<CascadeStep> {
        cascade::resolve_cascade(
            grid,
            &self.paytable,
            &self.config.cascade,
            initial_multiplier,
            &mut self.rng,
        )
    }

    /// Start a chain to be driven one [`step`](Self::step) at a time
    pub fn cascade_resolver(&self, grid: Grid, initial_multiplier: u32) -> CascadeResolver {
        CascadeResolver::new(grid, initial_multiplier)
    }

    /// Advance a chain by one evaluation
    pub fn step(&mut self, resolver: &mut CascadeResolver) -> Option<CascadeStep> {
        resolver.step(&self.paytable, &self.config.cascade, &mut self.rng)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Export config as JSON
    pub fn export_config(&self) -> EngineResult<String> {
        self.config.to_json()
    }

    /// Replace config and pay table from JSON. The engine is unchanged on error.
    pub fn import_config(&mut self, json: &str) -> EngineResult<()> {
        let config = GameConfig::from_json(json)?;
        let paytable = PayTable::new(config.symbol_set())?;
        check_chain_ends(&config, &paytable)?;
        log::info!("imported config '{}' ({:?})", config.name, config.variant);
        self.config = config;
        self.paytable = paytable;
        Ok(())
    }
}

/// A cascade chain only ends on a dead grid. Without one it needs a depth limit.
fn check_chain_ends(config: &GameConfig, paytable: &PayTable) -> EngineResult<()> {
    if config.variant == Variant::Cascade
        && config.cascade.max_depth == 0
        && !paytable.has_dead_grid(config.grid.cols)
    {
        return Err(EngineError::InvalidConfig(format!(
            "every {}-column grid of '{}' wins, so cascade.max_depth must be > 0",
            config.grid.cols, config.name
        )));
    }
    Ok(())
}

impl Default for GemEngine {
    fn default() -> Self {
        Self::cascade()
    }
}
