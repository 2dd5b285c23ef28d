//! Cascade resolution: evaluate → clear → fall → refill → evaluate ...
//!
//! [`CascadeResolver`] owns the state of one chain and produces exactly one
//! [`CascadeStep`] per call, so a caller can pace the chain with its own
//! timers (or not at all) and drop it at any point without cleanup.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CascadeRules;
use crate::grid::{CellId, Grid, random_symbol};
use crate::paytable::{Evaluation, PayTable};
use crate::symbols::SymbolId;

/// Where a resolver is in its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePhase {
    /// Next call evaluates the current grid
    Evaluating,
    /// Last evaluation won; the grid has been collapsed and refilled
    Cascading,
    /// Chain finished
    Idle,
}

/// One evaluation within a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// Step index (0-based) within the chain
    pub index: u32,
    /// The grid that was evaluated
    pub grid: Grid,
    pub evaluation: Evaluation,
    /// Running multiplier applied to this evaluation
    pub multiplier: u32,
    /// `evaluation.total_win × multiplier`
    pub payout: u64,
    /// Free spins granted by this step's scatters
    pub free_spins_awarded: u32,
}

impl CascadeStep {
    /// Chain ends with this step (no line win, no scatter)
    pub fn is_terminal(&self) -> bool {
        self.evaluation.is_dead()
    }
}

/// State of one cascade chain
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    grid: Grid,
    multiplier: u32,
    next_index: u32,
    phase: CascadePhase,
    total_payout: u64,
}

impl CascadeResolver {
    /// Start a chain on a complete grid
    pub fn new(grid: Grid, initial_multiplier: u32) -> Self {
        Self {
            grid,
            multiplier: initial_multiplier,
            next_index: 0,
            phase: CascadePhase::Evaluating,
            total_payout: 0,
        }
    }

    /// Throw away the current chain and start a new one
    pub fn restart(&mut self, grid: Grid, initial_multiplier: u32) {
        *self = Self::new(grid, initial_multiplier);
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    /// Grid the next step will evaluate (the last evaluated grid once idle)
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Multiplier the next evaluation will use
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Sum of step payouts so far
    pub fn total_payout(&self) -> u64 {
        self.total_payout
    }

    /// Winning evaluations so far
    pub fn depth(&self) -> u32 {
        self.next_index
    }

    pub fn is_finished(&self) -> bool {
        self.phase == CascadePhase::Idle
    }

    /// Evaluate the current grid and, on a win, prepare the next one.
    ///
    /// Returns `None` once the chain has finished.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        paytable: &PayTable,
        rules: &CascadeRules,
        rng: &mut R,
    ) -> Option<CascadeStep> {
        if self.is_finished() {
            return None;
        }
        self.phase = CascadePhase::Evaluating;

        let evaluation = paytable.evaluate(&self.grid);
        let multiplier = self.multiplier;
        let index = self.next_index;

        if evaluation.is_dead() {
            self.phase = CascadePhase::Idle;
            log::debug!("cascade ended after {} winning steps", index);
            return Some(CascadeStep {
                index,
                grid: self.grid.clone(),
                evaluation,
                multiplier,
                payout: 0,
                free_spins_awarded: 0,
            });
        }

        let payout = evaluation.total_win * multiplier as u64;
        let free_spins_awarded = if evaluation.scatter_count >= rules.scatter_trigger_count {
            rules.free_spins_per_trigger
        } else {
            0
        };

        self.total_payout += payout;
        self.multiplier += rules.multiplier_step;
        self.next_index += 1;

        let mut next = self.grid.clone();
        fall_and_refill(&mut next, &evaluation.winning, paytable.alphabet(), rng);
        let evaluated = std::mem::replace(&mut self.grid, next);
        self.phase = CascadePhase::Cascading;

        log::debug!(
            "cascade step {}: win {} x{} = {}, {} scatters, {} cells cleared",
            index,
            evaluation.total_win,
            multiplier,
            payout,
            evaluation.scatter_count,
            evaluation.winning.len()
        );

        if rules.max_depth > 0 && self.next_index >= rules.max_depth {
            log::warn!("cascade depth guard hit at {} steps", self.next_index);
            self.phase = CascadePhase::Idle;
        }

        Some(CascadeStep {
            index,
            grid: evaluated,
            evaluation,
            multiplier,
            payout,
            free_spins_awarded,
        })
    }

    /// Borrow collaborators and iterate the remaining steps
    pub fn iter<'a, R: Rng + ?Sized>(
        &'a mut self,
        paytable: &'a PayTable,
        rules: &'a CascadeRules,
        rng: &'a mut R,
    ) -> CascadeIter<'a, R> {
        CascadeIter {
            resolver: self,
            paytable,
            rules,
            rng,
        }
    }
}

/// Iterator over the remaining steps of a [`CascadeResolver`]
pub struct CascadeIter<'a, R: Rng + ?Sized> {
    resolver: &'a mut CascadeResolver,
    paytable: &'a PayTable,
    rules: &'a CascadeRules,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for CascadeIter<'_, R> {
    type Item = CascadeStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.resolver.step(self.paytable, self.rules, self.rng)
    }
}

/// Run a whole chain and collect its steps. The last step is the dead
/// evaluation unless `rules.max_depth` cut the chain short.
pub fn resolve_cascade<R: Rng + ?Sized>(
    grid: Grid,
    paytable: &PayTable,
    rules: &CascadeRules,
    initial_multiplier: u32,
    rng: &mut R,
) -> Vec<CascadeStep> {
    let mut resolver = CascadeResolver::new(grid, initial_multiplier);
    resolver.iter(paytable, rules, rng).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// FALL / REFILL TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════

/// Empty every winning cell
pub fn clear_cells(grid: &mut Grid, cells: &BTreeSet<CellId>) {
    for &cell in cells {
        grid.set(cell, None);
    }
}

/// Compact each column's symbols to the bottom, keeping their order
pub fn apply_gravity(grid: &mut Grid) {
    let rows = grid.rows();
    for col in 0..grid.cols() {
        let kept: Vec<SymbolId> = grid.column(col).into_iter().flatten().collect();
        let gap = rows as usize - kept.len();
        for row in 0..rows {
            let symbol = (row as usize)
                .checked_sub(gap)
                .map(|i| kept[i]);
            grid.set(CellId::new(row, col), symbol);
        }
    }
}

/// Fill every empty cell with a freshly drawn symbol
pub fn refill<R: Rng + ?Sized>(grid: &mut Grid, alphabet: &[SymbolId], rng: &mut R) {
    let empty: Vec<CellId> = grid
        .cells()
        .filter(|(_, s)| s.is_none())
        .map(|(cell, _)| cell)
        .collect();
    for cell in empty {
        grid.set(cell, Some(random_symbol(alphabet, rng)));
    }
}

/// Clear winners, let the rest fall, refill from the top
pub fn fall_and_refill<R: Rng + ?Sized>(
    grid: &mut Grid,
    winners: &BTreeSet<CellId>,
    alphabet: &[SymbolId],
    rng: &mut R,
) {
    clear_cells(grid, winners);
    apply_gravity(grid);
    refill(grid, alphabet, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{AMETHYST, DIAMOND, EMERALD, RUBY, SAPPHIRE, SCATTER, TOPAZ};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_gravity_compacts_and_keeps_order() {
        let mut grid = Grid::from_rows(vec![
            vec![1, 5],
            vec![2, 6],
            vec![3, 7],
            vec![4, 8],
        ])
        .unwrap();
        grid.set(CellId::new(1, 0), None);
        grid.set(CellId::new(3, 0), None);
        grid.set(CellId::new(0, 1), None);

        apply_gravity(&mut grid);

        assert_eq!(grid.column(0), vec![None, None, Some(1), Some(3)]);
        assert_eq!(grid.column(1), vec![None, Some(6), Some(7), Some(8)]);
    }

    #[test]
    fn test_refill_fills_only_holes() {
        let mut grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        grid.set(CellId::new(0, 1), None);
        let mut rng = StdRng::seed_from_u64(1);

        refill(&mut grid, &[9], &mut rng);

        assert_eq!(grid.get(CellId::new(0, 1)), Some(9));
        assert_eq!(grid.get(CellId::new(0, 0)), Some(1));
        assert!(grid.is_complete());
    }

    #[test]
    fn test_dead_grid_yields_single_terminal_step() {
        let table = PayTable::standard();
        let rules = CascadeRules::default();
        let grid = Grid::from_rows(vec![
            vec![DIAMOND, RUBY, DIAMOND, RUBY, DIAMOND],
            vec![RUBY, DIAMOND, RUBY, DIAMOND, RUBY],
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let steps = resolve_cascade(grid.clone(), &table, &rules, 1, &mut rng);
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_terminal());
        assert_eq!(steps[0].grid, grid);
        assert_eq!(steps[0].payout, 0);
    }

    #[test]
    fn test_winning_step_applies_multiplier_and_advances() {
        let table = PayTable::standard();
        let rules = CascadeRules::default();
        let grid = Grid::from_rows(vec![
            vec![DIAMOND, DIAMOND, DIAMOND, RUBY, SAPPHIRE],
            vec![EMERALD, AMETHYST, TOPAZ, RUBY, SAPPHIRE],
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let mut resolver = CascadeResolver::new(grid, 2);
        let first = resolver.step(&table, &rules, &mut rng).unwrap();

        assert_eq!(first.index, 0);
        assert_eq!(first.multiplier, 2);
        assert_eq!(first.payout, 100);
        assert_eq!(resolver.multiplier(), 3);
        assert_eq!(resolver.phase(), CascadePhase::Cascading);
        assert!(resolver.grid().is_complete());

        // The untouched row-1 gems under cleared cells are still in place
        assert_eq!(resolver.grid().get(CellId::new(1, 0)), Some(EMERALD));
        // Cleared row-0 cells had nothing above them, so they were refilled
        assert_eq!(resolver.grid().get(CellId::new(0, 3)), Some(RUBY));
    }

    #[test]
    fn test_scatter_trigger_awards_free_spins() {
        let table = PayTable::standard();
        let rules = CascadeRules::default();
        let grid = Grid::from_rows(vec![
            vec![SCATTER, RUBY, DIAMOND, RUBY, SCATTER],
            vec![DIAMOND, SCATTER, RUBY, DIAMOND, RUBY],
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let mut resolver = CascadeResolver::new(grid, 1);
        let step = resolver.step(&table, &rules, &mut rng).unwrap();

        assert_eq!(step.evaluation.scatter_count, 3);
        assert_eq!(step.evaluation.total_win, 0);
        assert_eq!(step.payout, 0);
        assert_eq!(step.free_spins_awarded, 10);
        // Scatters alone keep the chain going
        assert!(!step.is_terminal());
        assert_eq!(resolver.phase(), CascadePhase::Cascading);
    }

    #[test]
    fn test_depth_guard_stops_chain() {
        let table = PayTable::standard();
        let rules = CascadeRules {
            max_depth: 1,
            ..CascadeRules::default()
        };
        let grid = Grid::from_rows(vec![vec![RUBY, RUBY, RUBY, RUBY, RUBY]]).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let steps = resolve_cascade(grid, &table, &rules, 1, &mut rng);
        assert_eq!(steps.len(), 1);
        assert!(!steps[0].is_terminal());
    }

    #[test]
    fn test_finished_resolver_returns_none_until_restart() {
        let table = PayTable::standard();
        let rules = CascadeRules::default();
        let dead = Grid::from_rows(vec![vec![RUBY, DIAMOND, RUBY]]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let mut resolver = CascadeResolver::new(dead.clone(), 1);
        assert!(resolver.step(&table, &rules, &mut rng).is_some());
        assert!(resolver.is_finished());
        assert!(resolver.step(&table, &rules, &mut rng).is_none());

        resolver.restart(dead, 2);
        assert_eq!(resolver.phase(), CascadePhase::Evaluating);
        assert_eq!(resolver.multiplier(), 2);
        assert!(resolver.step(&table, &rules, &mut rng).is_some());
    }
}
