//! Paytable and win evaluation

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{ClassicRules, GridSpec};
use crate::error::{EngineError, EngineResult};
use crate::grid::{CellId, Grid};
use crate::symbols::{MIN_MATCH, PAY_TIER_COUNT, SymbolId, SymbolKind, SymbolSet};

/// A win on a single row payline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    /// Row the line runs along
    pub row: u8,
    /// Paying symbol (the wild itself for an all-wild run)
    pub symbol_id: SymbolId,
    /// Length of the contiguous run from column 0
    pub match_count: u8,
    /// Table payout for this line, before any multiplier
    pub payout: u64,
    /// Cells of the run, left to right
    pub cells: Vec<CellId>,
    /// Cells of the run holding a wild
    pub wild_cells: Vec<CellId>,
}

/// Result of a payline evaluation. Recomputed on every pass, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Cells to highlight: every paying run plus every scatter
    pub winning: BTreeSet<CellId>,
    /// Sum of line payouts (scatters contribute nothing here)
    pub total_win: u64,
    /// Scatters anywhere on the grid
    pub scatter_count: u32,
    /// Individual paying lines, top row first
    pub line_wins: Vec<LineWin>,
    /// Scatter positions in row-major order
    pub scatter_cells: Vec<CellId>,
}

impl Evaluation {
    /// Any line paid
    pub fn is_win(&self) -> bool {
        self.total_win > 0
    }

    /// Nothing paid and no scatter landed: a cascade chain ends here
    pub fn is_dead(&self) -> bool {
        self.total_win == 0 && self.scatter_count == 0
    }
}

/// Result of the classic frequency tally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEvaluation {
    /// Most frequent symbol, set only when it pays
    pub winning_symbol: Option<SymbolId>,
    /// Highest frequency of any symbol on the grid
    pub max_count: u32,
    /// Payout before the combo bonus
    pub base_win: u64,
    /// Cells holding the winning symbol
    pub winning: BTreeSet<CellId>,
}

impl TallyEvaluation {
    pub fn is_win(&self) -> bool {
        self.base_win > 0
    }
}

/// Complete paytable
#[derive(Debug, Clone, PartialEq)]
pub struct PayTable {
    symbols: SymbolSet,
    alphabet: Vec<SymbolId>,
    wild_id: Option<SymbolId>,
    scatter_id: Option<SymbolId>,
}

impl PayTable {
    /// Build and validate a paytable over a symbol set
    pub fn new(symbols: SymbolSet) -> EngineResult<Self> {
        if symbols.is_empty() {
            return Err(EngineError::InvalidPayTable("symbol set is empty".into()));
        }

        let mut seen = HashSet::new();
        let mut wilds = 0;
        let mut scatters = 0;
        let mut regulars = 0;
        for symbol in symbols.iter() {
            if !seen.insert(symbol.id) {
                return Err(EngineError::InvalidPayTable(format!(
                    "duplicate symbol id {}",
                    symbol.id
                )));
            }
            match symbol.kind {
                SymbolKind::Regular => regulars += 1,
                SymbolKind::Wild => wilds += 1,
                SymbolKind::Scatter => scatters += 1,
            }
            if symbol.kind != SymbolKind::Scatter && symbol.pays.len() != PAY_TIER_COUNT {
                return Err(EngineError::InvalidPayTable(format!(
                    "{} needs {} pay entries (3, 4, 5 of a kind), has {}",
                    symbol.name,
                    PAY_TIER_COUNT,
                    symbol.pays.len()
                )));
            }
        }

        if regulars == 0 {
            return Err(EngineError::InvalidPayTable("no regular symbols".into()));
        }
        if wilds > 1 || scatters > 1 {
            return Err(EngineError::InvalidPayTable(format!(
                "at most one wild and one scatter allowed, found {wilds} and {scatters}"
            )));
        }

        Ok(Self::from_valid(symbols))
    }

    fn from_valid(symbols: SymbolSet) -> Self {
        Self {
            alphabet: symbols.ids(),
            wild_id: symbols.wild_id(),
            scatter_id: symbols.scatter_id(),
            symbols,
        }
    }

    /// Gems + WILD + SCATTER
    pub fn standard() -> Self {
        Self::from_valid(SymbolSet::cascade())
    }

    /// The six gems only
    pub fn classic() -> Self {
        Self::from_valid(SymbolSet::gems())
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Symbols grids are drawn from, in alphabet order
    pub fn alphabet(&self) -> &[SymbolId] {
        &self.alphabet
    }

    pub fn wild_id(&self) -> Option<SymbolId> {
        self.wild_id
    }

    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.scatter_id
    }

    /// Table payout for a run; zero for unknown symbols or non-paying lengths
    pub fn pay(&self, symbol: SymbolId, match_count: u8) -> u64 {
        self.symbols
            .get(symbol)
            .map(|s| s.get_pay(match_count))
            .unwrap_or(0)
    }

    /// Reject grids that differ from the configured shape, have empty cells or
    /// reference symbols outside the table.
    pub fn check_grid(&self, grid: &Grid, spec: GridSpec) -> EngineResult<()> {
        if grid.spec() != spec {
            return Err(EngineError::GridShape {
                expected_rows: spec.rows,
                expected_cols: spec.cols,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        for (cell, symbol) in grid.cells() {
            match symbol {
                None => return Err(EngineError::EmptyCell(cell)),
                Some(symbol) if self.symbols.get(symbol).is_none() => {
                    return Err(EngineError::UnknownSymbol { symbol, cell });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Whether some `cols`-wide grid evaluates with no line win and no scatter.
    ///
    /// Two distinct regular symbols can always break a run before
    /// [`MIN_MATCH`]. With a single regular symbol every scatter-free row is
    /// one full run, so a dead grid exists only if that run pays nothing.
    pub fn has_dead_grid(&self, cols: u8) -> bool {
        if cols < MIN_MATCH {
            return true;
        }
        let regulars: Vec<SymbolId> = self
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .map(|s| s.id)
            .collect();
        match regulars.as_slice() {
            [regular] => {
                self.pay(*regular, cols) == 0
                    || self.wild_id.is_some_and(|wild| self.pay(wild, cols) == 0)
            }
            _ => true,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PAYLINE EVALUATION (cascade machine)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Evaluate every row as a left-to-right payline and count scatters
    pub fn evaluate(&self, grid: &Grid) -> Evaluation {
        let mut evaluation = Evaluation::default();

        if let Some(scatter) = self.scatter_id {
            for (cell, symbol) in grid.cells() {
                if symbol == Some(scatter) {
                    evaluation.scatter_cells.push(cell);
                    evaluation.winning.insert(cell);
                }
            }
            evaluation.scatter_count = evaluation.scatter_cells.len() as u32;
        }

        for row in 0..grid.rows() {
            if let Some(win) = self.evaluate_row(grid, row) {
                evaluation.total_win += win.payout;
                evaluation.winning.extend(win.cells.iter().copied());
                evaluation.line_wins.push(win);
            }
        }

        evaluation
    }

    fn evaluate_row(&self, grid: &Grid, row: u8) -> Option<LineWin> {
        let line = grid.row(row);

        // Undetermined while only wilds have been seen
        let mut effective: Option<SymbolId> = None;
        let mut match_count = 0u8;

        for &cell in line {
            // Empty cells and scatters break the line
            let Some(symbol) = cell else { break };
            if Some(symbol) == self.scatter_id {
                break;
            }

            let is_wild = Some(symbol) == self.wild_id;
            if is_wild || effective.is_none() || effective == Some(symbol) {
                if !is_wild && effective.is_none() {
                    effective = Some(symbol);
                }
                match_count += 1;
            } else {
                break;
            }
        }

        if match_count < MIN_MATCH {
            return None;
        }

        let symbol_id = effective.or(self.wild_id)?;
        let payout = self.pay(symbol_id, match_count);
        if payout == 0 {
            return None;
        }

        let cells: Vec<CellId> = (0..match_count).map(|col| CellId::new(row, col)).collect();
        let wild_cells = cells
            .iter()
            .copied()
            .filter(|&c| self.wild_id.is_some() && grid.get(c) == self.wild_id)
            .collect();

        Some(LineWin {
            row,
            symbol_id,
            match_count,
            payout,
            cells,
            wild_cells,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TALLY EVALUATION (classic machine)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Score a grid by its most frequent symbol.
    ///
    /// Ties for the highest frequency go to the symbol listed first in the
    /// alphabet.
    pub fn evaluate_tally(&self, grid: &Grid, rules: &ClassicRules) -> TallyEvaluation {
        let mut best: Option<(SymbolId, u32)> = None;
        for &symbol in &self.alphabet {
            let count = grid.count(symbol) as u32;
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((symbol, count));
            }
        }

        let (symbol, max_count) = best.unwrap_or((0, 0));
        let base_win = rules.base_payout(max_count);
        if base_win == 0 {
            return TallyEvaluation {
                max_count,
                ..TallyEvaluation::default()
            };
        }

        let winning = grid
            .cells()
            .filter(|&(_, s)| s == Some(symbol))
            .map(|(cell, _)| cell)
            .collect();

        TallyEvaluation {
            winning_symbol: Some(symbol),
            max_count,
            base_win,
            winning,
        }
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{
        AMETHYST, DIAMOND, EMERALD, RUBY, SAPPHIRE, SCATTER, SymbolDef, TOPAZ, WILD,
    };

    fn grid(rows: Vec<Vec<SymbolId>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_three_of_a_kind_on_top_row() {
        let table = PayTable::standard();
        let g = grid(vec![
            vec![DIAMOND, DIAMOND, DIAMOND, RUBY, SAPPHIRE],
            vec![RUBY, SAPPHIRE, EMERALD, AMETHYST, TOPAZ],
        ]);

        let result = table.evaluate(&g);
        assert_eq!(result.total_win, 50);
        assert_eq!(result.line_wins.len(), 1);
        assert_eq!(result.line_wins[0].match_count, 3);
        assert_eq!(
            result.winning.iter().copied().collect::<Vec<_>>(),
            vec![CellId::new(0, 0), CellId::new(0, 1), CellId::new(0, 2)]
        );
    }

    #[test]
    fn test_wild_extends_run() {
        let table = PayTable::standard();
        let g = grid(vec![vec![RUBY, WILD, RUBY, WILD, EMERALD]]);

        let result = table.evaluate(&g);
        let line = &result.line_wins[0];
        assert_eq!(line.symbol_id, RUBY);
        assert_eq!(line.match_count, 4);
        assert_eq!(line.payout, 120);
        assert_eq!(line.wild_cells, vec![CellId::new(0, 1), CellId::new(0, 3)]);
    }

    #[test]
    fn test_leading_wilds_lock_to_first_gem() {
        let table = PayTable::standard();
        let g = grid(vec![vec![WILD, WILD, TOPAZ, TOPAZ, RUBY]]);

        let result = table.evaluate(&g);
        assert_eq!(result.line_wins[0].symbol_id, TOPAZ);
        assert_eq!(result.total_win, 30);
    }

    #[test]
    fn test_all_wild_row_pays_wild_tier() {
        let table = PayTable::standard();
        let g = grid(vec![vec![WILD, WILD, WILD, WILD, WILD]]);
        assert_eq!(table.evaluate(&g).total_win, 250);
    }

    #[test]
    fn test_scatter_breaks_line_and_counts_separately() {
        let table = PayTable::standard();
        let g = grid(vec![
            vec![WILD, WILD, WILD, SCATTER, RUBY],
            vec![SCATTER, RUBY, RUBY, RUBY, RUBY],
        ]);

        let result = table.evaluate(&g);
        assert_eq!(result.scatter_count, 2);
        // Wild run of three pays; the scatter-led row has no line
        assert_eq!(result.total_win, 20);
        assert!(result.winning.contains(&CellId::new(0, 3)));
        assert!(result.winning.contains(&CellId::new(1, 0)));
        assert!(!result.winning.contains(&CellId::new(1, 1)));
    }

    #[test]
    fn test_empty_first_cell_skips_row() {
        let table = PayTable::standard();
        let mut g = grid(vec![vec![RUBY, RUBY, RUBY, RUBY, RUBY]]);
        g.set(CellId::new(0, 0), None);
        let result = table.evaluate(&g);
        assert_eq!(result.total_win, 0);
        assert!(result.winning.is_empty());
    }

    #[test]
    fn test_zero_entry_pays_and_highlights_nothing() {
        let set = SymbolSet::new(
            SymbolSet::cascade()
                .iter()
                .map(|s| {
                    if s.id == RUBY {
                        SymbolDef::regular(RUBY, "RUBY", &[0, 0, 400])
                    } else {
                        s.clone()
                    }
                })
                .collect(),
        );
        let table = PayTable::new(set).unwrap();
        let g = grid(vec![vec![RUBY, RUBY, RUBY, EMERALD, TOPAZ]]);

        let result = table.evaluate(&g);
        assert_eq!(result.total_win, 0);
        assert!(result.winning.is_empty());
        assert!(result.is_dead());
    }

    #[test]
    fn test_new_rejects_bad_tables() {
        assert!(PayTable::new(SymbolSet::new(Vec::new())).is_err());

        let short = SymbolSet::new(vec![SymbolDef::regular(1, "A", &[10])]);
        assert!(matches!(PayTable::new(short), Err(EngineError::InvalidPayTable(_))));

        let dup = SymbolSet::new(vec![
            SymbolDef::regular(1, "A", &[1, 2, 3]),
            SymbolDef::regular(1, "B", &[1, 2, 3]),
        ]);
        assert!(PayTable::new(dup).is_err());

        let two_wilds = SymbolSet::new(vec![
            SymbolDef::regular(1, "A", &[1, 2, 3]),
            SymbolDef::wild(2, "W1", &[1, 2, 3]),
            SymbolDef::wild(3, "W2", &[1, 2, 3]),
        ]);
        assert!(PayTable::new(two_wilds).is_err());

        assert!(PayTable::new(SymbolSet::cascade()).is_ok());
    }

    #[test]
    fn test_dead_grid_needs_a_non_paying_row() {
        assert!(PayTable::standard().has_dead_grid(5));

        let ruby_wild = PayTable::new(SymbolSet::new(vec![
            SymbolDef::regular(RUBY, "RUBY", &[1, 2, 3]),
            SymbolDef::wild(WILD, "WILD", &[5, 10, 20]),
        ]))
        .unwrap();
        assert!(!ruby_wild.has_dead_grid(5));
        assert!(!ruby_wild.has_dead_grid(3));
        // Too narrow for any run to pay
        assert!(ruby_wild.has_dead_grid(2));

        let with_scatter = PayTable::new(SymbolSet::new(vec![
            SymbolDef::regular(RUBY, "RUBY", &[1, 2, 3]),
            SymbolDef::scatter(SCATTER, "SCATTER"),
        ]))
        .unwrap();
        assert!(!with_scatter.has_dead_grid(5));

        // Five of a kind pays nothing, so a full row of RUBY is dead
        let no_top_tier = PayTable::new(SymbolSet::new(vec![SymbolDef::regular(
            RUBY,
            "RUBY",
            &[1, 2, 0],
        )]))
        .unwrap();
        assert!(no_top_tier.has_dead_grid(5));
        assert!(!no_top_tier.has_dead_grid(4));

        let silent_wild = PayTable::new(SymbolSet::new(vec![
            SymbolDef::regular(RUBY, "RUBY", &[1, 2, 3]),
            SymbolDef::wild(WILD, "WILD", &[0, 0, 0]),
        ]))
        .unwrap();
        assert!(silent_wild.has_dead_grid(5));
    }

    #[test]
    fn test_check_grid() {
        let table = PayTable::standard();
        let spec = GridSpec::new(1, 3);

        assert!(table.check_grid(&grid(vec![vec![RUBY, WILD, SCATTER]]), spec).is_ok());
        assert!(matches!(
            table.check_grid(&grid(vec![vec![RUBY, RUBY]]), spec),
            Err(EngineError::GridShape { .. })
        ));
        assert!(matches!(
            table.check_grid(&grid(vec![vec![RUBY, 42, RUBY]]), spec),
            Err(EngineError::UnknownSymbol { symbol: 42, .. })
        ));

        let mut holed = grid(vec![vec![RUBY, RUBY, RUBY]]);
        holed.set(CellId::new(0, 2), None);
        assert!(matches!(table.check_grid(&holed, spec), Err(EngineError::EmptyCell(_))));
    }

    #[test]
    fn test_tally_triple() {
        let table = PayTable::classic();
        let rules = ClassicRules::default();
        let result = table.evaluate_tally(&grid(vec![vec![RUBY, RUBY, RUBY]]), &rules);
        assert_eq!(result.winning_symbol, Some(RUBY));
        assert_eq!(result.max_count, 3);
        assert_eq!(result.base_win, 50);
        assert_eq!(result.winning.len(), 3);
    }

    #[test]
    fn test_tally_pair_highlights_only_pair() {
        let table = PayTable::classic();
        let rules = ClassicRules::default();
        let result = table.evaluate_tally(&grid(vec![vec![TOPAZ, EMERALD, TOPAZ]]), &rules);
        assert_eq!(result.winning_symbol, Some(TOPAZ));
        assert_eq!(result.base_win, 10);
        assert_eq!(
            result.winning.into_iter().collect::<Vec<_>>(),
            vec![CellId::new(0, 0), CellId::new(0, 2)]
        );
    }

    #[test]
    fn test_tally_no_match() {
        let table = PayTable::classic();
        let rules = ClassicRules::default();
        let result = table.evaluate_tally(&grid(vec![vec![DIAMOND, RUBY, TOPAZ]]), &rules);
        assert!(!result.is_win());
        assert_eq!(result.max_count, 1);
        assert!(result.winning_symbol.is_none());
        assert!(result.winning.is_empty());
    }

    #[test]
    fn test_tally_tie_prefers_alphabet_order() {
        let table = PayTable::classic();
        let rules = ClassicRules::default();
        // 2×TOPAZ and 2×RUBY: RUBY is listed before TOPAZ
        let g = grid(vec![vec![TOPAZ, TOPAZ, RUBY, RUBY]]);
        let result = table.evaluate_tally(&g, &rules);
        assert_eq!(result.winning_symbol, Some(RUBY));
        assert_eq!(result.base_win, 10);
    }
}
