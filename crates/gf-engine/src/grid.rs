//! Symbol grid and random grid generation

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::error::{EngineError, EngineResult};
use crate::symbols::SymbolId;

/// Cell identity: its (row, column) position. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub row: u8,
    pub col: u8,
}

impl CellId {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}

/// A `rows × cols` arrangement of symbols, stored row-major.
///
/// `None` marks a cell emptied during cascade processing. Grids handed to
/// callers outside a cascade step are always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: u8,
    cols: u8,
    cells: Vec<Option<SymbolId>>,
}

/// Unchecked wire form of [`Grid`]
#[derive(Deserialize)]
struct RawGrid {
    rows: u8,
    cols: u8,
    cells: Vec<Option<SymbolId>>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = EngineError;

    fn try_from(raw: RawGrid) -> EngineResult<Self> {
        let expected = GridSpec::new(raw.rows, raw.cols).total_positions();
        if raw.cells.len() != expected {
            return Err(EngineError::InvalidConfig(format!(
                "{}x{} grid needs {} cells, got {}",
                raw.rows,
                raw.cols,
                expected,
                raw.cells.len()
            )));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// Grid with every cell empty
    pub fn empty(spec: GridSpec) -> Self {
        Self {
            rows: spec.rows,
            cols: spec.cols,
            cells: vec![None; spec.total_positions()],
        }
    }

    /// Build a complete grid from rows of symbols (top row first)
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> EngineResult<Self> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || expected == 0 {
            return Err(EngineError::InvalidConfig("grid must have at least one cell".into()));
        }
        if rows.len() > u8::MAX as usize || expected > u8::MAX as usize {
            return Err(EngineError::InvalidConfig(format!(
                "grid {}x{} exceeds 255x255",
                rows.len(),
                expected
            )));
        }

        let mut cells = Vec::with_capacity(rows.len() * expected);
        for (row, symbols) in rows.iter().enumerate() {
            if symbols.len() != expected {
                return Err(EngineError::RaggedGrid {
                    row,
                    len: symbols.len(),
                    expected,
                });
            }
            cells.extend(symbols.iter().copied().map(Some));
        }

        Ok(Self {
            rows: rows.len() as u8,
            cols: expected as u8,
            cells,
        })
    }

    pub fn spec(&self) -> GridSpec {
        GridSpec::new(self.rows, self.cols)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn contains(&self, cell: CellId) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    fn index(&self, cell: CellId) -> usize {
        assert!(self.contains(cell), "cell {cell} outside {}x{} grid", self.rows, self.cols);
        cell.row as usize * self.cols as usize + cell.col as usize
    }

    /// Symbol at a cell. Panics if the cell is outside the grid.
    pub fn get(&self, cell: CellId) -> Option<SymbolId> {
        self.cells[self.index(cell)]
    }

    /// Replace the symbol at a cell. Panics if the cell is outside the grid.
    pub fn set(&mut self, cell: CellId, symbol: Option<SymbolId>) {
        let idx = self.index(cell);
        self.cells[idx] = symbol;
    }

    /// One row, left to right
    pub fn row(&self, row: u8) -> &[Option<SymbolId>] {
        let start = row as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }

    /// One column, top to bottom
    pub fn column(&self, col: u8) -> Vec<Option<SymbolId>> {
        (0..self.rows).map(|row| self.get(CellId::new(row, col))).collect()
    }

    /// Every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellId, Option<SymbolId>)> + '_ {
        let cols = self.cols as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &symbol)| (CellId::new((i / cols) as u8, (i % cols) as u8), symbol))
    }

    /// Every cell holds a symbol
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of cells holding `symbol`
    pub fn count(&self, symbol: SymbolId) -> usize {
        self.cells.iter().filter(|&&s| s == Some(symbol)).count()
    }

    /// Rows of symbols, top row first
    pub fn to_rows(&self) -> Vec<Vec<Option<SymbolId>>> {
        (0..self.rows).map(|row| self.row(row).to_vec()).collect()
    }
}

/// Draw one symbol uniformly from the alphabet.
///
/// The alphabet is never empty: pay tables refuse to build without one.
pub fn random_symbol<R: Rng + ?Sized>(alphabet: &[SymbolId], rng: &mut R) -> SymbolId {
    alphabet[rng.random_range(0..alphabet.len())]
}

/// Generate a grid where every cell is drawn independently and uniformly
pub fn generate_grid<R: Rng + ?Sized>(spec: GridSpec, alphabet: &[SymbolId], rng: &mut R) -> Grid {
    let mut grid = Grid::empty(spec);
    for symbol in grid.cells.iter_mut() {
        *symbol = Some(random_symbol(alphabet, rng));
    }
    grid
}
