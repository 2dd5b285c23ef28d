//! Error types for Gemfall

use thiserror::Error;

use crate::grid::CellId;
use crate::session::GameState;
use crate::symbols::SymbolId;

/// Configuration and input-validation errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid pay table: {0}")]
    InvalidPayTable(String),

    #[error("Grid shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    GridShape {
        expected_rows: u8,
        expected_cols: u8,
        rows: u8,
        cols: u8,
    },

    #[error("Ragged grid: row {row} has {len} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Empty cell at {0}")]
    EmptyCell(CellId),

    #[error("Unknown symbol {symbol} at {cell}")]
    UnknownSymbol { symbol: SymbolId, cell: CellId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result type alias
pub type EngineResult<T> = Result<T, EngineError>;

/// Rejections from the session controllers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session busy: {0:?}")]
    Busy(GameState),

    #[error("Not enough tokens: have {have}, need {need}")]
    InsufficientTokens { have: u64, need: u64 },

    #[error("Game over")]
    GameOver,

    #[error("No spin in progress")]
    NoSpinInProgress,

    #[error("Cell {0} is outside the grid")]
    UnknownCell(CellId),
}
