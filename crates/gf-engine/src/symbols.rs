//! Symbol definitions and the gem alphabet

use serde::{Deserialize, Serialize};

/// Symbol identifier, unique within a [`SymbolSet`]
pub type SymbolId = u32;

/// Shortest run that can pay on a line
pub const MIN_MATCH: u8 = 3;

/// Longest run with its own pay tier; longer runs pay at this tier
pub const MAX_MATCH: u8 = 5;

/// Number of pay tiers (3, 4 and 5 of a kind)
pub const PAY_TIER_COUNT: usize = (MAX_MATCH - MIN_MATCH + 1) as usize;

pub const DIAMOND: SymbolId = 1;
pub const RUBY: SymbolId = 2;
pub const SAPPHIRE: SymbolId = 3;
pub const EMERALD: SymbolId = 4;
pub const AMETHYST: SymbolId = 5;
pub const TOPAZ: SymbolId = 6;
pub const WILD: SymbolId = 7;
pub const SCATTER: SymbolId = 8;

/// Symbol kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying gem
    Regular,
    /// Wild - substitutes for any non-scatter symbol on a line
    Wild,
    /// Scatter - counted grid-wide, never part of a line
    Scatter,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: SymbolId,
    /// Display name (e.g., "DIAMOND", "WILD")
    pub name: String,
    pub kind: SymbolKind,
    /// Pay values for 3, 4, 5 of a kind (index 0 = 3oak). A zero entry
    /// means that length does not pay.
    #[serde(default)]
    pub pays: Vec<u64>,
}

impl SymbolDef {
    /// Create a regular symbol
    pub fn regular(id: SymbolId, name: impl Into<String>, pays: &[u64]) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Regular,
            pays: pays.to_vec(),
        }
    }

    /// Create a wild symbol; its pays apply to lines made only of wilds
    pub fn wild(id: SymbolId, name: impl Into<String>, pays: &[u64]) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Wild,
            pays: pays.to_vec(),
        }
    }

    /// Create a scatter symbol
    pub fn scatter(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Scatter,
            pays: Vec::new(),
        }
    }

    /// Get pay value for a run length, capped at the top tier
    pub fn get_pay(&self, match_count: u8) -> u64 {
        if match_count < MIN_MATCH {
            return 0;
        }
        let idx = (match_count.min(MAX_MATCH) - MIN_MATCH) as usize;
        self.pays.get(idx).copied().unwrap_or(0)
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind == SymbolKind::Scatter
    }
}

/// An ordered symbol alphabet.
///
/// Order matters: grids draw uniformly over it and the classic tally
/// breaks ties in favour of the symbol listed first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolSet {
    symbols: Vec<SymbolDef>,
}

impl SymbolSet {
    pub fn new(symbols: Vec<SymbolDef>) -> Self {
        Self { symbols }
    }

    /// The six gems of the classic machine
    pub fn gems() -> Self {
        Self::new(vec![
            SymbolDef::regular(DIAMOND, "DIAMOND", &[50, 150, 500]),
            SymbolDef::regular(RUBY, "RUBY", &[40, 120, 400]),
            SymbolDef::regular(SAPPHIRE, "SAPPHIRE", &[30, 90, 300]),
            SymbolDef::regular(EMERALD, "EMERALD", &[20, 60, 200]),
            SymbolDef::regular(AMETHYST, "AMETHYST", &[15, 45, 150]),
            SymbolDef::regular(TOPAZ, "TOPAZ", &[10, 30, 100]),
        ])
    }

    /// Gems plus WILD and SCATTER for the cascade machine
    pub fn cascade() -> Self {
        let mut set = Self::gems();
        set.symbols.push(SymbolDef::wild(WILD, "WILD", &[20, 80, 250]));
        set.symbols.push(SymbolDef::scatter(SCATTER, "SCATTER"));
        set
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// All symbol IDs in alphabet order
    pub fn ids(&self) -> Vec<SymbolId> {
        self.symbols.iter().map(|s| s.id).collect()
    }

    /// Name for a symbol, "?" when unknown
    pub fn name_of(&self, id: SymbolId) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("?")
    }

    pub fn wild_id(&self) -> Option<SymbolId> {
        self.symbols.iter().find(|s| s.is_wild()).map(|s| s.id)
    }

    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.symbols.iter().find(|s| s.is_scatter()).map(|s| s.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolDef> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::cascade()
    }
}
