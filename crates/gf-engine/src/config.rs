//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbols::SymbolSet;
use crate::timing::TimingProfile;

/// Grid specification (rows × columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of rows (each row is one payline in the cascade variant)
    pub rows: u8,
    /// Number of columns (reels)
    pub cols: u8,
}

impl GridSpec {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// Classic machine: a single row of three reels
    pub fn classic_row() -> Self {
        Self::new(1, 3)
    }

    /// Cascade machine: 4 rows × 5 columns
    pub fn cascade_4x5() -> Self {
        Self::new(4, 5)
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::cascade_4x5()
    }
}

/// Which machine a config describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Frequency tally over a single row, with gem locking and combo streak
    Classic,
    /// Per-row paylines with wilds, scatters and cascades
    Cascade,
}

/// Rules of the classic tally machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicRules {
    /// Tokens at session start
    pub initial_tokens: u64,
    /// Tokens charged per spin
    pub spin_cost: u64,
    /// Base payout when the most frequent symbol appears twice
    pub pair_payout: u64,
    /// Base payout when it appears three or more times
    pub triple_payout: u64,
    /// Bonus fraction added per consecutive winning spin
    pub combo_step: f64,
}

impl ClassicRules {
    /// Base payout for the highest symbol frequency on the grid
    pub fn base_payout(&self, max_count: u32) -> u64 {
        match max_count {
            0 | 1 => 0,
            2 => self.pair_payout,
            _ => self.triple_payout,
        }
    }

    /// Combo-adjusted payout, rounded half away from zero
    pub fn combo_payout(&self, base: u64, streak: u32) -> u64 {
        let multiplier = 1.0 + streak as f64 * self.combo_step;
        (base as f64 * multiplier).round() as u64
    }
}

impl Default for ClassicRules {
    fn default() -> Self {
        Self {
            initial_tokens: 50,
            spin_cost: 1,
            pair_payout: 10,
            triple_payout: 50,
            combo_step: 0.1,
        }
    }
}

/// Rules of the cascade machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeRules {
    /// Tokens at session start
    pub initial_tokens: u64,
    /// Tokens charged per paid spin
    pub spin_cost: u64,
    /// Scatters needed anywhere on the grid to grant free spins
    pub scatter_trigger_count: u32,
    /// Free spins granted per trigger
    pub free_spins_per_trigger: u32,
    /// Starting multiplier of a paid spin
    pub base_multiplier: u32,
    /// Starting multiplier of a spin taken from the free-spin pool
    pub free_spin_multiplier: u32,
    /// Added to the running multiplier after every winning evaluation
    pub multiplier_step: u32,
    /// Stop a chain after this many winning evaluations (0 = unbounded)
    #[serde(default)]
    pub max_depth: u32,
}

impl Default for CascadeRules {
    fn default() -> Self {
        Self {
            initial_tokens: 100,
            spin_cost: 1,
            scatter_trigger_count: 3,
            free_spins_per_trigger: 10,
            base_multiplier: 1,
            free_spin_multiplier: 2,
            multiplier_step: 1,
            max_depth: 0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Identifier used in traces (e.g., "gemfall_cascade")
    pub name: String,
    pub variant: Variant,
    pub grid: GridSpec,
    /// Custom alphabet; the variant's preset set when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<SymbolSet>,
    #[serde(default)]
    pub classic: ClassicRules,
    #[serde(default)]
    pub cascade: CascadeRules,
    #[serde(default)]
    pub timing: TimingProfile,
}

impl GameConfig {
    /// Single row of three gems, tally scoring
    pub fn classic() -> Self {
        Self {
            name: "gemfall_classic".into(),
            variant: Variant::Classic,
            grid: GridSpec::classic_row(),
            symbols: None,
            classic: ClassicRules::default(),
            cascade: CascadeRules::default(),
            timing: TimingProfile::Normal,
        }
    }

    /// 4×5 payline grid with wild, scatter and cascades
    pub fn cascade() -> Self {
        Self {
            name: "gemfall_cascade".into(),
            variant: Variant::Cascade,
            grid: GridSpec::cascade_4x5(),
            symbols: None,
            classic: ClassicRules::default(),
            cascade: CascadeRules::default(),
            timing: TimingProfile::Normal,
        }
    }

    /// Preset config for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::Cascade => Self::cascade(),
        }
    }

    /// Alphabet in effect for this config
    pub fn symbol_set(&self) -> SymbolSet {
        match (&self.symbols, self.variant) {
            (Some(set), _) => set.clone(),
            (None, Variant::Classic) => SymbolSet::gems(),
            (None, Variant::Cascade) => SymbolSet::cascade(),
        }
    }

    /// Check rule values. Symbol-set checks happen when the pay table is built.
    pub fn validate(&self) -> EngineResult<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "grid {}x{} has no cells",
                self.grid.rows, self.grid.cols
            )));
        }
        match self.variant {
            Variant::Classic => {
                if self.classic.spin_cost == 0 {
                    return Err(EngineError::InvalidConfig("classic spin_cost must be > 0".into()));
                }
                if !self.classic.combo_step.is_finite() || self.classic.combo_step < 0.0 {
                    return Err(EngineError::InvalidConfig(format!(
                        "classic combo_step {} must be a non-negative number",
                        self.classic.combo_step
                    )));
                }
            }
            Variant::Cascade => {
                if self.cascade.spin_cost == 0 {
                    return Err(EngineError::InvalidConfig("cascade spin_cost must be > 0".into()));
                }
                if self.cascade.base_multiplier == 0 || self.cascade.free_spin_multiplier == 0 {
                    return Err(EngineError::InvalidConfig(
                        "starting multipliers must be >= 1".into(),
                    ));
                }
                if self.cascade.scatter_trigger_count == 0 {
                    return Err(EngineError::InvalidConfig(
                        "scatter_trigger_count must be >= 1".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Parse JSON config
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML config
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            Some("json") => Self::from_json(&text),
            other => Err(EngineError::InvalidConfig(format!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::cascade()
    }
}
