//! StageEvent — A stage occurrence with timing metadata

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event with its position on the round timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Timestamp in milliseconds from the start of the round
    pub timestamp_ms: f64,

    /// Spin counter within the session (0 before the first spin)
    #[serde(default)]
    pub spin_index: u64,

    /// Custom tags for filtering/routing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl StageEvent {
    pub fn new(stage: Stage, timestamp_ms: f64) -> Self {
        Self {
            stage,
            timestamp_ms,
            spin_index: 0,
            tags: Vec::new(),
        }
    }

    /// Attach the spin counter
    pub fn with_spin(mut self, spin_index: u64) -> Self {
        self.spin_index = spin_index;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}
