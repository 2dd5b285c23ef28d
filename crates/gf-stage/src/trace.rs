//! StageTrace — The sequence of stage events recorded for a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::{Stage, StageCategory};

/// A recorded timeline of stage events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Game identifier (e.g., "gemfall_classic")
    pub game_id: String,

    /// All events in the order they were emitted
    pub events: Vec<StageEvent>,

    /// When recording started
    pub recorded_at: DateTime<Utc>,
}

impl StageTrace {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            events: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get events by category
    pub fn events_by_category(&self, category: StageCategory) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.category() == category)
            .collect()
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.stage.type_name() == type_name)
    }

    /// Sum of every presented win
    pub fn total_win(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e.stage {
                Stage::WinPresent { win_amount, .. } => win_amount,
                _ => 0,
            })
            .sum()
    }

    /// Total free spins granted over the trace
    pub fn free_spins_awarded(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e.stage {
                Stage::FreeSpinsAwarded { count, .. } => count,
                _ => 0,
            })
            .sum()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
