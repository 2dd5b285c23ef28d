//! Presentation timing for stage events and paced play

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// No waiting at all (headless simulation, tests)
    Instant,
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub profile: TimingProfile,

    /// Symbols spinning before evaluation (ms)
    pub spin_animation_ms: f64,

    /// Delay between evaluation and win/lose presentation (ms)
    pub win_reveal_delay_ms: f64,

    /// Fall/refill animation between cascade evaluations (ms)
    pub cascade_step_ms: f64,

    /// Lockout after a classic spin resolves (ms)
    pub cooldown_ms: f64,
}

impl TimingConfig {
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_animation_ms: 1000.0,
            win_reveal_delay_ms: 50.0,
            cascade_step_ms: 600.0,
            cooldown_ms: 1500.0,
        }
    }

    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_animation_ms: 400.0,
            win_reveal_delay_ms: 25.0,
            cascade_step_ms: 250.0,
            cooldown_ms: 500.0,
        }
    }

    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            spin_animation_ms: 0.0,
            win_reveal_delay_ms: 0.0,
            cascade_step_ms: 0.0,
            cooldown_ms: 0.0,
        }
    }

    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
        }
    }

    pub fn spin_animation(&self) -> Duration {
        millis(self.spin_animation_ms)
    }

    pub fn cascade_step(&self) -> Duration {
        millis(self.cascade_step_ms)
    }

    pub fn cooldown(&self) -> Duration {
        millis(self.cooldown_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

fn millis(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

/// Timestamp generator for sequential events within one round
#[derive(Debug, Clone)]
pub struct TimestampGenerator {
    current_ms: f64,
    config: TimingConfig,
}

impl TimestampGenerator {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            current_ms: 0.0,
            config,
        }
    }

    /// Reset to zero at the start of a round
    pub fn reset(&mut self) {
        self.current_ms = 0.0;
    }

    pub fn current(&self) -> f64 {
        self.current_ms
    }

    /// Advance by duration and return new timestamp
    pub fn advance(&mut self, duration_ms: f64) -> f64 {
        self.current_ms += duration_ms.max(0.0);
        self.current_ms
    }

    /// Spin animation finished, evaluation starts
    pub fn spin_settle(&mut self) -> f64 {
        self.advance(self.config.spin_animation_ms)
    }

    pub fn win_reveal(&mut self) -> f64 {
        self.advance(self.config.win_reveal_delay_ms)
    }

    pub fn cascade_step(&mut self) -> f64 {
        self.advance(self.config.cascade_step_ms)
    }

    pub fn cooldown(&mut self) -> f64 {
        self.advance(self.config.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let instant = TimingConfig::instant();

        assert!(turbo.spin_animation_ms < normal.spin_animation_ms);
        assert!(turbo.cascade_step_ms < normal.cascade_step_ms);
        assert_eq!(instant.cooldown(), Duration::ZERO);
        assert_eq!(normal.spin_animation(), Duration::from_millis(1000));
        assert_eq!(normal.cooldown(), Duration::from_millis(1500));
    }

    #[test]
    fn test_timestamp_generator() {
        let mut ts_gen = TimestampGenerator::new(TimingConfig::normal());
        assert_eq!(ts_gen.current(), 0.0);

        let settled = ts_gen.spin_settle();
        assert_eq!(settled, 1000.0);

        let step = ts_gen.cascade_step();
        assert!(step > settled);

        ts_gen.reset();
        assert_eq!(ts_gen.current(), 0.0);
    }

    #[test]
    fn test_instant_never_advances() {
        let mut ts_gen = TimestampGenerator::new(TimingConfig::instant());
        ts_gen.spin_settle();
        ts_gen.cascade_step();
        ts_gen.cooldown();
        assert_eq!(ts_gen.current(), 0.0);
    }
}
