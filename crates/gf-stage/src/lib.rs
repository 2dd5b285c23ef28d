//! # gf-stage — Gemfall Stage System
//!
//! Defines the canonical moments of a Gemfall round. Presentation layers
//! (sound, animation) never look at grids or pay tables, they react to
//! STAGES.
//!
//! ## Flow
//!
//! ```text
//! SpinStart → EvaluateWins → (WinPresent | Lose)
//!                 │
//!                 └── CascadeStart → CascadeStep* → CascadeEnd
//! ```
//!
//! Stages are delivered fire-and-forget to a [`StageSink`]. The engine
//! never waits on a sink and never reads anything back from it.

pub mod event;
pub mod sink;
pub mod stage;
pub mod trace;

pub use event::*;
pub use sink::*;
pub use stage::*;
pub use trace::*;
