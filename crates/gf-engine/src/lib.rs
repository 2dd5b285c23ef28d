//! # gf-engine — Gemfall grid evaluation and cascade engine
//!
//! Pure game logic for a gem slot machine: grids of randomly drawn
//! symbols are scored against a pay table and, in the cascade variant,
//! cleared, collapsed and refilled until an evaluation produces nothing.
//!
//! ## Architecture
//!
//! ```text
//! GemEngine
//!     │
//!     ├── GameConfig (grid spec, rules, timing)
//!     ├── PayTable (symbol set, wild/scatter ids)
//!     └── StdRng (seedable)
//!           │
//!           ├── generate_grid → Grid
//!           ├── evaluate / evaluate_classic → Evaluation / TallyEvaluation
//!           └── CascadeResolver → CascadeStep*
//!
//! ClassicSession / CascadeSession
//!     owns GemEngine, drives spins, emits gf_stage::StageEvent
//! ```

pub mod cascade;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod session;
pub mod symbols;
pub mod timing;

pub use cascade::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use session::*;
pub use symbols::*;
pub use timing::*;
