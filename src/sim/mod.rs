//! Race simulation module
//!
//! All race logic lives here. This module must stay pure and deterministic:
//! - State advances only through `step` and `tick_countdown`
//! - Input arrives as a snapshot, never read from devices
//! - Gates resolve in table order
//! - No rendering or platform dependencies

pub mod race;
pub mod scoring;
pub mod state;
pub mod tick;

pub use race::Race;
pub use scoring::{ScoreDelta, resolve_gate};
pub use state::{
    CLEAN_TAKEAWAY, Countdown, DecisionRecord, GateOutcome, GateResult, LastGate, NOISY_TAKEAWAY,
    RacePhase, RankTier, RunState, RunSummary, Stats,
};
pub use tick::{TickInput, sanitize_dt, step, tick_countdown};
