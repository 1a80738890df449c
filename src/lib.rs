//! Hover League - Data Circuit race engine
//!
//! Core modules:
//! - `sim`: Race simulation (lifecycle, physics step, gate resolution, summary)
//! - `gates`: Gate table definitions and load-time validation
//! - `driver`: Frame clock and countdown timer that pace a race
//! - `pilot`: Scripted input sources for headless runs
//! - `settings`: Engine configuration

pub mod driver;
pub mod gates;
pub mod pilot;
pub mod settings;
pub mod sim;

pub use gates::{Effect, Gate, GateChoice, GateTable, GateTableError};
pub use settings::{ScoringModel, Settings, SettingsError};
pub use sim::{Race, RacePhase, RunState, TickInput};

/// Race tuning constants
pub mod consts {
    /// Countdown starts here and runs down to the "Go" marker
    pub const COUNTDOWN_START: u8 = 3;
    /// Wall-clock cadence of the countdown timer
    pub const COUNTDOWN_INTERVAL_MS: u64 = 900;
    /// Largest frame delta the frame clock hands to the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Starting stats
    pub const START_SPEED: f32 = 180.0;
    pub const START_QUALITY: f32 = 94.0;
    pub const START_COMBO: f32 = 1.0;
    pub const START_POSITION: f32 = 6.0;

    /// Lateral steering rate (units/sec) and easing rate
    pub const STEER_RATE: f32 = 1.8;
    pub const LATERAL_EASE_RATE: f32 = 8.0;
    /// Where a lane button snaps the capsule before easing takes over
    pub const LANE_COMMIT_POSITION: f32 = 0.85;

    /// Fraction of speed converted into travel per second
    pub const TRAVEL_SCALE: f32 = 0.6;
    /// Passive acceleration (speed units/sec) and its clamp window
    pub const SPEED_RAMP: f32 = 14.0;
    pub const RAMP_MIN_SPEED: f32 = 140.0;
    pub const RAMP_MAX_SPEED: f32 = 340.0;

    /// Stat clamp ranges applied on every gate write
    pub const MIN_SPEED: f32 = 120.0;
    pub const MAX_SPEED: f32 = 380.0;
    pub const MIN_QUALITY: f32 = 55.0;
    /// Quality floor under the flat scoring model
    pub const FLAT_MIN_QUALITY: f32 = 60.0;
    pub const MAX_QUALITY: f32 = 100.0;
    pub const MIN_COMBO: f32 = 1.0;
    pub const MAX_COMBO: f32 = 6.0;

    /// Pack position range (1 = leading)
    pub const BEST_POSITION: f32 = 1.0;
    pub const WORST_POSITION: f32 = 6.0;
    /// Combo points per pack place gained
    pub const COMBO_PER_PLACE: f32 = 1.6;
    /// Share of the gap closed by the pack shuffle right after a gate
    pub const GATE_POSITION_NUDGE: f32 = 0.8;

    /// HUD smoothing rates (per second)
    pub const DISPLAY_SPEED_RATE: f32 = 5.0;
    pub const DISPLAY_QUALITY_RATE: f32 = 4.0;
    pub const DISPLAY_COMBO_RATE: f32 = 6.0;
    pub const POSITION_RATE: f32 = 4.0;
}

/// Move `current` toward `target` by `min(1, dt * rate)` of the gap.
///
/// Critically damped: the factor never exceeds 1, so the result never
/// passes `target`.
#[inline]
pub fn approach(current: f32, target: f32, dt: f32, rate: f32) -> f32 {
    let factor = (dt * rate).min(1.0);
    if factor >= 1.0 {
        target
    } else {
        current + (target - current) * factor
    }
}

/// Desired integer pack position for a combo level, shifted by `offset` places
#[inline]
pub fn desired_position(combo: f32, offset: f32) -> f32 {
    use consts::{BEST_POSITION, COMBO_PER_PLACE, WORST_POSITION};
    (WORST_POSITION + offset - combo / COMBO_PER_PLACE)
        .round()
        .clamp(BEST_POSITION, WORST_POSITION)
}
