//! Race controller
//!
//! Owns the gate table, run state and latest input snapshot. Callers drive it
//! with `step` from a frame loop and `tick_countdown` from a separate timer.

use crate::consts::{COUNTDOWN_START, LANE_COMMIT_POSITION};
use crate::gates::{Gate, GateTable, GateTableError, Side};
use crate::settings::ScoringModel;

use super::state::{Countdown, RacePhase, RunState};
use super::tick::{TickInput, step, tick_countdown};

/// A race over one gate table with one scoring model
#[derive(Debug, Clone)]
pub struct Race {
    gates: GateTable,
    scoring: ScoringModel,
    state: RunState,
    input: TickInput,
}

impl Race {
    /// Create a race in the Ready phase.
    ///
    /// Fails if the table lacks effect vectors the scoring model needs.
    pub fn new(gates: GateTable, scoring: ScoringModel) -> Result<Self, GateTableError> {
        if scoring.requires_effects() {
            gates.require_effects()?;
        }
        let state = RunState::new(gates.len());
        Ok(Self {
            gates,
            scoring,
            state,
            input: TickInput::default(),
        })
    }

    /// Ready -> Countdown, starting from a clean run
    pub fn start(&mut self) {
        if self.state.phase != RacePhase::Ready {
            log::debug!("Start ignored in {:?}", self.state.phase);
            return;
        }
        // Held keys carry into the run; only `reset` clears them
        self.state.reset();
        self.state.phase = RacePhase::Countdown;
        self.state.countdown = Some(Countdown::Count(COUNTDOWN_START));
        log::info!("Countdown started ({} gates, {} scoring)", self.gates.len(), self.scoring.as_str());
    }

    /// Back to Ready from any phase, discarding the run
    pub fn reset(&mut self) {
        self.state.reset();
        self.input = TickInput::default();
        log::info!("Race reset");
    }

    /// Replace the held directional intent
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Advance one frame of `dt` seconds (no-op unless Running)
    pub fn step(&mut self, dt: f32) {
        let input = self.input;
        step(&mut self.state, &self.gates, &input, dt, self.scoring);
    }

    /// Advance the countdown one unit (no-op unless in Countdown)
    pub fn tick_countdown(&mut self) {
        tick_countdown(&mut self.state);
    }

    /// Snap toward a lane, as the on-screen lane buttons do.
    ///
    /// Only while Running with a gate still ahead.
    pub fn commit_lane(&mut self, lane: Side) {
        if self.state.phase != RacePhase::Running || self.active_gate().is_none() {
            return;
        }
        let sign = match lane {
            Side::Left => -1.0,
            Side::Right => 1.0,
        };
        self.state.lateral_target = sign;
        self.state.lateral_position = sign * LANE_COMMIT_POSITION;
    }

    /// Read-only view of the run
    pub fn snapshot(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> RacePhase {
        self.state.phase
    }

    pub fn input(&self) -> TickInput {
        self.input
    }

    pub fn gates(&self) -> &GateTable {
        &self.gates
    }

    pub fn scoring(&self) -> ScoringModel {
        self.scoring
    }

    /// Next gate the capsule will reach
    pub fn active_gate(&self) -> Option<&Gate> {
        self.state
            .next_gate_index()
            .and_then(|index| self.gates.get(index))
    }
}
