//! Per-frame simulation step and countdown tick
//!
//! `step` runs at whatever rate the frame driver calls it; `tick_countdown`
//! runs on its own coarse timer. The two never share a clock.

use crate::consts::*;
use crate::gates::GateTable;
use crate::settings::ScoringModel;
use crate::{approach, desired_position};

use super::scoring::resolve_gate;
use super::state::{Countdown, RacePhase, RunState, RunSummary};

/// Directional intent for a single step (one snapshot per step)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    pub const NONE: TickInput = TickInput {
        left: false,
        right: false,
    };
    pub const LEFT: TickInput = TickInput {
        left: true,
        right: false,
    };
    pub const RIGHT: TickInput = TickInput {
        left: false,
        right: true,
    };

    /// -1 for left, +1 for right, 0 for neither or both
    pub fn direction(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }
}

/// Clamp a frame delta to something the integrator can use
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// Advance the countdown by one timer tick.
///
/// 3 -> 2 -> 1 -> Go -> Running. No-op outside Countdown.
pub fn tick_countdown(state: &mut RunState) {
    if state.phase != RacePhase::Countdown {
        log::debug!("Countdown tick ignored in {:?}", state.phase);
        return;
    }
    state.countdown = match state.countdown {
        Some(Countdown::Count(n)) if n > 1 => Some(Countdown::Count(n - 1)),
        Some(Countdown::Count(_)) => Some(Countdown::Go),
        Some(Countdown::Go) | None => {
            state.phase = RacePhase::Running;
            log::info!("Race running");
            None
        }
    };
}

/// Advance a running race by `dt` seconds
pub fn step(
    state: &mut RunState,
    gates: &GateTable,
    input: &TickInput,
    dt: f32,
    scoring: ScoringModel,
) {
    if state.phase != RacePhase::Running {
        return;
    }
    let dt = sanitize_dt(dt);
    state.elapsed += dt;

    steer(state, input.direction(), dt);
    advance(state, dt);

    // Table order is ascending distance, so gates crossed together resolve in order
    for (index, gate) in gates.gates().iter().enumerate() {
        let pending = state
            .gate_results
            .get(index)
            .is_some_and(|result| !result.passed);
        if pending && gate.distance <= state.travel {
            resolve_gate(state, gate, index, scoring);
        }
    }

    if state.all_gates_passed() {
        finish(state);
        return;
    }

    smooth_display(state, dt);
}

/// Integrate steering intent and ease the capsule toward it
fn steer(state: &mut RunState, direction: f32, dt: f32) {
    state.lateral_target = (state.lateral_target + direction * dt * STEER_RATE).clamp(-1.0, 1.0);
    state.lateral_position =
        approach(state.lateral_position, state.lateral_target, dt, LATERAL_EASE_RATE)
            .clamp(-1.0, 1.0);
}

/// Accrue travel from current speed, then apply the passive speed ramp
fn advance(state: &mut RunState, dt: f32) {
    state.travel += state.stats.speed * dt * TRAVEL_SCALE;
    state.stats.speed = (state.stats.speed + SPEED_RAMP * dt).clamp(RAMP_MIN_SPEED, RAMP_MAX_SPEED);
}

/// HUD values chase the authoritative stats; position drifts with combo
fn smooth_display(state: &mut RunState, dt: f32) {
    let stats = state.stats;
    let shown = &mut state.displayed;
    shown.speed = approach(shown.speed, stats.speed, dt, DISPLAY_SPEED_RATE);
    shown.quality = approach(shown.quality, stats.quality, dt, DISPLAY_QUALITY_RATE);
    shown.combo = approach(shown.combo, stats.combo, dt, DISPLAY_COMBO_RATE);

    let desired = desired_position(stats.combo, 0.0);
    state.position = approach(state.position, desired, dt, POSITION_RATE);
}

/// Running -> Finished, writing the summary in the same call
fn finish(state: &mut RunState) {
    let summary = RunSummary::compute(&state.stats, state.position);
    log::info!(
        "Race finished: {} (quality {:.1}, position {:.2})",
        summary.rank.label(),
        summary.final_quality,
        summary.final_position
    );
    state.summary = Some(summary);
    state.phase = RacePhase::Finished;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{Effect, Gate, GateChoice};
    use crate::sim::state::{GateOutcome, Stats};

    fn running(gates: &GateTable) -> RunState {
        let mut state = RunState::new(gates.len());
        state.phase = RacePhase::Running;
        state
    }

    fn single_gate(distance: f32) -> GateTable {
        GateTable::new(vec![Gate {
            id: "solo".into(),
            distance,
            left: GateChoice::new("Left", "good", true, Effect::new(0.0, 1.0, 0.5, -1.0)),
            right: GateChoice::new("Right", "bad", false, Effect::new(5.0, -5.0, -0.5, 1.0)),
        }])
        .unwrap()
    }

    #[test]
    fn test_input_direction() {
        assert_eq!(TickInput::NONE.direction(), 0.0);
        assert_eq!(TickInput::LEFT.direction(), -1.0);
        assert_eq!(TickInput::RIGHT.direction(), 1.0);
        let both = TickInput {
            left: true,
            right: true,
        };
        assert_eq!(both.direction(), 0.0);
    }

    #[test]
    fn test_countdown_sequence() {
        let mut state = RunState::new(1);
        state.phase = RacePhase::Countdown;
        state.countdown = Some(Countdown::Count(COUNTDOWN_START));

        tick_countdown(&mut state);
        assert_eq!(state.countdown, Some(Countdown::Count(2)));
        tick_countdown(&mut state);
        assert_eq!(state.countdown, Some(Countdown::Count(1)));
        tick_countdown(&mut state);
        assert_eq!(state.countdown, Some(Countdown::Go));
        assert_eq!(state.phase, RacePhase::Countdown);
        tick_countdown(&mut state);
        assert_eq!(state.countdown, None);
        assert_eq!(state.phase, RacePhase::Running);

        // Further ticks are ignored
        tick_countdown(&mut state);
        assert_eq!(state.phase, RacePhase::Running);
    }

    #[test]
    fn test_step_ignored_outside_running() {
        let gates = single_gate(100.0);
        let mut state = RunState::new(gates.len());
        let before = state.clone();
        step(&mut state, &gates, &TickInput::LEFT, 1.0, ScoringModel::Weighted);
        assert_eq!(state, before);
    }

    #[test]
    fn test_zero_and_bad_dt_do_nothing() {
        let gates = single_gate(100.0);
        let mut state = running(&gates);
        let before = state.clone();
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            step(&mut state, &gates, &TickInput::RIGHT, dt, ScoringModel::Weighted);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_steering_eases_without_overshoot() {
        let gates = single_gate(10_000.0);
        let mut state = running(&gates);
        for _ in 0..30 {
            step(&mut state, &gates, &TickInput::RIGHT, 1.0 / 60.0, ScoringModel::Weighted);
            assert!(state.lateral_position <= state.lateral_target);
            assert!(state.lateral_position >= 0.0);
        }
        // 0.5 s at 1.8 units/s
        assert!((state.lateral_target - 0.9).abs() < 1e-4);

        for _ in 0..120 {
            step(&mut state, &gates, &TickInput::RIGHT, 1.0 / 60.0, ScoringModel::Weighted);
        }
        assert_eq!(state.lateral_target, 1.0);
        assert!(state.lateral_position <= 1.0);

        // One big frame snaps exactly onto the target
        step(&mut state, &gates, &TickInput::LEFT, 0.5, ScoringModel::Weighted);
        assert!((state.lateral_target - 0.1).abs() < 1e-5);
        assert_eq!(state.lateral_position, state.lateral_target);
    }

    #[test]
    fn test_travel_and_speed_ramp() {
        let gates = single_gate(10_000.0);
        let mut state = running(&gates);
        step(&mut state, &gates, &TickInput::NONE, 0.5, ScoringModel::Weighted);
        assert!((state.travel - 180.0 * 0.5 * 0.6).abs() < 1e-4);
        assert!((state.stats.speed - 187.0).abs() < 1e-4);

        // Ramp tops out at its own ceiling
        for _ in 0..100 {
            step(&mut state, &gates, &TickInput::NONE, 0.1, ScoringModel::Weighted);
        }
        assert_eq!(state.stats.speed, RAMP_MAX_SPEED);
    }

    #[test]
    fn test_single_gate_success_finishes() {
        let gates = single_gate(100.0);
        let mut state = running(&gates);
        step(&mut state, &gates, &TickInput::LEFT, 1.0, ScoringModel::Weighted);

        assert!(state.travel >= 100.0);
        assert_eq!(state.gate_results[0].result, GateOutcome::Success);
        assert_eq!(state.phase, RacePhase::Finished);
        // Finishing frame skips HUD smoothing and position drift
        assert_eq!(state.displayed, Stats::default());
        let nudged = START_POSITION
            + (desired_position(state.stats.combo, -2.0) - START_POSITION) * GATE_POSITION_NUDGE;
        assert!((state.position - nudged).abs() < 1e-5);
        assert_ne!(state.position, desired_position(state.stats.combo, 0.0));
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.final_speed, state.stats.speed);
        assert_eq!(summary.final_position, state.position);
        assert_eq!(summary.rank, crate::sim::RankTier::from_position(state.position));

        // Finished state is frozen
        let frozen = state.clone();
        step(&mut state, &gates, &TickInput::RIGHT, 1.0, ScoringModel::Weighted);
        assert_eq!(state, frozen);
    }

    #[test]
    fn test_large_dt_resolves_gates_in_order() {
        let gates = GateTable::race_one();
        let mut state = running(&gates);
        step(&mut state, &gates, &TickInput::LEFT, 20.0, ScoringModel::Weighted);
        assert_eq!(state.phase, RacePhase::Finished);
        let ids: Vec<_> = state.decision_log.iter().map(|d| d.gate.as_str()).collect();
        assert_eq!(ids, ["trim", "normalize", "validate", "impute", "normalize-values"]);
    }

    #[test]
    fn test_displayed_stats_lag_authoritative() {
        let gates = GateTable::new(vec![
            Gate {
                id: "a".into(),
                distance: 50.0,
                left: GateChoice::new("L", "", true, Effect::default()),
                right: GateChoice::new("R", "", false, Effect::default()),
            },
            Gate {
                id: "b".into(),
                distance: 10_000.0,
                left: GateChoice::new("L", "", true, Effect::default()),
                right: GateChoice::new("R", "", false, Effect::default()),
            },
        ])
        .unwrap();
        let mut state = running(&gates);
        while !state.gate_results[0].passed {
            step(&mut state, &gates, &TickInput::LEFT, 1.0 / 60.0, ScoringModel::Weighted);
        }
        assert!(state.displayed.speed < state.stats.speed);
        assert!(state.displayed.combo < state.stats.combo);

        for _ in 0..600 {
            step(&mut state, &gates, &TickInput::NONE, 1.0 / 60.0, ScoringModel::Weighted);
        }
        assert!((state.displayed.combo - state.stats.combo).abs() < 1e-3);
        assert!((state.displayed.quality - state.stats.quality).abs() < 1e-3);
        let desired = desired_position(state.stats.combo, 0.0);
        assert!((state.position - desired).abs() < 1e-3);
    }
}
