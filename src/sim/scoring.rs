//! Gate resolution and scoring rules

use crate::consts::*;
use crate::desired_position;
use crate::gates::{Gate, GateChoice};
use crate::settings::ScoringModel;

use super::state::{DecisionRecord, GateOutcome, GateResult, LastGate, RunState, Stats};

/// Bonus/penalty applied on top of a choice's effect
const SPEED_SWING: f32 = 30.0;
const QUALITY_BONUS: f32 = 2.0;
const QUALITY_PENALTY: f32 = 3.0;
/// Share of a failed choice's combo effect that still applies after decay
const FAILED_COMBO_EFFECT: f32 = 0.2;

/// Stat changes produced by one gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDelta {
    pub speed: f32,
    pub quality: f32,
    pub combo: f32,
    /// Pack places, negative = gaining
    pub position: f32,
}

impl ScoringModel {
    /// Deltas for taking `choice` with the current `combo`
    pub fn delta(&self, choice: &GateChoice, combo: f32) -> ScoreDelta {
        let success = choice.correct;
        match self {
            ScoringModel::Flat => ScoreDelta {
                speed: if success { SPEED_SWING } else { -SPEED_SWING },
                quality: if success { QUALITY_BONUS } else { -QUALITY_PENALTY },
                // A miss drops combo straight back to the floor
                combo: if success { 1.0 } else { MIN_COMBO - combo },
                position: if success { -1.0 } else { 1.0 },
            },
            ScoringModel::Weighted => {
                let effect = choice.effect_or_neutral();
                ScoreDelta {
                    speed: effect.speed + if success { SPEED_SWING } else { -SPEED_SWING },
                    quality: effect.quality
                        + if success { QUALITY_BONUS } else { -QUALITY_PENALTY },
                    combo: if success {
                        1.0 + effect.combo
                    } else {
                        -(combo - MIN_COMBO) + effect.combo * FAILED_COMBO_EFFECT
                    },
                    position: effect.position + if success { -1.0 } else { 1.0 },
                }
            }
        }
    }

    /// Lowest quality reachable through gate writes
    pub fn quality_floor(&self) -> f32 {
        match self {
            ScoringModel::Flat => FLAT_MIN_QUALITY,
            ScoringModel::Weighted => MIN_QUALITY,
        }
    }

    /// Apply a delta, clamping every stat into its range
    pub fn apply(&self, stats: &mut Stats, delta: &ScoreDelta) {
        stats.speed = (stats.speed + delta.speed).clamp(MIN_SPEED, MAX_SPEED);
        stats.quality = (stats.quality + delta.quality).clamp(self.quality_floor(), MAX_QUALITY);
        stats.combo = (stats.combo + delta.combo).clamp(MIN_COMBO, MAX_COMBO);
    }
}

/// Resolve gate `index` using the capsule's current lateral target.
///
/// Does nothing if the gate was already passed.
pub fn resolve_gate(state: &mut RunState, gate: &Gate, index: usize, model: ScoringModel) {
    let Some(slot) = state.gate_results.get(index) else {
        return;
    };
    if slot.passed {
        return;
    }

    let lane = state.current_lane();
    let chosen = gate.choice(lane);
    let success = chosen.correct;

    let delta = model.delta(chosen, state.stats.combo);
    model.apply(&mut state.stats, &delta);

    // Pack shuffles right away instead of waiting for the per-frame drift
    let desired = desired_position(state.stats.combo, delta.position);
    state.position += (desired - state.position) * GATE_POSITION_NUDGE;

    state.gate_results[index] = GateResult {
        passed: true,
        result: if success {
            GateOutcome::Success
        } else {
            GateOutcome::Fail
        },
    };
    state.decision_log.push(DecisionRecord {
        gate: gate.id.clone(),
        lane,
        correct: success,
        label: chosen.label.clone(),
        note: chosen.note.clone(),
        stats: state.stats,
    });
    state.last_gate = Some(LastGate {
        index,
        lane,
        success,
    });

    log::debug!(
        "Gate {} resolved {} via {} (speed {:.1}, quality {:.1}, combo {:.2})",
        gate.id,
        if success { "clean" } else { "glitch" },
        lane.as_str(),
        state.stats.speed,
        state.stats.quality,
        state.stats.combo,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{Effect, GateTable, Side};

    fn choice(correct: bool, effect: Effect) -> GateChoice {
        GateChoice::new("choice", "note", correct, effect)
    }

    #[test]
    fn test_weighted_success_adds_effect() {
        let delta = ScoringModel::Weighted.delta(&choice(true, Effect::new(-4.0, 3.0, 0.4, -1.0)), 1.0);
        assert_eq!(delta.speed, 26.0);
        assert_eq!(delta.quality, 5.0);
        assert!((delta.combo - 1.4).abs() < 1e-6);
        assert_eq!(delta.position, -2.0);
    }

    #[test]
    fn test_weighted_failure_decays_combo() {
        let delta = ScoringModel::Weighted.delta(&choice(false, Effect::new(6.0, -5.0, -0.5, 1.0)), 4.0);
        assert_eq!(delta.speed, -24.0);
        assert_eq!(delta.quality, -8.0);
        assert!((delta.combo - (-3.0 - 0.1)).abs() < 1e-6);
        assert_eq!(delta.position, 2.0);

        let mut stats = Stats {
            speed: 200.0,
            quality: 90.0,
            combo: 4.0,
        };
        ScoringModel::Weighted.apply(&mut stats, &delta);
        assert_eq!(stats.combo, 1.0);
    }

    #[test]
    fn test_flat_model_ignores_effects() {
        let model = ScoringModel::Flat;
        let hit = model.delta(&choice(true, Effect::new(50.0, 50.0, 5.0, -5.0)), 2.0);
        assert_eq!((hit.speed, hit.quality, hit.combo, hit.position), (30.0, 2.0, 1.0, -1.0));

        let miss = model.delta(&choice(false, Effect::default()), 5.0);
        let mut stats = Stats {
            speed: 200.0,
            quality: 61.0,
            combo: 5.0,
        };
        model.apply(&mut stats, &miss);
        assert_eq!(stats.combo, 1.0);
        assert_eq!(stats.quality, FLAT_MIN_QUALITY);
        assert_eq!(stats.speed, 170.0);
    }

    #[test]
    fn test_apply_clamps_every_stat() {
        let mut stats = Stats {
            speed: 370.0,
            quality: 99.0,
            combo: 5.5,
        };
        let delta = ScoreDelta {
            speed: 100.0,
            quality: 10.0,
            combo: 3.0,
            position: 0.0,
        };
        ScoringModel::Weighted.apply(&mut stats, &delta);
        assert_eq!((stats.speed, stats.quality, stats.combo), (MAX_SPEED, MAX_QUALITY, MAX_COMBO));

        let drop = ScoreDelta {
            speed: -1000.0,
            quality: -1000.0,
            combo: -1000.0,
            position: 0.0,
        };
        ScoringModel::Weighted.apply(&mut stats, &drop);
        assert_eq!((stats.speed, stats.quality, stats.combo), (MIN_SPEED, MIN_QUALITY, MIN_COMBO));
    }

    #[test]
    fn test_resolve_records_decision_once() {
        let table = GateTable::race_one();
        let gate = &table.gates()[0];
        let mut state = RunState::new(table.len());
        state.lateral_target = -0.5;

        resolve_gate(&mut state, gate, 0, ScoringModel::Weighted);
        let after_first = state.clone();
        assert!(state.gate_results[0].passed);
        assert_eq!(state.gate_results[0].result, GateOutcome::Success);
        assert_eq!(state.decision_log.len(), 1);
        assert_eq!(state.decision_log[0].lane, Side::Left);
        assert_eq!(state.decision_log[0].label, "Trim Spaces");
        assert_eq!(state.stats.speed, 206.0);
        assert_eq!(state.stats.quality, 99.0);

        // Second call is a no-op
        state.lateral_target = 1.0;
        resolve_gate(&mut state, gate, 0, ScoringModel::Weighted);
        assert_eq!(state, after_first);
    }

    #[test]
    fn test_resolve_nudges_position() {
        let table = GateTable::race_one();
        let mut state = RunState::new(table.len());
        state.lateral_target = -1.0;
        resolve_gate(&mut state, &table.gates()[0], 0, ScoringModel::Weighted);
        let desired = desired_position(state.stats.combo, -2.0);
        assert!(desired <= 3.0);
        assert!((state.position - (6.0 + (desired - 6.0) * 0.8)).abs() < 1e-5);
        assert!(state.position < START_POSITION);
    }

    #[test]
    fn test_centered_target_takes_right_lane() {
        let table = GateTable::race_one();
        let mut state = RunState::new(table.len());
        resolve_gate(&mut state, &table.gates()[0], 0, ScoringModel::Weighted);
        assert_eq!(state.decision_log[0].lane, Side::Right);
        assert!(!state.decision_log[0].correct);
        assert_eq!(state.gate_results[0].result, GateOutcome::Fail);
    }
}
