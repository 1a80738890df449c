//! Run state and core simulation types
//!
//! Everything the presentation layer reads lives in `RunState`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::gates::Side;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Waiting for a start request; no physics runs
    Ready,
    /// Countdown timer ticking toward "Go"
    Countdown,
    /// Frame-stepped racing
    Running,
    /// Every gate resolved, summary available
    Finished,
}

/// Countdown display value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Countdown {
    Count(u8),
    /// Shown for exactly one countdown tick before the run begins
    Go,
}

/// How a gate played out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateOutcome {
    #[default]
    Unresolved,
    Success,
    Fail,
}

/// Per-gate resolution status, index-aligned with the gate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GateResult {
    pub passed: bool,
    pub result: GateOutcome,
}

/// Speed/quality/combo triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub speed: f32,
    pub quality: f32,
    pub combo: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            speed: START_SPEED,
            quality: START_QUALITY,
            combo: START_COMBO,
        }
    }
}

/// One resolved gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub gate: String,
    pub lane: Side,
    pub correct: bool,
    pub label: String,
    pub note: String,
    /// Authoritative stats right after the gate was applied
    pub stats: Stats,
}

/// Most recent resolution, for gate flash and tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastGate {
    pub index: usize,
    pub lane: Side,
    pub success: bool,
}

/// Final standing bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankTier {
    Podium,
    MidPack,
    NeedsWork,
}

impl RankTier {
    /// Tier for a final pack position
    pub fn from_position(position: f32) -> Self {
        if position <= 2.0 {
            RankTier::Podium
        } else if position <= 4.0 {
            RankTier::MidPack
        } else {
            RankTier::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankTier::Podium => "Podium",
            RankTier::MidPack => "Mid Pack",
            RankTier::NeedsWork => "Needs Work",
        }
    }
}

/// Takeaway when quality held up
pub const CLEAN_TAKEAWAY: &str =
    "Clean, validated data kept transforms stable. Quality wins the heat.";
/// Takeaway when quality slipped
pub const NOISY_TAKEAWAY: &str =
    "Fast but noisy choices slowed the pack; guard quality to climb.";
/// Final quality needed for the clean takeaway
pub const CLEAN_QUALITY_THRESHOLD: f32 = 95.0;

/// End-of-run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_speed: f32,
    pub final_quality: f32,
    pub final_combo: f32,
    pub final_position: f32,
    pub rank: RankTier,
    pub takeaway: String,
}

impl RunSummary {
    /// Summarize authoritative stats. Pure; same inputs give the same summary.
    pub fn compute(stats: &Stats, position: f32) -> Self {
        let takeaway = if stats.quality >= CLEAN_QUALITY_THRESHOLD {
            CLEAN_TAKEAWAY
        } else {
            NOISY_TAKEAWAY
        };
        Self {
            final_speed: stats.speed,
            final_quality: stats.quality,
            final_combo: stats.combo,
            final_position: position,
            rank: RankTier::from_position(position),
            takeaway: takeaway.to_string(),
        }
    }

    /// Whether the clean-data takeaway was earned
    pub fn is_clean(&self) -> bool {
        self.final_quality >= CLEAN_QUALITY_THRESHOLD
    }

    /// Pack place shown to the player (1-based)
    pub fn display_position(&self) -> u8 {
        self.final_position.round().max(BEST_POSITION) as u8
    }
}

/// Complete mutable state of one race run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RacePhase,
    /// Present only during Countdown
    pub countdown: Option<Countdown>,
    /// Cumulative distance covered
    pub travel: f32,
    /// Seconds spent Running
    pub elapsed: f32,
    /// Values used for gate math
    pub stats: Stats,
    /// Smoothed values for the HUD
    pub displayed: Stats,
    /// Continuous pack position estimate (1 = leading)
    pub position: f32,
    /// Where steering wants the capsule, in [-1, 1]
    pub lateral_target: f32,
    /// Eased capsule offset, in [-1, 1]
    pub lateral_position: f32,
    pub gate_results: Vec<GateResult>,
    pub decision_log: Vec<DecisionRecord>,
    pub last_gate: Option<LastGate>,
    /// Set only when Finished
    pub summary: Option<RunSummary>,
}

impl RunState {
    /// Fresh state for a table with `gate_count` gates
    pub fn new(gate_count: usize) -> Self {
        Self {
            phase: RacePhase::Ready,
            countdown: None,
            travel: 0.0,
            elapsed: 0.0,
            stats: Stats::default(),
            displayed: Stats::default(),
            position: START_POSITION,
            lateral_target: 0.0,
            lateral_position: 0.0,
            gate_results: vec![GateResult::default(); gate_count],
            decision_log: Vec::new(),
            last_gate: None,
            summary: None,
        }
    }

    /// Reinitialize every field, keeping the gate count
    pub fn reset(&mut self) {
        *self = Self::new(self.gate_results.len());
    }

    /// Index of the first unresolved gate
    pub fn next_gate_index(&self) -> Option<usize> {
        self.gate_results.iter().position(|g| !g.passed)
    }

    pub fn all_gates_passed(&self) -> bool {
        self.gate_results.iter().all(|g| g.passed)
    }

    pub fn gates_passed(&self) -> usize {
        self.gate_results.iter().filter(|g| g.passed).count()
    }

    /// Lane the capsule would take if a gate resolved right now.
    ///
    /// Exactly centered counts as right.
    pub fn current_lane(&self) -> Side {
        if self.lateral_target < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Pack place shown on the HUD (1-based)
    pub fn display_position(&self) -> u8 {
        self.position.round().max(BEST_POSITION) as u8
    }
}
