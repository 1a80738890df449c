//! Scripted pilots
//!
//! Stand-ins for a human on the keyboard: each frame a pilot looks at the
//! upcoming gate and reports which direction key it is holding.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::gates::Side;
use crate::sim::{Race, TickInput};

/// Pilot strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PilotKind {
    /// Always steers for the correct side
    Ideal,
    /// Always steers for the incorrect side
    Wrong,
    /// Holds the left key the whole race
    Left,
    /// Holds the right key the whole race
    Right,
    /// Coin flip per gate from a seeded RNG
    Random,
}

impl PilotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PilotKind::Ideal => "ideal",
            PilotKind::Wrong => "wrong",
            PilotKind::Left => "left",
            PilotKind::Right => "right",
            PilotKind::Random => "random",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ideal" | "clean" => Some(PilotKind::Ideal),
            "wrong" | "noisy" => Some(PilotKind::Wrong),
            "left" => Some(PilotKind::Left),
            "right" => Some(PilotKind::Right),
            "random" => Some(PilotKind::Random),
            _ => None,
        }
    }
}

/// Input source that plays a race without a human
#[derive(Debug, Clone)]
pub struct Pilot {
    kind: PilotKind,
    rng: Pcg32,
    /// Lane picked for the gate at this index
    plan: Option<(usize, Side)>,
}

impl Pilot {
    pub fn new(kind: PilotKind, seed: u64) -> Self {
        Self {
            kind,
            rng: Pcg32::seed_from_u64(seed),
            plan: None,
        }
    }

    pub fn kind(&self) -> PilotKind {
        self.kind
    }

    /// Key state for the next frame
    pub fn input(&mut self, race: &Race) -> TickInput {
        let lane = match self.kind {
            PilotKind::Left => Some(Side::Left),
            PilotKind::Right => Some(Side::Right),
            _ => self.lane_for_active_gate(race),
        };
        match lane {
            Some(Side::Left) => TickInput::LEFT,
            Some(Side::Right) => TickInput::RIGHT,
            None => TickInput::NONE,
        }
    }

    fn lane_for_active_gate(&mut self, race: &Race) -> Option<Side> {
        let index = race.snapshot().next_gate_index()?;
        if let Some((planned, lane)) = self.plan
            && planned == index
        {
            return Some(lane);
        }
        let gate = race.gates().get(index)?;
        let lane = match self.kind {
            PilotKind::Ideal => gate.correct_side().unwrap_or(Side::Right),
            PilotKind::Wrong => match gate.correct_side() {
                Some(Side::Left) => Side::Right,
                Some(Side::Right) => Side::Left,
                None => {
                    if gate.left.correct {
                        Side::Right
                    } else {
                        Side::Left
                    }
                }
            },
            _ => {
                if self.rng.random_bool(0.5) {
                    Side::Left
                } else {
                    Side::Right
                }
            }
        };
        log::debug!("Pilot {} plans {} at gate {}", self.kind.as_str(), lane.as_str(), gate.id);
        self.plan = Some((index, lane));
        Some(lane)
    }
}
