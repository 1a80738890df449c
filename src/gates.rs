//! Gate table
//!
//! Gates are the decision points of a race. The table is validated once when
//! it is loaded and never mutated afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stat nudges declared by a gate choice
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Effect {
    /// Positive = faster
    pub speed: f32,
    /// Positive = cleaner data
    pub quality: f32,
    /// Combo multiplier adjustment
    pub combo: f32,
    /// Pack position nudge (lower = better)
    pub position: f32,
}

impl Effect {
    pub const fn new(speed: f32, quality: f32, combo: f32, position: f32) -> Self {
        Self {
            speed,
            quality,
            combo,
            position,
        }
    }

    /// Short human readable recap, e.g. "+Speed · Quality risk · Combo climbs"
    pub fn describe(&self) -> String {
        let speed = if self.speed >= 0.0 { "+Speed" } else { "Speed drop" };
        let quality = if self.quality >= 0.0 {
            "+Quality"
        } else {
            "Quality risk"
        };
        let combo = if self.combo >= 0.0 {
            "Combo climbs"
        } else {
            "Combo breaks"
        };
        format!("{speed} · {quality} · {combo}")
    }

    fn is_finite(&self) -> bool {
        self.speed.is_finite()
            && self.quality.is_finite()
            && self.combo.is_finite()
            && self.position.is_finite()
    }
}

/// One side of a gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateChoice {
    pub label: String,
    pub note: String,
    pub correct: bool,
    /// Optional under the flat scoring model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl GateChoice {
    pub fn new(label: &str, note: &str, correct: bool, effect: Effect) -> Self {
        Self {
            label: label.to_string(),
            note: note.to_string(),
            correct,
            effect: Some(effect),
        }
    }

    /// Declared effect, or a neutral one when absent
    pub fn effect_or_neutral(&self) -> Effect {
        self.effect.unwrap_or_default()
    }
}

/// A distance-triggered decision point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    /// Cumulative travel at which the gate is evaluated
    pub distance: f32,
    pub left: GateChoice,
    pub right: GateChoice,
}

/// Which side of the gate a choice sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl Gate {
    pub fn choice(&self, side: Side) -> &GateChoice {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The side flagged correct, if exactly one is
    pub fn correct_side(&self) -> Option<Side> {
        match (self.left.correct, self.right.correct) {
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            _ => None,
        }
    }
}

/// Errors raised when validating a gate table
#[derive(Debug, Error)]
pub enum GateTableError {
    #[error("gate table must contain at least one gate")]
    Empty,
    #[error("gate {index} has an empty id")]
    BlankId { index: usize },
    #[error("gate id {id:?} appears more than once")]
    DuplicateId { id: String },
    #[error("gate {id:?} distance {distance} must be a finite, non-negative number")]
    InvalidDistance { id: String, distance: f32 },
    #[error("gate {id:?} distance {distance} does not exceed previous gate distance {previous}")]
    NonAscending {
        id: String,
        previous: f32,
        distance: f32,
    },
    #[error("gate {id:?} {side} choice has a non-finite effect")]
    InvalidEffect { id: String, side: &'static str },
    #[error("gate {id:?} {side} choice needs an effect vector for weighted scoring")]
    MissingEffect { id: String, side: &'static str },
    #[error("failed to read gate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid gate table json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validated, immutable sequence of gates ordered by ascending distance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GateTable {
    gates: Vec<Gate>,
}

impl GateTable {
    /// Construct and validate a table
    pub fn new(gates: Vec<Gate>) -> Result<Self, GateTableError> {
        let table = Self { gates };
        table.validate()?;
        Ok(table)
    }

    /// Ensure ids are unique and distances strictly ascend
    pub fn validate(&self) -> Result<(), GateTableError> {
        if self.gates.is_empty() {
            return Err(GateTableError::Empty);
        }
        let mut seen = HashSet::new();
        let mut previous: Option<f32> = None;
        for (index, gate) in self.gates.iter().enumerate() {
            if gate.id.trim().is_empty() {
                return Err(GateTableError::BlankId { index });
            }
            if !seen.insert(gate.id.as_str()) {
                return Err(GateTableError::DuplicateId {
                    id: gate.id.clone(),
                });
            }
            if !gate.distance.is_finite() || gate.distance < 0.0 {
                return Err(GateTableError::InvalidDistance {
                    id: gate.id.clone(),
                    distance: gate.distance,
                });
            }
            if let Some(previous) = previous
                && gate.distance <= previous
            {
                return Err(GateTableError::NonAscending {
                    id: gate.id.clone(),
                    previous,
                    distance: gate.distance,
                });
            }
            previous = Some(gate.distance);

            for side in [Side::Left, Side::Right] {
                if let Some(effect) = gate.choice(side).effect
                    && !effect.is_finite()
                {
                    return Err(GateTableError::InvalidEffect {
                        id: gate.id.clone(),
                        side: side.as_str(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check that every choice carries an effect vector
    pub fn require_effects(&self) -> Result<(), GateTableError> {
        for gate in &self.gates {
            for side in [Side::Left, Side::Right] {
                if gate.choice(side).effect.is_none() {
                    return Err(GateTableError::MissingEffect {
                        id: gate.id.clone(),
                        side: side.as_str(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a table from JSON
    pub fn from_json(json: &str) -> Result<Self, GateTableError> {
        let gates: Vec<Gate> = serde_json::from_str(json)?;
        Self::new(gates)
    }

    /// Load a table from a JSON file
    pub fn load(path: &Path) -> Result<Self, GateTableError> {
        let json = fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded {} gates from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn get(&self, index: usize) -> Option<&Gate> {
        self.gates.get(index)
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Distance of the final gate (the finish line)
    pub fn finish_distance(&self) -> f32 {
        self.gates.last().map(|g| g.distance).unwrap_or(0.0)
    }

    /// Race #1: five data-cleaning decisions
    pub fn race_one() -> Self {
        Self {
            gates: vec![
                Gate {
                    id: "trim".into(),
                    distance: 260.0,
                    left: GateChoice::new(
                        "Trim Spaces",
                        "Trim safely cleans strings before joins. Reliable, but not flashy.",
                        true,
                        Effect::new(-4.0, 3.0, 0.4, -1.0),
                    ),
                    right: GateChoice::new(
                        "Remove Rows",
                        "Dropping rows is risky: fewer nulls but also fewer signals.",
                        false,
                        Effect::new(6.0, -5.0, -0.4, 1.0),
                    ),
                },
                Gate {
                    id: "normalize".into(),
                    distance: 620.0,
                    left: GateChoice::new(
                        "Normalize Case",
                        "Consistent casing keeps joins and grouping stable.",
                        true,
                        Effect::new(-2.0, 2.0, 0.6, -1.0),
                    ),
                    right: GateChoice::new(
                        "Duplicate Columns",
                        "Duplicate columns bloat payload and confuse transforms.",
                        false,
                        Effect::new(5.0, -4.0, -0.6, 2.0),
                    ),
                },
                Gate {
                    id: "validate".into(),
                    distance: 980.0,
                    left: GateChoice::new(
                        "Loose Match",
                        "Loose matching lets dirty records pass: fast but fragile.",
                        false,
                        Effect::new(8.0, -6.0, -1.0, 2.0),
                    ),
                    right: GateChoice::new(
                        "Validate Schema",
                        "Schema validated, so downstream transforms stay predictable.",
                        true,
                        Effect::new(-3.0, 4.0, 1.0, -2.0),
                    ),
                },
                Gate {
                    id: "impute".into(),
                    distance: 1360.0,
                    left: GateChoice::new(
                        "Impute Nulls",
                        "Imputation stabilizes models and keeps sample size.",
                        true,
                        Effect::new(-1.0, 3.0, 0.8, -1.0),
                    ),
                    right: GateChoice::new(
                        "Drop Nulls",
                        "Dropping is faster but risks bias and data loss.",
                        false,
                        Effect::new(7.0, -5.0, -0.5, 2.0),
                    ),
                },
                Gate {
                    id: "normalize-values".into(),
                    distance: 1760.0,
                    left: GateChoice::new(
                        "Scale Features",
                        "Normalized values reduce outlier shock; steady but slower.",
                        true,
                        Effect::new(-2.0, 3.0, 1.2, -2.0),
                    ),
                    right: GateChoice::new(
                        "Keep Raw",
                        "Raw values surge ahead now, but drift later.",
                        false,
                        Effect::new(9.0, -6.0, -1.0, 3.0),
                    ),
                },
            ],
        }
    }
}

impl<'de> Deserialize<'de> for GateTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let gates = Vec::<Gate>::deserialize(deserializer)?;
        GateTable::new(gates).map_err(serde::de::Error::custom)
    }
}
