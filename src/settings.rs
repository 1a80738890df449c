//! Engine settings
//!
//! Loaded once at startup from JSON; every field is optional.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{COUNTDOWN_INTERVAL_MS, MAX_FRAME_DT};

/// How a resolved gate feeds back into the stats.
///
/// The two models are alternatives; one is picked per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringModel {
    /// Fixed success/failure deltas; a miss resets combo to 1
    Flat,
    /// Deltas combined with each choice's effect vector; a miss decays combo
    #[default]
    Weighted,
}

impl ScoringModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModel::Flat => "flat",
            ScoringModel::Weighted => "weighted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flat" => Some(ScoringModel::Flat),
            "weighted" | "effect" => Some(ScoringModel::Weighted),
            _ => None,
        }
    }

    /// Whether gate choices must carry an effect vector under this model
    pub fn requires_effects(&self) -> bool {
        matches!(self, ScoringModel::Weighted)
    }
}

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("countdown_interval_ms must be non-zero")]
    ZeroCountdownInterval,
    #[error("max_frame_dt {0} must be a positive finite number")]
    InvalidFrameCap(f32),
}

/// Race engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gate scoring model for every run in this deployment
    pub scoring: ScoringModel,
    /// Countdown timer cadence (independent of frame rate)
    pub countdown_interval_ms: u64,
    /// Frame deltas above this are capped by the frame clock
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scoring: ScoringModel::default(),
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Settings {
    /// Create settings for a scoring model with default pacing
    pub fn with_scoring(scoring: ScoringModel) -> Self {
        Self {
            scoring,
            ..Self::default()
        }
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.countdown_interval_ms == 0 {
            return Err(SettingsError::ZeroCountdownInterval);
        }
        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            return Err(SettingsError::InvalidFrameCap(self.max_frame_dt));
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings if a path is given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }
}
