//! Simulation settings and tuning
//!
//! Loaded from a JSON file at startup; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How `GameObjectRegistry::release` treats its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReleasePolicy {
    /// Remove from the real pending list / live bucket
    #[default]
    InPlace,
    /// Reproduce the old copy-removal defect: pending objects are not
    /// removed, live objects are only marked dead. Kept for regression
    /// comparison until the intended semantics are confirmed.
    LegacyCopy,
}

impl ReleasePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleasePolicy::InPlace => "InPlace",
            ReleasePolicy::LegacyCopy => "LegacyCopy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inplace" | "in_place" => Some(ReleasePolicy::InPlace),
            "legacycopy" | "legacy_copy" | "legacy" => Some(ReleasePolicy::LegacyCopy),
            _ => None,
        }
    }
}

/// Movement controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Velocity multiplier per idle tick
    pub damping: f32,
    /// Acceleration along the input direction (units/s)
    pub acceleration_rate: f32,
    /// Heading sweep per tick while rotating
    pub rotate_step_degrees: f32,
    /// Cosine below which two headings count as different
    pub near_angle_cos: f32,
    /// Squared length below which combined input is ignored
    pub input_threshold_sq: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            damping: VELOCITY_DAMPING,
            acceleration_rate: ACCELERATION_RATE,
            rotate_step_degrees: ROTATE_STEP_DEGREES,
            near_angle_cos: NEAR_ANGLE_COS,
            input_threshold_sq: INPUT_THRESHOLD_SQ,
        }
    }
}

impl MovementTuning {
    /// Angular tolerance check using this tuning's threshold
    #[inline]
    pub fn near(&self, a: glam::Vec3, b: glam::Vec3) -> bool {
        a.dot(b) >= self.near_angle_cos
    }
}

/// Outer loop pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Minimum tick rate the loop spin-waits down to
    pub target_hz: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            target_hz: TICK_RATE_HZ,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    pub movement: MovementTuning,
    /// Registry release behaviour
    pub release_policy: ReleasePolicy,
    /// Seed for enemy wandering
    pub seed: u64,

    // === Loop ===
    pub frame: FrameSettings,

    // === Debug ===
    /// Draw collider wireframes after each model
    pub debug_draw_colliders: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            movement: MovementTuning::default(),
            release_policy: ReleasePolicy::InPlace,
            seed: 12345,

            frame: FrameSettings::default(),

            debug_draw_colliders: true,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Minimum duration of one loop iteration
    pub fn min_frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.frame.target_hz.max(1)))
    }
}
