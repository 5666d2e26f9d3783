//! Tuning values for the integrator and the animation blender.
//!
//! Every struct is `#[serde(default)]`, so a YAML file only needs to list the
//! values it overrides.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Kinematic constants.
///
/// Axis layout for both vectors: x = strafe, y = vertical, z = forward.
/// The y component of `acceleration` is the turn rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub acceleration: Vec3,
    /// Per-second decay factors; must be zero or negative.
    pub deceleration: Vec3,
    /// Applied to the whole acceleration profile while shift is held.
    pub sprint_multiplier: f32,
    /// Yaw radians per second per unit of turn rate.
    pub turn_speed_factor: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            acceleration: Vec3::new(0.03, 0.3, 5.0),
            deceleration: Vec3::new(-0.0005, -0.0001, -5.0),
            sprint_multiplier: 2.0,
            turn_speed_factor: 4.0 * PI,
        }
    }
}

/// Cross-fade durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendTuning {
    /// Between idle, walk and run.
    pub locomotion_fade: f32,
    /// Into the one-shot dance clip.
    pub dance_fade: f32,
}

impl Default for BlendTuning {
    fn default() -> Self {
        Self {
            locomotion_fade: 0.5,
            dance_fade: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub motion: MotionTuning,
    pub blend: BlendTuning,
    /// Upper bound on a single tick; longer host stalls are truncated.
    pub max_tick_seconds: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            motion: MotionTuning::default(),
            blend: BlendTuning::default(),
            max_tick_seconds: 0.25,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read controller config: {0}")]
    Read(std::io::Error),
    #[error("failed to write controller config: {0}")]
    Write(std::io::Error),
    #[error("failed to decode YAML controller config: {0}")]
    Deserialize(serde_yaml::Error),
    #[error("failed to encode YAML controller config: {0}")]
    Serialize(serde_yaml::Error),
    #[error("invalid controller config: {0}")]
    Invalid(String),
}

impl ControllerConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config =
            serde_yaml::from_str::<ControllerConfig>(raw).map_err(ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_yaml_str(&raw)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let encoded = self.to_yaml_string()?;
        fs::write(path, encoded).map_err(ConfigError::Write)
    }

    /// Rejects values the integrator or blender cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let motion = &self.motion;
        if !motion.acceleration.is_finite() || !motion.deceleration.is_finite() {
            return Err(ConfigError::Invalid(
                "acceleration and deceleration must be finite".into(),
            ));
        }
        if motion.deceleration.cmpgt(Vec3::ZERO).any() {
            return Err(ConfigError::Invalid(format!(
                "deceleration components must be <= 0, got {}",
                motion.deceleration
            )));
        }
        if !(motion.sprint_multiplier.is_finite() && motion.sprint_multiplier > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sprint_multiplier must be positive, got {}",
                motion.sprint_multiplier
            )));
        }
        if !motion.turn_speed_factor.is_finite() {
            return Err(ConfigError::Invalid("turn_speed_factor must be finite".into()));
        }
        for (name, fade) in [
            ("locomotion_fade", self.blend.locomotion_fade),
            ("dance_fade", self.blend.dance_fade),
        ] {
            if !(fade.is_finite() && fade > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {fade}"
                )));
            }
        }
        if !(self.max_tick_seconds.is_finite() && self.max_tick_seconds > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_tick_seconds must be positive, got {}",
                self.max_tick_seconds
            )));
        }
        Ok(())
    }
}
