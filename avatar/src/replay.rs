//! Scripted input timelines for running the controller without a renderer.

use crate::config::{ConfigError, ControllerConfig};
use crate::controller::Controller;
use crate::input::InputSnapshot;
use crate::mixer::Mixer;
use crate::motion::Pose;
use crate::state::{ClipSet, StateKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Clip lengths used by the replay mixer, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipDurations {
    pub idle: f32,
    pub walk: f32,
    pub run: f32,
    pub dance: f32,
}

impl Default for ClipDurations {
    fn default() -> Self {
        Self {
            idle: 2.0,
            walk: 1.0,
            run: 0.7,
            dance: 3.5,
        }
    }
}

impl ClipDurations {
    pub fn to_clip_set(self) -> ClipSet<f32> {
        ClipSet::from_fn(|kind| match kind {
            StateKind::Idle => self.idle,
            StateKind::Walk => self.walk,
            StateKind::Run => self.run,
            StateKind::Dance => self.dance,
        })
    }
}

/// Input held for a number of consecutive ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub ticks: u32,
    #[serde(default)]
    pub input: InputSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
    #[serde(default)]
    pub clips: ClipDurations,
    #[serde(default)]
    pub config: ControllerConfig,
    pub steps: Vec<ReplayStep>,
}

fn default_tick_seconds() -> f32 {
    1.0 / 60.0
}

/// Snapshot taken at the end of each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayFrame {
    pub step: usize,
    pub tick: u64,
    pub state: Option<StateKind>,
    pub forward_speed: f32,
    pub pose: Pose,
}

impl ReplayScript {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let script = serde_yaml::from_str::<ReplayScript>(raw).map_err(ConfigError::Deserialize)?;
        script.config.validate()?;
        if !(script.tick_seconds.is_finite() && script.tick_seconds > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tick_seconds must be positive, got {}",
                script.tick_seconds
            )));
        }
        Ok(script)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_yaml_str(&raw)
    }

    /// Runs every step from a freshly loaded controller.
    pub fn run(&self) -> Vec<ReplayFrame> {
        let mut clips = Mixer::new(self.clips.to_clip_set());
        let mut controller = Controller::new(self.config);
        controller.on_clips_ready(&mut clips);

        let mut tick = 0u64;
        let mut frames = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            for _ in 0..step.ticks {
                controller.tick(self.tick_seconds, &step.input, &mut clips);
                tick += 1;
            }
            frames.push(ReplayFrame {
                step: index,
                tick,
                state: controller.active_state(),
                forward_speed: controller.motion().velocity.z,
                pose: controller.pose(),
            });
        }
        frames
    }
}
