//! Per-tick composition of the animation state machine and the integrator.

use crate::config::ControllerConfig;
use crate::fsm::{AnimationStateMachine, StateError};
use crate::input::InputSnapshot;
use crate::mixer::{ClipFinished, ClipProvider};
use crate::motion::{Integrator, MotionState, Pose};
use crate::state::StateKind;

/// Drives one avatar: animation selection plus kinematics.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    fsm: AnimationStateMachine,
    integrator: Integrator,
    ready: bool,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            fsm: AnimationStateMachine::new(config.blend),
            integrator: Integrator::new(config.motion),
            config,
            ready: false,
        }
    }

    /// Places the avatar before the first tick.
    pub fn with_motion(mut self, state: MotionState) -> Self {
        self.integrator = Integrator::with_state(self.config.motion, state);
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Applies new tuning without resetting kinematics or the active state.
    pub fn set_config(&mut self, config: ControllerConfig) {
        self.fsm.set_blend(config.blend);
        self.integrator.set_tuning(config.motion);
        self.config = config;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Called once every clip is available; enters idle.
    pub fn on_clips_ready<C: ClipProvider>(&mut self, clips: &mut C) {
        if self.ready {
            return;
        }
        self.ready = true;
        log::info!("animation clips ready, entering {}", StateKind::Idle);
        self.fsm.set_state(StateKind::Idle, clips);
    }

    pub fn active_state(&self) -> Option<StateKind> {
        self.fsm.current()
    }

    pub fn active_state_name(&self) -> Option<&'static str> {
        self.fsm.current_name()
    }

    pub fn state_machine(&self) -> &AnimationStateMachine {
        &self.fsm
    }

    pub fn motion(&self) -> &MotionState {
        self.integrator.state()
    }

    pub fn pose(&self) -> Pose {
        self.integrator.pose()
    }

    /// Forces a state through the name boundary.
    ///
    /// Refused with [`StateError::NotReady`] until the clips are ready.
    pub fn set_state_by_name<C: ClipProvider>(
        &mut self,
        name: &str,
        clips: &mut C,
    ) -> Result<(), StateError> {
        if !self.ready {
            log::warn!("ignoring state '{name}' before animation clips are ready");
            return Err(StateError::NotReady);
        }
        self.fsm.set_state_by_name(name, clips)
    }

    /// Runs one simulation step and returns the resulting pose.
    ///
    /// Before [`Self::on_clips_ready`] this only reports the current pose.
    pub fn tick<C: ClipProvider>(
        &mut self,
        elapsed: f32,
        input: &InputSnapshot,
        clips: &mut C,
    ) -> Pose {
        if !self.ready {
            return self.pose();
        }

        let elapsed = self.sanitize_elapsed(elapsed);

        self.fsm.update(elapsed, input, clips);
        self.integrator.update(elapsed, input, self.fsm.current());

        for event in clips.advance(elapsed) {
            self.fsm.handle_clip_finished(&event, clips);
        }

        self.pose()
    }

    /// Delivers a finished notification raised outside [`ClipProvider::advance`].
    pub fn notify_clip_finished<C: ClipProvider>(&mut self, event: &ClipFinished, clips: &mut C) {
        self.fsm.handle_clip_finished(event, clips);
    }

    fn sanitize_elapsed(&self, elapsed: f32) -> f32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed > self.config.max_tick_seconds {
            log::warn!(
                "tick of {elapsed:.3}s truncated to {:.3}s",
                self.config.max_tick_seconds
            );
            return self.config.max_tick_seconds;
        }
        elapsed
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
