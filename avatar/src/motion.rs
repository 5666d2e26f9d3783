//! Kinematic integration of the avatar's velocity, position and heading.

use crate::config::MotionTuning;
use crate::input::InputSnapshot;
use crate::state::StateKind;
use glam::{Quat, Vec3};

/// Coasting forward speeds below this after decay are treated as standstill.
pub const REST_SPEED: f32 = 1e-3;

/// World-space output handed to the renderer each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

/// Kinematic state owned by the [`Integrator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    /// x = strafe, y = vertical (never driven), z = forward.
    pub velocity: Vec3,
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl MotionState {
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            orientation: self.orientation,
        }
    }

    /// Heading about +Y in radians, zero when facing +Z.
    pub fn yaw(&self) -> f32 {
        let forward = self.orientation * Vec3::Z;
        forward.x.atan2(forward.z)
    }
}

/// Velocity-integrating locomotion model.
#[derive(Clone, Debug)]
pub struct Integrator {
    tuning: MotionTuning,
    state: MotionState,
}

impl Integrator {
    pub fn new(tuning: MotionTuning) -> Self {
        Self {
            tuning,
            state: MotionState::default(),
        }
    }

    /// Starts from an explicit kinematic state instead of rest at the origin.
    pub fn with_state(tuning: MotionTuning, state: MotionState) -> Self {
        Self { tuning, state }
    }

    pub fn set_tuning(&mut self, tuning: MotionTuning) {
        self.tuning = tuning;
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn pose(&self) -> Pose {
        self.state.pose()
    }

    /// Acceleration profile for this tick: sprint-scaled, zeroed while dancing.
    pub fn acceleration_for(&self, input: &InputSnapshot, active: Option<StateKind>) -> Vec3 {
        let mut acc = self.tuning.acceleration;
        if input.shift {
            acc *= self.tuning.sprint_multiplier;
        }
        if active == Some(StateKind::Dance) {
            acc = Vec3::ZERO;
        }
        acc
    }

    /// Advances the kinematic state by `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32, input: &InputSnapshot, active: Option<StateKind>) {
        let velocity = self.state.velocity;
        let mut frame_decel = velocity * self.tuning.deceleration * elapsed;
        frame_decel.z = frame_decel.z.signum() * frame_decel.z.abs().min(velocity.z.abs());
        self.state.velocity += frame_decel;
        let driven = input.forward || input.backward;
        if !driven && self.state.velocity.z.abs() < REST_SPEED {
            self.state.velocity.z = 0.0;
        }

        let dancing = active == Some(StateKind::Dance);
        if dancing {
            // Residual momentum would slide the avatar mid-emote.
            self.state.velocity = Vec3::ZERO;
        }

        let acc = self.acceleration_for(input, active);

        if input.forward {
            self.state.velocity.z += acc.z * elapsed;
        }
        if input.backward {
            self.state.velocity.z -= acc.z * elapsed;
        }

        let turn = self.tuning.turn_speed_factor * elapsed * acc.y;
        if input.left {
            self.state.orientation *= Quat::from_rotation_y(turn);
        }
        if input.right {
            self.state.orientation *= Quat::from_rotation_y(-turn);
        }
        self.state.orientation = self.state.orientation.normalize();

        let forward = (self.state.orientation * Vec3::Z).normalize();
        let sideways = (self.state.orientation * Vec3::X).normalize();
        let velocity = self.state.velocity;
        self.state.position += forward * (velocity.z * elapsed) + sideways * (velocity.x * elapsed);

        log::trace!(
            "integrate dt={elapsed:.4} v={velocity} pos={} yaw={:.3}",
            self.state.position,
            self.state.yaw()
        );
    }
}
