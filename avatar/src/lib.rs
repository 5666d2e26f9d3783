//! Engine-agnostic avatar locomotion and animation selection.
//!
//! A [`Controller`] owns an [`AnimationStateMachine`] and an [`Integrator`].
//! Each tick it reads an [`InputSnapshot`], lets the state machine pick and
//! cross-fade clips on a [`ClipProvider`], integrates velocity into a
//! [`Pose`], and routes clip-finished notifications back to the machine.

pub mod clip;
pub mod config;
pub mod controller;
pub mod fsm;
pub mod input;
pub mod mixer;
pub mod motion;
pub mod replay;
pub mod state;

pub use clip::{ClipAction, LoopMode, REPEAT_FOREVER};
pub use config::{BlendTuning, ConfigError, ControllerConfig, MotionTuning};
pub use controller::Controller;
pub use fsm::{ActiveState, AnimationStateMachine, StateError};
pub use input::InputSnapshot;
pub use mixer::{ClipFinished, ClipProvider, FinishedSubscription, Mixer, SubscriptionId};
pub use motion::{Integrator, MotionState, Pose};
pub use replay::{ClipDurations, ReplayFrame, ReplayScript, ReplayStep};
pub use state::{ClipSet, StateKind, UnknownStateName};

/// Returns the avatar crate version string.
pub fn avatar_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_pkg() {
        assert_eq!(avatar_version(), env!("CARGO_PKG_VERSION"));
    }
}
