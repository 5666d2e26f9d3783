//! Animation state machine selecting and blending the avatar's clips.
//!
//! Each state is a variant of [`ActiveState`]. Entering a state configures
//! its clip on the [`ClipProvider`] and cross-fades from the clip of the
//! state being left; exiting consumes the state value, which is how the
//! dance state's finished-listener is guaranteed to be released.

use crate::clip::{LoopMode, REPEAT_FOREVER};
use crate::config::BlendTuning;
use crate::input::InputSnapshot;
use crate::mixer::{ClipFinished, ClipProvider, FinishedSubscription};
use crate::state::StateKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no animation state is registered as '{0}'")]
    UnknownState(String),
    #[error("animation clips are not loaded yet")]
    NotReady,
}

/// Live state instance, created on enter and consumed on exit.
#[derive(Debug)]
pub enum ActiveState {
    Idle,
    Walk,
    Run,
    Dance { finished: FinishedSubscription },
}

impl ActiveState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Walk => StateKind::Walk,
            Self::Run => StateKind::Run,
            Self::Dance { .. } => StateKind::Dance,
        }
    }

    fn enter<C: ClipProvider>(
        kind: StateKind,
        previous: Option<StateKind>,
        blend: &BlendTuning,
        clips: &mut C,
    ) -> Self {
        match kind {
            StateKind::Idle => {
                enter_idle(previous, blend, clips);
                Self::Idle
            }
            StateKind::Walk | StateKind::Run => {
                enter_gait(kind, previous, blend, clips);
                if kind == StateKind::Walk {
                    Self::Walk
                } else {
                    Self::Run
                }
            }
            StateKind::Dance => {
                let finished = clips.subscribe_finished(StateKind::Dance);
                enter_dance(previous, blend, clips);
                Self::Dance { finished }
            }
        }
    }

    fn exit<C: ClipProvider>(self, clips: &mut C) {
        match self {
            Self::Idle | Self::Walk | Self::Run => {}
            Self::Dance { finished } => clips.unsubscribe_finished(finished),
        }
    }

    /// Input-driven transition rule of this state.
    fn next(&self, input: &InputSnapshot) -> Option<StateKind> {
        match self {
            Self::Idle if input.moving() => Some(StateKind::Walk),
            Self::Idle if input.space => Some(StateKind::Dance),
            Self::Idle => None,
            Self::Walk | Self::Run if !input.moving() => Some(StateKind::Idle),
            Self::Walk if input.shift => Some(StateKind::Run),
            Self::Run if !input.shift => Some(StateKind::Walk),
            Self::Walk | Self::Run => None,
            Self::Dance { .. } => None,
        }
    }
}

fn enter_idle<C: ClipProvider>(previous: Option<StateKind>, blend: &BlendTuning, clips: &mut C) {
    let idle = clips.clip_mut(StateKind::Idle);
    let Some(previous) = previous else {
        idle.play();
        return;
    };

    idle.set_time(0.0);
    idle.set_enabled(true);
    idle.set_loop(LoopMode::Repeat, REPEAT_FOREVER);
    idle.set_effective_time_scale(1.0);
    idle.set_effective_weight(1.0);
    clips.cross_fade(StateKind::Idle, previous, blend.locomotion_fade, true);
    clips.clip_mut(StateKind::Idle).play();
}

fn enter_gait<C: ClipProvider>(
    kind: StateKind,
    previous: Option<StateKind>,
    blend: &BlendTuning,
    clips: &mut C,
) {
    let Some(previous) = previous else {
        clips.clip_mut(kind).play();
        return;
    };

    // Carry the stride phase over between walk and run.
    let phase_time = if previous.is_gait() {
        let source = clips.clip(previous);
        let target_duration = clips.clip(kind).duration();
        let source_duration = source.duration();
        (source_duration > f32::EPSILON)
            .then(|| source.time() * (target_duration / source_duration))
    } else {
        None
    };

    let action = clips.clip_mut(kind);
    action.set_enabled(true);
    action.set_effective_time_scale(1.0);
    action.set_effective_weight(1.0);
    action.set_time(phase_time.unwrap_or(0.0));

    clips.cross_fade(kind, previous, blend.locomotion_fade, true);
    clips.clip_mut(kind).play();
}

fn enter_dance<C: ClipProvider>(previous: Option<StateKind>, blend: &BlendTuning, clips: &mut C) {
    // Configured even without a previous state so the clip always finishes.
    let dance = clips.clip_mut(StateKind::Dance);
    dance.reset();
    dance.set_loop(LoopMode::Once, 1);
    dance.set_clamp_when_finished(true);
    if let Some(previous) = previous {
        clips.cross_fade(StateKind::Dance, previous, blend.dance_fade, true);
    }
    clips.clip_mut(StateKind::Dance).play();
}

/// The avatar's animation state machine.
#[derive(Debug, Default)]
pub struct AnimationStateMachine {
    blend: BlendTuning,
    current: Option<ActiveState>,
}

impl AnimationStateMachine {
    pub fn new(blend: BlendTuning) -> Self {
        Self {
            blend,
            current: None,
        }
    }

    pub fn set_blend(&mut self, blend: BlendTuning) {
        self.blend = blend;
    }

    pub fn current(&self) -> Option<StateKind> {
        self.current.as_ref().map(ActiveState::kind)
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current().map(StateKind::name)
    }

    pub fn active(&self) -> Option<&ActiveState> {
        self.current.as_ref()
    }

    /// Switches to `kind`; a no-op if it is already active.
    pub fn set_state<C: ClipProvider>(&mut self, kind: StateKind, clips: &mut C) {
        if self.current() == Some(kind) {
            return;
        }

        let previous = self.current.take().map(|state| {
            let previous = state.kind();
            state.exit(clips);
            previous
        });

        log::debug!(
            "animation state {} -> {}",
            previous.map_or("none", StateKind::name),
            kind
        );
        self.current = Some(ActiveState::enter(kind, previous, &self.blend, clips));
    }

    /// Name-addressed variant of [`Self::set_state`].
    pub fn set_state_by_name<C: ClipProvider>(
        &mut self,
        name: &str,
        clips: &mut C,
    ) -> Result<(), StateError> {
        let kind = name.parse::<StateKind>().map_err(|err| {
            log::warn!("{err}");
            StateError::UnknownState(err.0)
        })?;
        self.set_state(kind, clips);
        Ok(())
    }

    /// Runs the active state's transition rule against this tick's input.
    pub fn update<C: ClipProvider>(
        &mut self,
        _elapsed: f32,
        input: &InputSnapshot,
        clips: &mut C,
    ) {
        let Some(next) = self.current.as_ref().and_then(|state| state.next(input)) else {
            return;
        };
        self.set_state(next, clips);
    }

    /// Routes a finished notification; only the active dance reacts to its own.
    pub fn handle_clip_finished<C: ClipProvider>(&mut self, event: &ClipFinished, clips: &mut C) {
        let owns_event = matches!(
            &self.current,
            Some(ActiveState::Dance { finished }) if finished.matches(event)
        );
        if !owns_event {
            log::trace!("ignoring finished event for {} ({:?})", event.clip, event.subscription);
            return;
        }
        self.set_state(StateKind::Idle, clips);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::Mixer;
    use crate::state::ClipSet;

    fn mixer() -> Mixer {
        Mixer::new(ClipSet::from_fn(|kind| match kind {
            StateKind::Idle => 2.0,
            StateKind::Walk => 1.2,
            StateKind::Run => 0.8,
            StateKind::Dance => 3.0,
        }))
    }

    #[test]
    fn update_before_initial_state_is_a_no_op() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.update(0.1, &InputSnapshot::IDLE.with_forward(true), &mut clips);
        assert_eq!(fsm.current(), None);
    }

    #[test]
    fn first_state_just_plays_its_clip() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.set_state(StateKind::Idle, &mut clips);
        assert_eq!(fsm.current_name(), Some("idle"));
        assert!(clips.clip(StateKind::Idle).is_running());
        assert!(!clips.clip(StateKind::Idle).is_fading());
    }

    #[test]
    fn idle_prefers_walking_over_dancing() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.set_state(StateKind::Idle, &mut clips);
        let input = InputSnapshot::IDLE.with_backward(true).with_space(true);
        fsm.update(0.1, &input, &mut clips);
        assert_eq!(fsm.current(), Some(StateKind::Walk));
    }

    #[test]
    fn dance_ignores_movement_input() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.set_state(StateKind::Idle, &mut clips);
        fsm.update(0.1, &InputSnapshot::IDLE.with_space(true), &mut clips);
        assert_eq!(fsm.current(), Some(StateKind::Dance));

        fsm.update(0.1, &InputSnapshot::IDLE.with_forward(true).with_shift(true), &mut clips);
        assert_eq!(fsm.current(), Some(StateKind::Dance));
    }

    #[test]
    fn dance_clip_is_configured_as_one_shot() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.set_state(StateKind::Idle, &mut clips);
        fsm.set_state(StateKind::Dance, &mut clips);

        let dance = clips.clip(StateKind::Dance);
        assert_eq!(dance.loop_mode(), LoopMode::Once);
        assert!(dance.clamp_when_finished());
        assert!(dance.is_running());
        assert!(dance.is_fading());
        assert_eq!(clips.listener_count(), 1);
    }

    #[test]
    fn unknown_name_leaves_state_untouched() {
        let mut clips = mixer();
        let mut fsm = AnimationStateMachine::default();
        fsm.set_state(StateKind::Walk, &mut clips);
        assert_eq!(
            fsm.set_state_by_name("crouch", &mut clips),
            Err(StateError::UnknownState("crouch".into()))
        );
        assert_eq!(fsm.current(), Some(StateKind::Walk));
        fsm.set_state_by_name("run", &mut clips).unwrap();
        assert_eq!(fsm.current(), Some(StateKind::Run));
    }
}
