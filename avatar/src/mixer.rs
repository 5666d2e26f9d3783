//! Clip provider contract and the reference mixer implementing it.

use crate::clip::ClipAction;
use crate::state::{ClipSet, StateKind};

/// Identifier of a live finished-listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Move-only token for a "clip finished" listener.
///
/// It can only be released by handing it back to
/// [`ClipProvider::unsubscribe_finished`], which consumes it, so one
/// registration is released at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping the token leaks the listener registration"]
pub struct FinishedSubscription {
    id: SubscriptionId,
    clip: StateKind,
}

impl FinishedSubscription {
    /// Built by providers when registering a listener.
    pub fn new(id: SubscriptionId, clip: StateKind) -> Self {
        Self { id, clip }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn clip(&self) -> StateKind {
        self.clip
    }

    /// Whether `event` was raised for this registration.
    pub fn matches(&self, event: &ClipFinished) -> bool {
        self.id == event.subscription
    }
}

/// Notification that a non-repeating clip reached its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipFinished {
    pub clip: StateKind,
    pub subscription: SubscriptionId,
}

/// Source of playable clips, one per [`StateKind`].
pub trait ClipProvider {
    fn clip(&self, kind: StateKind) -> &ClipAction;

    fn clip_mut(&mut self, kind: StateKind) -> &mut ClipAction;

    /// Fades `source` out and `target` in over `seconds`. With `warp`, the
    /// two clips' time scales are ramped so their phases meet.
    fn cross_fade(&mut self, target: StateKind, source: StateKind, seconds: f32, warp: bool);

    fn subscribe_finished(&mut self, clip: StateKind) -> FinishedSubscription;

    fn unsubscribe_finished(&mut self, subscription: FinishedSubscription);

    /// Advances every scheduled clip and returns the finished events raised
    /// for live subscriptions.
    fn advance(&mut self, elapsed: f32) -> Vec<ClipFinished>;
}

/// In-process clip mixer: one [`ClipAction`] per state plus a shared clock.
#[derive(Clone, Debug)]
pub struct Mixer {
    actions: ClipSet<ClipAction>,
    listeners: Vec<(SubscriptionId, StateKind)>,
    next_subscription: u64,
    now: f64,
}

impl Mixer {
    /// Creates a mixer from per-state clip durations in seconds.
    pub fn new(durations: ClipSet<f32>) -> Self {
        Self {
            actions: ClipSet::from_fn(|kind| ClipAction::new(durations[kind])),
            listeners: Vec::new(),
            next_subscription: 1,
            now: 0.0,
        }
    }

    /// Mixer clock in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of finished listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ClipProvider for Mixer {
    fn clip(&self, kind: StateKind) -> &ClipAction {
        &self.actions[kind]
    }

    fn clip_mut(&mut self, kind: StateKind) -> &mut ClipAction {
        &mut self.actions[kind]
    }

    fn cross_fade(&mut self, target: StateKind, source: StateKind, seconds: f32, warp: bool) {
        let now = self.now;
        let Some((incoming, outgoing)) = self.actions.pair_mut(target, source) else {
            return;
        };

        outgoing.fade_out(now, seconds);
        incoming.fade_in(now, seconds);

        if warp {
            let incoming_duration = incoming.duration();
            let outgoing_duration = outgoing.duration();
            if incoming_duration > f32::EPSILON && outgoing_duration > f32::EPSILON {
                outgoing.warp(now, 1.0, outgoing_duration / incoming_duration, seconds);
                incoming.warp(now, incoming_duration / outgoing_duration, 1.0, seconds);
            }
        }
    }

    fn subscribe_finished(&mut self, clip: StateKind) -> FinishedSubscription {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, clip));
        FinishedSubscription::new(id, clip)
    }

    fn unsubscribe_finished(&mut self, subscription: FinishedSubscription) {
        self.listeners.retain(|(id, _)| *id != subscription.id());
    }

    fn advance(&mut self, elapsed: f32) -> Vec<ClipFinished> {
        self.now += f64::from(elapsed);
        let now = self.now;

        let mut events = Vec::new();
        for (kind, action) in self.actions.iter_mut() {
            if !action.advance(now, elapsed) {
                continue;
            }
            events.extend(
                self.listeners
                    .iter()
                    .filter(|(_, clip)| *clip == kind)
                    .map(|(subscription, _)| ClipFinished {
                        clip: kind,
                        subscription: *subscription,
                    }),
            );
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::LoopMode;

    fn mixer() -> Mixer {
        Mixer::new(ClipSet::from_fn(|kind| match kind {
            StateKind::Idle => 2.0,
            StateKind::Walk => 1.0,
            StateKind::Run => 0.8,
            StateKind::Dance => 1.5,
        }))
    }

    #[test]
    fn finished_is_raised_only_for_live_subscriptions() {
        let mut mixer = mixer();
        let dance = mixer.clip_mut(StateKind::Dance);
        dance.set_loop(LoopMode::Once, 1);
        dance.set_clamp_when_finished(true);
        dance.play();

        let subscription = mixer.subscribe_finished(StateKind::Dance);
        let id = subscription.id();
        assert!(mixer.advance(1.0).is_empty());

        let events = mixer.advance(1.0);
        assert_eq!(
            events,
            vec![ClipFinished {
                clip: StateKind::Dance,
                subscription: id,
            }]
        );

        mixer.unsubscribe_finished(subscription);
        assert_eq!(mixer.listener_count(), 0);
        mixer.clip_mut(StateKind::Dance).reset();
        assert!(mixer.advance(2.0).is_empty());
    }

    #[test]
    fn cross_fade_swaps_weights_and_warps_phase() {
        let mut mixer = mixer();
        mixer.clip_mut(StateKind::Walk).play();
        mixer.clip_mut(StateKind::Run).play();
        mixer.cross_fade(StateKind::Run, StateKind::Walk, 0.5, true);

        let run = mixer.clip(StateKind::Run);
        assert_eq!(run.effective_weight(), 0.0);
        assert!((run.effective_time_scale() - 0.8).abs() < 1e-6);

        mixer.advance(0.5);
        assert!(!mixer.clip(StateKind::Walk).enabled());
        assert_eq!(mixer.clip(StateKind::Run).effective_weight(), 1.0);
        assert_eq!(mixer.clip(StateKind::Run).effective_time_scale(), 1.0);
    }

    #[test]
    fn cross_fade_onto_itself_is_ignored() {
        let mut mixer = mixer();
        mixer.clip_mut(StateKind::Idle).play();
        mixer.cross_fade(StateKind::Idle, StateKind::Idle, 0.5, true);
        assert!(!mixer.clip(StateKind::Idle).is_fading());
    }
}
