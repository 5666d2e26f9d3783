//! Playback state of a single animation clip inside the mixer.
//!
//! A [`ClipAction`] tracks playback time, loop policy and the weight and
//! time-scale ramps that implement cross-fades. It never touches skeletal
//! data; hosts sample their own clip at [`ClipAction::sample_time`] with
//! [`ClipAction::effective_weight`].

use serde::{Deserialize, Serialize};

/// Repetition count meaning "loop until told otherwise".
pub const REPEAT_FOREVER: u32 = u32::MAX;

/// How playback behaves when it reaches the end of the clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play to the end once, then stop (or hold the last frame).
    Once,
    /// Wrap to the start.
    #[default]
    Repeat,
    /// Alternate forward and backward passes.
    PingPong,
}

/// Linear interpolation of a scalar over a fixed window of mixer time.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ramp {
    start: f64,
    duration: f32,
    from: f32,
    to: f32,
}

impl Ramp {
    fn new(now: f64, duration: f32, from: f32, to: f32) -> Self {
        Self {
            start: now,
            duration: duration.max(0.0),
            from,
            to,
        }
    }

    /// Value at `now` and whether the ramp has run its course.
    fn sample(&self, now: f64) -> (f32, bool) {
        let elapsed = (now - self.start) as f32;
        if self.duration <= f32::EPSILON || elapsed >= self.duration {
            return (self.to, true);
        }
        let t = (elapsed / self.duration).clamp(0.0, 1.0);
        (self.from + (self.to - self.from) * t, false)
    }
}

/// Playback state for one clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipAction {
    duration: f32,
    time: f32,
    time_scale: f32,
    weight: f32,
    effective_time_scale: f32,
    effective_weight: f32,
    enabled: bool,
    running: bool,
    paused: bool,
    loop_mode: LoopMode,
    repetitions: u32,
    loop_count: u32,
    clamp_when_finished: bool,
    weight_ramp: Option<Ramp>,
    scale_ramp: Option<Ramp>,
}

impl ClipAction {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: if duration.is_finite() {
                duration.max(0.0)
            } else {
                0.0
            },
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            effective_time_scale: 1.0,
            effective_weight: 1.0,
            enabled: true,
            running: false,
            paused: false,
            loop_mode: LoopMode::Repeat,
            repetitions: REPEAT_FOREVER,
            loop_count: 0,
            clamp_when_finished: false,
            weight_ramp: None,
            scale_ramp: None,
        }
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Local playback time in `[0, duration]`.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = if time.is_finite() {
            time.clamp(0.0, self.duration)
        } else {
            0.0
        };
    }

    /// Time the host should sample the clip at; mirrors odd ping-pong passes.
    pub fn sample_time(&self) -> f32 {
        if self.loop_mode == LoopMode::PingPong && self.loop_count % 2 == 1 {
            self.duration - self.time
        } else {
            self.time
        }
    }

    /// Scheduled for playback by the mixer.
    pub fn play(&mut self) {
        self.running = true;
    }

    /// Rewinds to the start, clears pause, fades and warps, and re-enables.
    pub fn reset(&mut self) {
        self.paused = false;
        self.enabled = true;
        self.time = 0.0;
        self.loop_count = 0;
        self.stop_fading();
        self.stop_warping();
    }

    pub fn is_running(&self) -> bool {
        self.running && self.enabled && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.refresh_effective_weight();
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn set_loop(&mut self, mode: LoopMode, repetitions: u32) {
        self.loop_mode = mode;
        self.repetitions = repetitions.max(1);
    }

    pub fn clamp_when_finished(&self) -> bool {
        self.clamp_when_finished
    }

    pub fn set_clamp_when_finished(&mut self, clamp: bool) {
        self.clamp_when_finished = clamp;
    }

    /// Weight after fades; zero while disabled.
    pub fn effective_weight(&self) -> f32 {
        if self.enabled {
            self.effective_weight
        } else {
            0.0
        }
    }

    /// Sets the base weight and cancels any fade in progress.
    pub fn set_effective_weight(&mut self, weight: f32) {
        self.weight = weight;
        self.stop_fading();
    }

    /// Time scale after warps; zero while paused.
    pub fn effective_time_scale(&self) -> f32 {
        if self.paused {
            0.0
        } else {
            self.effective_time_scale
        }
    }

    /// Sets the base time scale and cancels any warp in progress.
    pub fn set_effective_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
        self.stop_warping();
    }

    pub fn is_fading(&self) -> bool {
        self.weight_ramp.is_some()
    }

    pub fn is_warping(&self) -> bool {
        self.scale_ramp.is_some()
    }

    pub fn stop_fading(&mut self) {
        self.weight_ramp = None;
        self.refresh_effective_weight();
    }

    pub fn stop_warping(&mut self) {
        self.scale_ramp = None;
        self.effective_time_scale = self.time_scale;
    }

    /// Ramps the weight from 0 to 1 over `duration` seconds of mixer time.
    pub fn fade_in(&mut self, now: f64, duration: f32) {
        self.schedule_fade(now, duration, 0.0, 1.0);
    }

    /// Ramps the weight from 1 to 0; the action disables itself at 0.
    pub fn fade_out(&mut self, now: f64, duration: f32) {
        self.schedule_fade(now, duration, 1.0, 0.0);
    }

    /// Ramps the effective time scale from `start` to `end`.
    pub fn warp(&mut self, now: f64, start: f32, end: f32, duration: f32) {
        self.scale_ramp = Some(Ramp::new(now, duration, start, end));
        self.effective_time_scale = start;
    }

    fn schedule_fade(&mut self, now: f64, duration: f32, from: f32, to: f32) {
        self.weight_ramp = Some(Ramp::new(now, duration, from, to));
        self.effective_weight = self.weight * from;
    }

    fn refresh_effective_weight(&mut self) {
        if self.weight_ramp.is_none() {
            self.effective_weight = self.weight;
        }
    }

    /// Advances playback by `delta` seconds at mixer time `now`.
    ///
    /// Returns `true` when a non-repeating pass reached its end during this
    /// step.
    pub(crate) fn advance(&mut self, now: f64, delta: f32) -> bool {
        if !self.running {
            return false;
        }
        if !self.enabled {
            self.update_weight(now);
            return false;
        }

        let scaled = delta * self.update_time_scale(now);
        let finished = if self.paused { false } else { self.update_time(scaled) };
        self.update_weight(now);
        finished
    }

    fn update_time_scale(&mut self, now: f64) -> f32 {
        if self.paused {
            return 0.0;
        }
        if let Some(ramp) = self.scale_ramp {
            let (value, done) = ramp.sample(now);
            self.effective_time_scale = value;
            if done {
                self.scale_ramp = None;
                if value == 0.0 {
                    self.paused = true;
                } else {
                    self.time_scale = value;
                }
            }
        } else {
            self.effective_time_scale = self.time_scale;
        }
        self.effective_time_scale
    }

    fn update_weight(&mut self, now: f64) {
        if !self.enabled {
            self.effective_weight = 0.0;
            return;
        }
        let Some(ramp) = self.weight_ramp else {
            self.effective_weight = self.weight;
            return;
        };
        let (value, done) = ramp.sample(now);
        self.effective_weight = self.weight * value;
        if done {
            self.weight_ramp = None;
            if value == 0.0 {
                self.enabled = false;
            }
        }
    }

    fn update_time(&mut self, delta: f32) -> bool {
        if delta == 0.0 {
            return false;
        }
        let mut time = self.time + delta;

        if self.duration <= f32::EPSILON {
            self.time = 0.0;
            return self.loop_mode == LoopMode::Once && self.finish();
        }

        if self.loop_mode == LoopMode::Once {
            self.loop_count = 0;
            if time > 0.0 && time < self.duration {
                self.time = time;
                return false;
            }
            self.time = time.clamp(0.0, self.duration);
            return self.finish();
        }

        if (0.0..self.duration).contains(&time) {
            self.time = time;
            return false;
        }

        let wraps = (time / self.duration).floor();
        time -= self.duration * wraps;
        self.loop_count = self.loop_count.saturating_add(wraps.abs() as u32);

        if self.repetitions != REPEAT_FOREVER && self.loop_count >= self.repetitions {
            self.time = if delta > 0.0 { self.duration } else { 0.0 };
            return self.finish();
        }

        self.time = time;
        false
    }

    fn finish(&mut self) -> bool {
        if self.clamp_when_finished {
            self.paused = true;
        } else {
            self.enabled = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn playing(duration: f32) -> ClipAction {
        let mut action = ClipAction::new(duration);
        action.play();
        action
    }

    #[test]
    fn repeat_wraps_without_finishing() {
        let mut action = playing(1.0);
        assert!(!action.advance(0.6, 0.6));
        assert!(!action.advance(1.2, 0.6));
        assert!((action.time() - 0.2).abs() < EPSILON);
        assert!(action.is_running());
    }

    #[test]
    fn once_with_clamp_holds_last_frame() {
        let mut action = playing(1.0);
        action.set_loop(LoopMode::Once, 1);
        action.set_clamp_when_finished(true);

        assert!(!action.advance(0.5, 0.5));
        assert!(action.advance(1.5, 1.0));
        assert_eq!(action.time(), 1.0);
        assert!(action.is_paused());
        assert!(action.enabled());
        assert!(!action.advance(2.0, 0.5), "finished fires once");
        assert_eq!(action.time(), 1.0);
    }

    #[test]
    fn once_without_clamp_disables_itself() {
        let mut action = playing(0.5);
        action.set_loop(LoopMode::Once, 1);
        assert!(action.advance(1.0, 1.0));
        assert!(!action.enabled());
        assert_eq!(action.effective_weight(), 0.0);
    }

    #[test]
    fn finite_repeat_finishes_after_last_pass() {
        let mut action = playing(1.0);
        action.set_loop(LoopMode::Repeat, 2);
        assert!(!action.advance(1.1, 1.1));
        assert!(action.advance(2.2, 1.1));
        assert_eq!(action.time(), 1.0);
    }

    #[test]
    fn ping_pong_mirrors_odd_passes() {
        let mut action = playing(1.0);
        action.set_loop(LoopMode::PingPong, REPEAT_FOREVER);
        action.advance(1.25, 1.25);
        assert!((action.sample_time() - 0.75).abs() < EPSILON);
        action.advance(2.25, 1.0);
        assert!((action.sample_time() - 0.25).abs() < EPSILON);
    }

    #[test]
    fn fade_out_reaches_zero_and_disables() {
        let mut action = playing(2.0);
        action.fade_out(0.0, 0.5);
        action.advance(0.25, 0.25);
        assert!((action.effective_weight() - 0.5).abs() < EPSILON);
        action.advance(0.5, 0.25);
        assert!(!action.enabled());
        assert!(!action.is_fading());
    }

    #[test]
    fn fade_in_scales_the_base_weight() {
        let mut action = playing(2.0);
        action.set_effective_weight(0.5);
        action.fade_in(0.0, 1.0);
        assert_eq!(action.effective_weight(), 0.0);
        action.advance(0.5, 0.5);
        assert!((action.effective_weight() - 0.25).abs() < EPSILON);
        action.advance(1.0, 0.5);
        assert!((action.effective_weight() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn warp_settles_on_end_scale() {
        let mut action = playing(4.0);
        action.warp(0.0, 2.0, 1.0, 1.0);
        assert_eq!(action.effective_time_scale(), 2.0);
        action.advance(0.5, 0.5);
        assert!((action.effective_time_scale() - 1.5).abs() < EPSILON);
        action.advance(1.0, 0.5);
        assert!(!action.is_warping());
        assert_eq!(action.effective_time_scale(), 1.0);
    }

    #[test]
    fn reset_clears_pause_and_rewinds() {
        let mut action = playing(1.0);
        action.set_loop(LoopMode::Once, 1);
        action.set_clamp_when_finished(true);
        action.advance(2.0, 2.0);
        action.reset();
        assert_eq!(action.time(), 0.0);
        assert!(!action.is_paused());
        assert!(action.is_running());
    }

    #[test]
    fn set_time_is_clamped_to_clip() {
        let mut action = ClipAction::new(1.5);
        action.set_time(4.0);
        assert_eq!(action.time(), 1.5);
        action.set_time(f32::NAN);
        assert_eq!(action.time(), 0.0);
    }
}
