// SPDX-License-Identifier: MIT OR Apache-2.0
//! The director: a timeline plus its playback controller.
//!
//! Playback is cooperative. Nothing happens until the owner calls
//! [`Director::update`] (typically once per rendered frame); each call turns
//! the wall-clock time since the previous call into a `(previous, current]`
//! window and evaluates actions, then tweens, over it.

use crate::clock::{frame_to_time, time_to_frame, Clock, SystemClock};
use crate::easing::EasingTable;
use crate::error::Result;
use crate::timeline::Timeline;
use crate::tween::TweenSpec;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not started, or stopped
    #[default]
    Stopped,
    /// Advancing with the clock
    Playing,
    /// Holding position
    Paused,
}

/// Time-driven scheduler for actions and tweens
pub struct Director {
    timeline: Timeline,
    easings: EasingTable,
    clock: Box<dyn Clock>,
    state: PlaybackState,
    /// Wall-clock sample (ms) taken by the last start/pause/update
    last_sample: Option<f64>,
    /// Playback position in milliseconds
    position: f64,
    fps: Option<f64>,
}

impl Director {
    /// Create a director driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a director driven by `clock`
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            timeline: Timeline::new(),
            easings: EasingTable::standard(),
            clock: Box::new(clock),
            state: PlaybackState::Stopped,
            last_sample: None,
            position: 0.0,
            fps: None,
        }
    }

    // -- Authoring --

    /// Schedule `effect` to run when playback crosses `time` seconds
    pub fn add_action(&mut self, time: f64, effect: impl FnMut() + 'static) -> &mut Self {
        self.timeline.push_action(time, effect);
        self
    }

    /// Schedule a tween.
    ///
    /// Fails only when the easing name cannot be resolved. A negative
    /// duration is logged and ignored.
    pub fn add_tween(&mut self, spec: TweenSpec) -> Result<&mut Self> {
        self.timeline.push_tween(spec, &self.easings)?;
        Ok(self)
    }

    /// Append the entries of `other`, shifted by `offset` seconds.
    ///
    /// `other` is consumed: its entries are moved, not copied.
    pub fn merge(&mut self, other: Director, offset: f64) -> &mut Self {
        tracing::debug!(
            "Merging {} actions and {} tweens at +{offset}s",
            other.timeline.actions().len(),
            other.timeline.tweens().len()
        );
        self.timeline.append(other.timeline, offset * 1000.0);
        self
    }

    /// The timeline store
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Easing names available to [`Director::add_tween`]
    pub fn easing_table(&self) -> &EasingTable {
        &self.easings
    }

    /// Mutable easing table, for registering extra curves
    pub fn easing_table_mut(&mut self) -> &mut EasingTable {
        &mut self.easings
    }

    /// Replace the easing table wholesale
    pub fn set_easing_table(&mut self, easings: EasingTable) {
        self.easings = easings;
    }

    /// Number of registered actions
    pub fn action_count(&self) -> usize {
        self.timeline.actions().len()
    }

    /// Number of registered tweens
    pub fn tween_count(&self) -> usize {
        self.timeline.tweens().len()
    }

    /// End of the last action or tween, in seconds
    pub fn duration(&self) -> f64 {
        self.timeline.duration() / 1000.0
    }

    // -- Playback --

    /// Start playing from time 0.
    ///
    /// Actions scheduled at time 0 fire immediately. Tweens are first
    /// evaluated by the next update.
    pub fn start(&mut self) {
        self.last_sample = Some(self.clock.now_ms());
        self.position = 0.0;
        self.state = PlaybackState::Playing;
        tracing::debug!("Director started");

        self.timeline.apply_actions(-1.0, 0.0);
    }

    /// Stop and rewind. Values already written by tweens are left as they are.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position = 0.0;
        self.last_sample = None;
        tracing::debug!("Director stopped");
    }

    /// Toggle between playing and paused. Does nothing while stopped.
    ///
    /// The clock is re-sampled on every toggle, so time spent paused is
    /// never added to the playback position.
    pub fn pause(&mut self) {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Stopped => {
                tracing::debug!("Ignoring pause while stopped");
                return;
            }
        };
        self.last_sample = Some(self.clock.now_ms());
        tracing::debug!("Director {:?} at {}ms", self.state, self.position);
    }

    /// Advance by the wall-clock time elapsed since the last sample.
    pub fn update(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let now = self.clock.now_ms();
        let elapsed = now - self.last_sample.unwrap_or(now);
        self.last_sample = Some(now);

        let previous = self.position;
        self.position += elapsed;
        self.tick(previous, self.position);
    }

    /// Jump to `time` seconds. Does nothing unless playing.
    ///
    /// Seeking forward evaluates the skipped window like a long frame, so
    /// only newly crossed actions fire. Seeking backward (or to the current
    /// position) replays the timeline from its beginning up to `time`:
    /// every action at or before `time` fires again, even if it already
    /// fired, and tweens are re-evaluated from scratch. Non-finite times are
    /// ignored.
    pub fn goto(&mut self, time: f64) {
        if self.state != PlaybackState::Playing {
            tracing::debug!("Ignoring goto({time}s) while {:?}", self.state);
            return;
        }
        if !time.is_finite() {
            tracing::debug!("Ignoring goto({time}s)");
            return;
        }

        let target = time * 1000.0;
        let previous = self.position;
        self.position = target;

        if target > previous {
            self.tick(previous, target);
        } else {
            self.tick(-1.0, target);
        }
    }

    /// Set the frame rate used by the frame helpers. Non-positive values are ignored.
    pub fn set_fps(&mut self, fps: f64) {
        if fps > 0.0 && fps.is_finite() {
            self.fps = Some(fps);
        } else {
            tracing::warn!("Ignoring invalid frame rate {fps}");
        }
    }

    /// Frame rate, if set
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Frame shown at the current position, if a frame rate is set
    pub fn current_frame(&self) -> Option<u64> {
        self.fps
            .map(|fps| time_to_frame(self.position_seconds(), fps))
    }

    /// Advance exactly one frame, ignoring the wall clock.
    ///
    /// Works while playing or paused. Returns `false` if stopped or no
    /// frame rate is set.
    ///
    /// The position lands exactly on the next frame boundary, so rounding
    /// never accumulates across steps.
    pub fn step_frame(&mut self) -> bool {
        let Some(fps) = self.fps else {
            return false;
        };
        if self.state == PlaybackState::Stopped {
            return false;
        }
        let next = time_to_frame(self.position_seconds(), fps) + 1;
        self.advance_to(frame_to_time(next, fps) * 1000.0);
        true
    }

    /// Advance by `delta` milliseconds, ignoring the wall clock.
    ///
    /// The clock is re-sampled afterwards so the next update does not count
    /// the same time twice. Negative deltas and stopped directors are ignored.
    pub fn advance_by(&mut self, delta: f64) {
        if self.state == PlaybackState::Stopped || delta.is_nan() || delta < 0.0 {
            return;
        }
        self.advance_to(self.position + delta);
    }

    fn advance_to(&mut self, target: f64) {
        let previous = self.position;
        self.position = target;
        self.last_sample = Some(self.clock.now_ms());
        self.tick(previous, self.position);
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the director is playing (not paused or stopped)
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Playback position in seconds
    pub fn position_seconds(&self) -> f64 {
        self.position / 1000.0
    }

    /// Whether playback has reached the end of the last action or tween
    pub fn is_complete(&self) -> bool {
        self.position >= self.timeline.duration()
    }

    fn tick(&mut self, previous: f64, current: f64) {
        let fired = self.timeline.apply_actions(previous, current);
        let ran = self.timeline.apply_tweens(previous, current);
        tracing::trace!("Tick ({previous}, {current}]: {fired} actions, {ran} tweens");
    }
}

impl Default for Director {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::easing::{Easing, ALWAYS_ONE};
    use crate::property::{props, shared, PropertyBag, PropertyMap, TargetHandle};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    fn director() -> (Director, ManualClock) {
        let clock = ManualClock::new();
        (Director::with_clock(clock.clone()), clock)
    }

    fn x(bag: &Rc<RefCell<PropertyBag>>) -> f64 {
        bag.borrow().get("x").unwrap_or(f64::NAN)
    }

    #[test]
    fn test_start_fires_time_zero_actions() {
        let (mut director, _clock) = director();
        let (zero, at_zero) = counter();
        let (later, at_one) = counter();
        director.add_action(0.0, at_zero).add_action(1.0, at_one);

        director.start();
        assert_eq!(zero.get(), 1);
        assert_eq!(later.get(), 0);
        assert!(director.is_playing());
    }

    #[test]
    fn test_update_fires_each_action_once() {
        let (mut director, clock) = director();
        let (count, action) = counter();
        director.add_action(0.5, action);
        director.start();

        for _ in 0..10 {
            clock.advance_ms(100.0);
            director.update();
        }
        assert_eq!(count.get(), 1);
        assert!((director.position_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_tween_and_overshoot_snap() {
        let (mut director, clock) = director();
        let bag = shared(PropertyBag::new().with("x", 0.0));
        director
            .add_tween(
                TweenSpec::new(1.0, props([("x", 10.0)]))
                    .at(0.0)
                    .target(bag.clone())
                    .from(props([("x", 0.0)]))
                    .easing("linear"),
            )
            .unwrap();
        director.start();

        clock.advance_ms(500.0);
        director.update();
        assert_eq!(x(&bag), 5.0);

        clock.advance_ms(400.0);
        director.update();
        assert_eq!(x(&bag), 9.0);

        clock.advance_ms(600.0);
        director.update();
        assert_eq!(x(&bag), 10.0);

        bag.borrow_mut().set("x", 42.0);
        clock.advance_ms(500.0);
        director.update();
        assert_eq!(x(&bag), 42.0);
    }

    #[test]
    fn test_tween_lands_on_end_value() {
        let (mut director, clock) = director();
        let bag = shared(PropertyBag::new().with("x", 0.0));
        director
            .add_tween(TweenSpec::new(1.0, props([("x", 10.0)])).at(0.0).target(bag.clone()))
            .unwrap();
        director.start();

        clock.advance_ms(1000.0);
        director.update();
        assert_eq!(x(&bag), 10.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let (mut director, clock) = director();
        let bag = shared(PropertyBag::new().with("x", 3.0));
        director
            .add_tween(TweenSpec::new(0.0, props([("x", 8.0)])).at(1.0).target(bag.clone()))
            .unwrap();
        director.start();

        clock.advance_ms(900.0);
        director.update();
        assert_eq!(x(&bag), 3.0);

        clock.advance_ms(300.0);
        director.update();
        assert_eq!(x(&bag), 8.0);
    }

    #[test]
    fn test_explicit_start_values_never_reread() {
        let (mut director, clock) = director();
        let bag = shared(PropertyBag::new().with("x", 50.0));
        director
            .add_tween(
                TweenSpec::new(1.0, props([("x", 10.0)]))
                    .at(0.0)
                    .target(bag.clone())
                    .from(props([("x", 0.0)])),
            )
            .unwrap();
        director.start();

        clock.advance_ms(250.0);
        director.update();
        assert_eq!(x(&bag), 2.5);

        bag.borrow_mut().set("x", -999.0);
        clock.advance_ms(250.0);
        director.update();
        assert_eq!(x(&bag), 5.0);
    }

    #[test]
    fn test_pause_holds_position() {
        let (mut director, clock) = director();
        let (count, action) = counter();
        director.add_action(1.0, action);
        director.start();

        clock.advance_ms(400.0);
        director.update();
        director.pause();
        assert_eq!(director.state(), PlaybackState::Paused);

        clock.advance_ms(5000.0);
        director.update();
        assert_eq!(count.get(), 0);

        director.pause();
        clock.advance_ms(100.0);
        director.update();
        assert!((director.position_seconds() - 0.5).abs() < 1e-9);
        assert_eq!(count.get(), 0);

        clock.advance_ms(500.0);
        director.update();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_pause_while_stopped_is_ignored() {
        let (mut director, _clock) = director();
        director.pause();
        assert_eq!(director.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_stop_rewinds_without_effects() {
        let (mut director, clock) = director();
        let (count, action) = counter();
        director.add_action(2.0, action);
        director.start();

        clock.advance_ms(1000.0);
        director.update();
        director.stop();
        assert_eq!(director.state(), PlaybackState::Stopped);
        assert_eq!(director.position_seconds(), 0.0);

        clock.advance_ms(5000.0);
        director.update();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_goto_forward_fires_only_crossed() {
        let (mut director, clock) = director();
        let (first, a) = counter();
        let (second, b) = counter();
        director.add_action(1.0, a).add_action(3.0, b);
        director.start();

        clock.advance_ms(1500.0);
        director.update();
        assert_eq!(first.get(), 1);

        director.goto(4.0);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
        assert_eq!(director.position_seconds(), 4.0);
    }

    #[test]
    fn test_goto_backward_replays_from_start() {
        let (mut director, clock) = director();
        let (first, a) = counter();
        let (second, b) = counter();
        let (third, c) = counter();
        director.add_action(0.0, a).add_action(1.0, b).add_action(3.0, c);
        director.start();

        clock.advance_ms(2000.0);
        director.update();
        assert_eq!((first.get(), second.get(), third.get()), (1, 1, 0));

        director.goto(1.0);
        assert_eq!((first.get(), second.get(), third.get()), (2, 2, 0));
        assert_eq!(director.position_seconds(), 1.0);

        director.goto(1.0);
        assert_eq!((first.get(), second.get(), third.get()), (3, 3, 0));
    }

    #[test]
    fn test_goto_backward_rewinds_tween() {
        let (mut director, _clock) = director();
        let bag = shared(PropertyBag::new().with("x", 0.0));
        director
            .add_tween(TweenSpec::new(2.0, props([("x", 20.0)])).at(0.0).target(bag.clone()))
            .unwrap();
        director.start();

        director.goto(1.5);
        assert_eq!(x(&bag), 15.0);

        director.goto(0.5);
        assert_eq!(x(&bag), 5.0);
    }

    #[test]
    fn test_goto_ignored_unless_playing() {
        let (mut director, _clock) = director();
        let (count, action) = counter();
        director.add_action(1.0, action);

        director.goto(2.0);
        assert_eq!(count.get(), 0);

        director.start();
        director.pause();
        director.goto(2.0);
        assert_eq!(count.get(), 0);
        assert_eq!(director.position_seconds(), 0.0);
    }

    #[test]
    fn test_merge_offsets_other() {
        let (mut main, clock) = director();
        let (count, action) = counter();
        main.add_action(1.0, || {});

        let mut intro = Director::new();
        intro.add_action(0.5, action);
        intro
            .add_tween(TweenSpec::new(1.0, props([("x", 1.0)])).at(0.0))
            .unwrap();

        main.merge(intro, 5.0);
        assert_eq!(main.action_count(), 2);
        assert_eq!(main.timeline().actions()[1].time(), 5500.0);
        assert_eq!(main.timeline().tweens()[0].start_time(), 5000.0);
        assert_eq!(main.duration(), 6.0);

        main.start();
        clock.advance_ms(5400.0);
        main.update();
        assert_eq!(count.get(), 0);
        clock.advance_ms(200.0);
        main.update();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_always_one_callback_tween() {
        let (mut director, clock) = director();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = calls.clone();

        director
            .add_tween(
                TweenSpec::new(1.0, PropertyMap::new())
                    .at(0.0)
                    .easing(ALWAYS_ONE)
                    .on_update(move |k, target: Option<&TargetHandle>| {
                        seen.borrow_mut().push((k, target.is_some()));
                    }),
            )
            .unwrap();
        director.start();

        for _ in 0..3 {
            clock.advance_ms(250.0);
            director.update();
        }
        assert_eq!(*calls.borrow(), vec![(1.0, false); 3]);
    }

    #[test]
    fn test_unknown_easing_fails_fast() {
        let (mut director, _clock) = director();
        let result = director.add_tween(TweenSpec::new(1.0, props([("x", 1.0)])).easing("Nope.Out"));
        assert!(result.is_err());
        assert_eq!(director.tween_count(), 0);
    }

    #[test]
    fn test_custom_table_names() {
        let (mut director, clock) = director();
        director
            .easing_table_mut()
            .insert("Quad.In", Easing::custom(|k| k * k));

        let bag = shared(PropertyBag::new().with("x", 0.0));
        director
            .add_tween(
                TweenSpec::new(1.0, props([("x", 8.0)]))
                    .at(0.0)
                    .target(bag.clone())
                    .easing("Quad.In"),
            )
            .unwrap();
        director.start();

        clock.advance_ms(500.0);
        director.update();
        assert_eq!(x(&bag), 2.0);
    }

    #[test]
    fn test_step_frame() {
        let (mut director, _clock) = director();
        assert!(!director.step_frame());

        director.set_fps(0.0);
        assert_eq!(director.fps(), None);
        director.set_fps(4.0);

        let (count, action) = counter();
        director.add_action(0.5, action);
        assert!(!director.step_frame());

        director.start();
        assert!(director.step_frame());
        assert_eq!(director.current_frame(), Some(1));
        assert_eq!(count.get(), 0);

        director.pause();
        assert!(director.step_frame());
        assert_eq!(director.current_frame(), Some(2));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_step_frame_stays_on_frame_at_common_rates() {
        for fps in [24.0, 30.0, 29.97, 60.0] {
            let (mut director, _clock) = director();
            director.set_fps(fps);
            director.start();

            for n in 1..=1000 {
                assert!(director.step_frame());
                assert_eq!(director.current_frame(), Some(n), "fps {fps}");
            }
            assert!((director.position_seconds() - 1000.0 / fps).abs() < 1e-9);
        }
    }

    #[test]
    fn test_step_frame_from_mid_frame_lands_on_next_boundary() {
        let (mut director, clock) = director();
        director.set_fps(30.0);
        director.start();

        clock.advance_ms(50.0);
        director.update();
        assert_eq!(director.current_frame(), Some(1));

        assert!(director.step_frame());
        assert_eq!(director.current_frame(), Some(2));
        assert!((director.position_seconds() - 2.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_goto_ignores_non_finite_time() {
        let (mut director, clock) = director();
        let (count, action) = counter();
        director.add_action(1.0, action);
        director.start();

        director.goto(f64::NAN);
        director.goto(f64::INFINITY);
        assert_eq!(director.position_seconds(), 0.0);

        clock.advance_ms(1000.0);
        director.update();
        assert_eq!(director.position_seconds(), 1.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_advance_resamples_clock() {
        let (mut director, clock) = director();
        director.start();

        clock.advance_ms(300.0);
        director.advance_by(1000.0);
        director.update();
        assert!((director.position_seconds() - 1.0).abs() < 1e-9);

        director.advance_by(-50.0);
        assert!((director.position_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_complete() {
        let (mut director, clock) = director();
        director.add_action(1.0, || {});
        director.start();
        assert!(!director.is_complete());

        clock.advance_ms(1000.0);
        director.update();
        assert!(director.is_complete());
    }
}
