// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline store and tick evaluation.
//!
//! Actions and tweens are kept in registration order, which is also the
//! evaluation order within a tick. When several tweens write the same
//! property in one tick, the one registered last wins.

use crate::action::{Action, ActionId};
use crate::easing::{Easing, EasingRef, EasingTable};
use crate::error::Result;
use crate::property::TargetHandle;
use crate::tween::{Tween, TweenId, TweenSpec};

/// Defaults carried from one tween registration to the next.
///
/// A tween registered without a start time, targets or easing picks them up
/// from here, which lets scripts chain tweens one after another.
///
/// The easing is kept as given (name or curve) and resolved again against
/// the table passed to each registration, so swapping the easing table
/// between registrations changes what a chained name means.
#[derive(Default)]
pub struct AuthoringCursor {
    last_end_time: f64,
    last_targets: Vec<TargetHandle>,
    last_easing: Option<EasingRef>,
}

impl AuthoringCursor {
    /// End time (ms) of the last registered tween, 0 before any
    pub fn last_end_time(&self) -> f64 {
        self.last_end_time
    }

    /// Targets of the last registered tween
    pub fn last_targets(&self) -> &[TargetHandle] {
        &self.last_targets
    }

    /// Easing of the last registered tween, as it was given
    pub fn last_easing(&self) -> Option<&EasingRef> {
        self.last_easing.as_ref()
    }
}

/// Ordered collections of actions and tweens
#[derive(Default)]
pub struct Timeline {
    actions: Vec<Action>,
    tweens: Vec<Tween>,
    cursor: AuthoringCursor,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action at `time` seconds
    pub fn push_action(&mut self, time: f64, effect: impl FnMut() + 'static) -> ActionId {
        let action = Action::new(time * 1000.0, effect);
        let id = action.id;
        self.actions.push(action);
        id
    }

    /// Append a tween, filling omitted fields from the authoring cursor.
    ///
    /// Returns `Ok(None)` when the tween was ignored because its duration is
    /// negative. Fails if the easing name cannot be resolved; in both cases
    /// nothing is registered and the cursor is left untouched.
    pub fn push_tween(&mut self, spec: TweenSpec, easings: &EasingTable) -> Result<Option<TweenId>> {
        let duration = spec.duration * 1000.0;
        if duration.is_nan() || duration < 0.0 {
            tracing::warn!("Ignoring tween with invalid duration {}s", spec.duration);
            return Ok(None);
        }

        let easing_ref = spec.easing.or_else(|| self.cursor.last_easing.clone());
        let easing = match &easing_ref {
            Some(easing) => easing.resolve(easings)?,
            None => Easing::default(),
        };
        let start_time = spec
            .start_time
            .map_or(self.cursor.last_end_time, |start| start * 1000.0);
        let targets = spec
            .targets
            .unwrap_or_else(|| self.cursor.last_targets.clone());

        let tween = Tween::new(
            start_time,
            duration,
            targets,
            spec.start_values.unwrap_or_default(),
            spec.end_values,
            easing,
            spec.callback,
        );

        self.cursor.last_end_time = tween.end_time();
        self.cursor.last_targets = tween.targets().to_vec();
        self.cursor.last_easing = easing_ref;

        let id = tween.id;
        self.tweens.push(tween);
        Ok(Some(id))
    }

    /// Move every entry of `other` by `offset` milliseconds and append them.
    ///
    /// This timeline's authoring cursor is kept.
    pub fn append(&mut self, other: Timeline, offset: f64) {
        let Timeline {
            mut actions,
            mut tweens,
            ..
        } = other;

        for action in &mut actions {
            action.shift(offset);
        }
        for tween in &mut tweens {
            tween.shift(offset);
        }

        self.actions.append(&mut actions);
        self.tweens.append(&mut tweens);
    }

    /// Fire every action crossed by `(previous, current]`. Returns how many fired.
    pub fn apply_actions(&mut self, previous: f64, current: f64) -> usize {
        let mut fired = 0;
        for action in &mut self.actions {
            if action.is_due(previous, current) {
                action.fire();
                fired += 1;
            }
        }
        fired
    }

    /// Evaluate every tween touched by `(previous, current]`. Returns how many ran.
    pub fn apply_tweens(&mut self, previous: f64, current: f64) -> usize {
        let mut ran = 0;
        for tween in &mut self.tweens {
            if let Some(time) = tween.sample_time(previous, current) {
                tween.run(time);
                ran += 1;
            }
        }
        ran
    }

    /// Registered actions
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Registered tweens
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Authoring defaults for the next tween
    pub fn cursor(&self) -> &AuthoringCursor {
        &self.cursor
    }

    /// Time (ms) of the last action or tween end, 0 when empty
    pub fn duration(&self) -> f64 {
        let actions = self.actions.iter().map(Action::time);
        let tweens = self.tweens.iter().map(Tween::end_time);
        actions.chain(tweens).fold(0.0, f64::max)
    }
}
