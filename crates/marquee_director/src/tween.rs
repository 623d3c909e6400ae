// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tweens: eased interpolation of numeric properties over a time window.

use crate::easing::{Easing, EasingRef};
use crate::property::{PropertyMap, TargetHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenId(pub Uuid);

impl TweenId {
    /// Create a new random tween ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TweenId {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback run once per tick with the eased progress and the last processed target
pub type TweenCallback = Box<dyn FnMut(f64, Option<&TargetHandle>)>;

/// Description of a tween to register.
///
/// Everything except the duration and end values is optional. Omitted
/// fields fall back to whatever the previous registration used.
pub struct TweenSpec {
    pub(crate) start_time: Option<f64>,
    pub(crate) duration: f64,
    pub(crate) targets: Option<Vec<TargetHandle>>,
    pub(crate) start_values: Option<PropertyMap>,
    pub(crate) end_values: PropertyMap,
    pub(crate) easing: Option<EasingRef>,
    pub(crate) callback: Option<TweenCallback>,
}

impl TweenSpec {
    /// Tween lasting `duration` seconds towards `end_values`
    pub fn new(duration: f64, end_values: PropertyMap) -> Self {
        Self {
            start_time: None,
            duration,
            targets: None,
            start_values: None,
            end_values,
            easing: None,
            callback: None,
        }
    }

    /// Start at `start_time` seconds instead of chaining after the previous tween
    pub fn at(mut self, start_time: f64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Add a target. Can be called repeatedly.
    pub fn target(mut self, target: TargetHandle) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(target);
        self
    }

    /// Set all targets at once
    pub fn targets(mut self, targets: impl IntoIterator<Item = TargetHandle>) -> Self {
        self.targets = Some(targets.into_iter().collect());
        self
    }

    /// Explicit start values. Keys left out are captured from the target on first use.
    pub fn from(mut self, start_values: PropertyMap) -> Self {
        self.start_values = Some(start_values);
        self
    }

    /// Easing by name or curve
    pub fn easing(mut self, easing: impl Into<EasingRef>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    /// Callback invoked once per evaluated tick
    pub fn on_update(mut self, callback: impl FnMut(f64, Option<&TargetHandle>) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

/// A registered tween. Times are in milliseconds.
pub struct Tween {
    /// Unique tween ID
    pub id: TweenId,
    start_time: f64,
    duration: f64,
    end_time: f64,
    targets: Vec<TargetHandle>,
    start_values: PropertyMap,
    end_values: PropertyMap,
    easing: Easing,
    callback: Option<TweenCallback>,
}

impl Tween {
    pub(crate) fn new(
        start_time: f64,
        duration: f64,
        targets: Vec<TargetHandle>,
        start_values: PropertyMap,
        end_values: PropertyMap,
        easing: Easing,
        callback: Option<TweenCallback>,
    ) -> Self {
        Self {
            id: TweenId::new(),
            start_time,
            duration,
            end_time: start_time + duration,
            targets,
            start_values,
            end_values,
            easing,
            callback,
        }
    }

    /// Start time in milliseconds
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Duration in milliseconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// End time in milliseconds (`start_time + duration`)
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Targets in registration order
    pub fn targets(&self) -> &[TargetHandle] {
        &self.targets
    }

    /// Start values known so far (explicit or captured)
    pub fn start_values(&self) -> &PropertyMap {
        &self.start_values
    }

    /// End values
    pub fn end_values(&self) -> &PropertyMap {
        &self.end_values
    }

    /// Easing curve
    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    /// Time at which the tween must be evaluated for the window `(previous, current]`.
    ///
    /// Inside its window the tween is evaluated at `current`. A window that
    /// jumps past the end snaps the tween to `end_time`, so a long frame
    /// never skips a tween entirely.
    pub fn sample_time(&self, previous: f64, current: f64) -> Option<f64> {
        if self.start_time <= current && current <= self.end_time {
            Some(current)
        } else if current > self.end_time && previous < self.end_time {
            Some(self.end_time)
        } else {
            None
        }
    }

    /// Raw (uneased) progress at `time`; 1 for zero-length tweens
    pub fn progress_at(&self, time: f64) -> f64 {
        if self.duration == 0.0 {
            1.0
        } else {
            (time - self.start_time) / self.duration
        }
    }

    /// Write interpolated values at `time` into every target, then run the callback.
    pub(crate) fn run(&mut self, time: f64) {
        let k = self.easing.apply(self.progress_at(time));

        for target in self.targets.iter().rev() {
            let Ok(mut object) = target.try_borrow_mut() else {
                tracing::warn!("Tween {:?} skipped a target that is already borrowed", self.id);
                continue;
            };

            for (name, &end) in &self.end_values {
                let start = match self.start_values.get(name) {
                    Some(&start) => start,
                    None => match object.property(name) {
                        Some(live) => {
                            self.start_values.insert(name.clone(), live);
                            live
                        }
                        None => {
                            tracing::trace!("Tween {:?}: target has no `{name}`", self.id);
                            continue;
                        }
                    },
                };

                object.set_property(name, start + k * (end - start));
            }
        }

        if let Some(callback) = self.callback.as_mut() {
            callback(k, self.targets.first());
        }
    }

    pub(crate) fn shift(&mut self, offset: f64) {
        self.start_time += offset;
        self.end_time += offset;
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("start_time", &self.start_time)
            .field("duration", &self.duration)
            .field("end_time", &self.end_time)
            .field("targets", &self.targets.len())
            .field("start_values", &self.start_values)
            .field("end_values", &self.end_values)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}
