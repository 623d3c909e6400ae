// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall-clock sources and frame/time conversion.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of wall-clock samples in milliseconds
pub trait Clock {
    /// Current time in milliseconds. Only differences between samples matter.
    fn now_ms(&self) -> f64;
}

/// Monotonic clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test or an offline renderer can keep
/// one handle and give the other to a director.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock at time 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time
    pub fn set_ms(&self, now: f64) {
        self.now.set(now);
    }

    /// Move the current time forward (or backward for negative values)
    pub fn advance_ms(&self, delta: f64) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Convert a frame number to seconds
pub fn frame_to_time(frame: u64, fps: f64) -> f64 {
    frame as f64 / fps
}

/// Frames closer than this to a boundary count as having reached it
const FRAME_EPSILON: f64 = 1e-6;

/// Convert seconds to the frame being shown at that time
pub fn time_to_frame(time: f64, fps: f64) -> u64 {
    (time * fps + FRAME_EPSILON).floor().max(0.0) as u64
}
