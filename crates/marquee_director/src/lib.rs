// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time-driven director for animation.
//!
//! This crate schedules two kinds of timeline entries:
//! - Actions: one-shot effects fired when playback crosses their instant
//! - Tweens: eased interpolation of named numeric properties over a window
//!
//! ## Architecture
//!
//! The director is built on:
//! - An ordered timeline store with chained authoring defaults
//! - A named easing table with pluggable curves
//! - Window-based tick evaluation (`(previous, current]`)
//! - Playback control: start, stop, pause, seek and merge
//!
//! It is single-threaded and driven by an external per-frame
//! [`Director::update`] call.

pub mod action;
pub mod clock;
pub mod director;
pub mod easing;
pub mod error;
pub mod property;
pub mod timeline;
pub mod tween;

pub use action::{Action, ActionFn, ActionId};
pub use clock::{frame_to_time, time_to_frame, Clock, ManualClock, SystemClock};
pub use director::{Director, PlaybackState};
pub use easing::{Curve, Easing, EasingEntry, EasingRef, EasingTable, ALWAYS_ONE, ALWAYS_ZERO};
pub use error::{DirectorError, Result};
pub use property::{props, shared, Animatable, PropertyBag, PropertyMap, TargetHandle};
pub use timeline::{AuthoringCursor, Timeline};
pub use tween::{Tween, TweenCallback, TweenId, TweenSpec};
