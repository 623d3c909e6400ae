// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    /// Create a new random action ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Effect run when an action fires
pub type ActionFn = Box<dyn FnMut()>;

/// An effect scheduled at a single instant
pub struct Action {
    /// Unique action ID
    pub id: ActionId,
    /// Scheduled time in milliseconds
    time: f64,
    effect: ActionFn,
}

impl Action {
    /// Create an action at `time` milliseconds
    pub fn new(time: f64, effect: impl FnMut() + 'static) -> Self {
        Self {
            id: ActionId::new(),
            time,
            effect: Box::new(effect),
        }
    }

    /// Scheduled time in milliseconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Whether the window `(previous, current]` crosses this action.
    ///
    /// The left edge is excluded so an action at exactly `previous` does not
    /// fire again; an action at exactly `current` fires.
    pub fn is_due(&self, previous: f64, current: f64) -> bool {
        self.time > previous && self.time <= current
    }

    pub(crate) fn fire(&mut self) {
        (self.effect)();
    }

    pub(crate) fn shift(&mut self, offset: f64) {
        self.time += offset;
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
