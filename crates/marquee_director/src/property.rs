// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable targets.
//!
//! Tweens write numeric properties into objects they do not own. A target
//! exposes its properties by name through [`Animatable`]; the director only
//! performs plain get/set and knows nothing else about the target.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Named numeric values, kept in insertion order
pub type PropertyMap = IndexMap<String, f64>;

/// Shared, non-owning handle to a tween target
pub type TargetHandle = Rc<RefCell<dyn Animatable>>;

/// Capability of exposing numeric properties by name.
pub trait Animatable {
    /// Read a property, `None` if the target has no such property
    fn property(&self, name: &str) -> Option<f64>;

    /// Write a property. Returns `false` if the property is not writable.
    fn set_property(&mut self, name: &str, value: f64) -> bool;
}

/// Wrap a value so it can be handed to tweens and still be read by the caller.
///
/// The returned `Rc<RefCell<T>>` coerces to a [`TargetHandle`].
pub fn shared<T: Animatable>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

/// Build a [`PropertyMap`] from `(name, value)` pairs
pub fn props<K: Into<String>>(entries: impl IntoIterator<Item = (K, f64)>) -> PropertyMap {
    entries
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}

/// Map-backed animatable object.
///
/// Any property can be written; reading an unset property yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    values: PropertyMap,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (builder style)
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Set a property value
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// All properties in insertion order
    pub fn values(&self) -> &PropertyMap {
        &self.values
    }
}

impl From<PropertyMap> for PropertyBag {
    fn from(values: PropertyMap) -> Self {
        Self { values }
    }
}

impl Animatable for PropertyBag {
    fn property(&self, name: &str) -> Option<f64> {
        self.get(name)
    }

    fn set_property(&mut self, name: &str, value: f64) -> bool {
        self.set(name, value);
        true
    }
}
