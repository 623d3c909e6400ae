// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves and the named easing table.
//!
//! Tweens refer to curves either directly ([`Easing`]) or by a dotted name
//! resolved through an [`EasingTable`]. The table is a tree of groups, so a
//! richer easing library can be plugged in under its own names
//! (`"Quad.InOut"`) without touching call sites.

use crate::error::{DirectorError, Result};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Name that always resolves to [`Easing::AlwaysOne`]
pub const ALWAYS_ONE: &str = "Always.One";

/// Name that always resolves to [`Easing::AlwaysZero`]
pub const ALWAYS_ZERO: &str = "Always.Zero";

/// User supplied curve
pub type Curve = Rc<dyn Fn(f64) -> f64>;

/// Normalized easing curve.
///
/// Maps progress in `[0, 1]` to a multiplier. The output is not clamped, so
/// custom curves may overshoot.
#[derive(Clone, Default)]
pub enum Easing {
    /// Constant velocity
    #[default]
    Linear,
    /// Slow start and end
    CubicInOut,
    /// Slow start
    CubicEaseIn,
    /// Slow end
    CubicEaseOut,
    /// Always 1, for callback-only tweens that snap immediately
    AlwaysOne,
    /// Always 0, for callback-only tweens that never move their targets
    AlwaysZero,
    /// Caller supplied curve
    Custom(Curve),
}

impl Easing {
    /// Wrap a closure as a custom curve
    pub fn custom(curve: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(curve))
    }

    /// Evaluate the curve at `k`
    pub fn apply(&self, k: f64) -> f64 {
        match self {
            Self::Linear => k,
            Self::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
            Self::CubicEaseIn => k * k * k,
            Self::CubicEaseOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Self::AlwaysOne => 1.0,
            Self::AlwaysZero => 0.0,
            Self::Custom(curve) => curve(k),
        }
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::CubicInOut => "cubicInOut",
            Self::CubicEaseIn => "cubicEaseIn",
            Self::CubicEaseOut => "cubicEaseOut",
            Self::AlwaysOne => ALWAYS_ONE,
            Self::AlwaysZero => ALWAYS_ZERO,
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

/// Entry of an [`EasingTable`]
#[derive(Debug, Clone)]
pub enum EasingEntry {
    /// A curve
    Curve(Easing),
    /// A nested group of entries
    Group(EasingTable),
}

/// Tree of named easing curves.
#[derive(Debug, Clone, Default)]
pub struct EasingTable {
    entries: IndexMap<String, EasingEntry>,
}

impl EasingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in curves.
    ///
    /// Top level: `linear`, `cubicInOut`, `cubicEaseIn`, `cubicEaseOut`.
    /// Groups: `Linear.EaseNone` and `Cubic.{In, Out, InOut}`.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .insert("linear", Easing::Linear)
            .insert("cubicInOut", Easing::CubicInOut)
            .insert("cubicEaseIn", Easing::CubicEaseIn)
            .insert("cubicEaseOut", Easing::CubicEaseOut)
            .insert("Linear.EaseNone", Easing::Linear)
            .insert("Cubic.In", Easing::CubicEaseIn)
            .insert("Cubic.Out", Easing::CubicEaseOut)
            .insert("Cubic.InOut", Easing::CubicInOut);
        table
    }

    /// Insert a curve under a (possibly dotted) name.
    ///
    /// Missing groups along the path are created. A curve sitting where a
    /// group is needed gets replaced by that group.
    pub fn insert(&mut self, name: &str, easing: Easing) -> &mut Self {
        self.insert_path(name, easing);
        self
    }

    fn insert_path(&mut self, name: &str, easing: Easing) {
        let Some((head, rest)) = name.split_once('.') else {
            self.entries.insert(name.to_string(), EasingEntry::Curve(easing));
            return;
        };

        let entry = self
            .entries
            .entry(head.to_string())
            .or_insert_with(|| EasingEntry::Group(EasingTable::new()));

        match entry {
            EasingEntry::Group(group) => group.insert_path(rest, easing),
            EasingEntry::Curve(_) => {
                tracing::warn!("Easing `{head}` replaced by a group");
                let mut group = EasingTable::new();
                group.insert_path(rest, easing);
                *entry = EasingEntry::Group(group);
            }
        }
    }

    /// Insert a whole group under a single segment name
    pub fn insert_group(&mut self, name: impl Into<String>, group: EasingTable) -> &mut Self {
        self.entries.insert(name.into(), EasingEntry::Group(group));
        self
    }

    /// Get a direct child entry
    pub fn get(&self, segment: &str) -> Option<&EasingEntry> {
        self.entries.get(segment)
    }

    /// Names of the direct children
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a dotted name to a curve.
    ///
    /// [`ALWAYS_ONE`] and [`ALWAYS_ZERO`] resolve without consulting the
    /// table. Any other name is walked segment by segment.
    pub fn resolve(&self, name: &str) -> Result<Easing> {
        match name {
            ALWAYS_ONE => return Ok(Easing::AlwaysOne),
            ALWAYS_ZERO => return Ok(Easing::AlwaysZero),
            _ => {}
        }

        let mut table = self;
        let mut segments = name.split('.');
        while let Some(segment) = segments.next() {
            let Some(entry) = table.entries.get(segment) else {
                return Err(unknown(name, segment));
            };
            match entry {
                EasingEntry::Group(group) => table = group,
                EasingEntry::Curve(easing) => {
                    return match segments.next() {
                        None => Ok(easing.clone()),
                        Some(extra) => Err(unknown(name, extra)),
                    };
                }
            }
        }

        Err(DirectorError::NotACurve(name.to_string()))
    }
}

fn unknown(name: &str, segment: &str) -> DirectorError {
    tracing::warn!("Easing `{name}` not found (missing segment `{segment}`)");
    DirectorError::UnknownEasing {
        name: name.to_string(),
        segment: segment.to_string(),
    }
}

/// Easing given either by name or directly
#[derive(Debug, Clone)]
pub enum EasingRef {
    /// Dotted name looked up in the director's table
    Named(String),
    /// Curve used as-is
    Curve(Easing),
}

impl EasingRef {
    /// Resolve against a table. Direct curves bypass the lookup.
    pub fn resolve(&self, table: &EasingTable) -> Result<Easing> {
        match self {
            Self::Named(name) => table.resolve(name),
            Self::Curve(easing) => Ok(easing.clone()),
        }
    }
}

impl From<&str> for EasingRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for EasingRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Easing> for EasingRef {
    fn from(easing: Easing) -> Self {
        Self::Curve(easing)
    }
}
