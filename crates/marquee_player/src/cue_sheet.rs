// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cue sheets: RON descriptions of targets, actions and tweens.
//!
//! A cue sheet names a set of property bags, then schedules actions and
//! tweens against them. [`CueSheet::build`] turns it into a ready-to-play
//! [`Stage`].

use indexmap::IndexMap;
use marquee_director::{
    Clock, Director, DirectorError, Easing, PropertyBag, PropertyMap, TargetHandle, TweenSpec,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Current cue sheet format version
pub const CUE_SHEET_FORMAT_VERSION: u32 = 1;

/// Cue sheet errors
#[derive(Debug, Error)]
pub enum CueSheetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Cue sheet written by a newer format
    #[error("Cue sheet version {0} is newer than supported version {max}", max = CUE_SHEET_FORMAT_VERSION)]
    UnsupportedVersion(u32),

    /// Frame rate is not a positive finite number
    #[error("Invalid frame rate: {0}")]
    InvalidFps(f64),

    /// A cue refers to a target that is not declared
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Director rejected a cue
    #[error("Director error: {0}")]
    Director(#[from] DirectorError),
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Frames per second
    pub fps: f64,
    /// Follow the wall clock instead of stepping frames as fast as possible
    pub realtime: bool,
    /// Stop after this many seconds (defaults to the end of the timeline)
    pub until: Option<f64>,
}

impl PlayerSettings {
    /// Reject settings playback cannot run with
    pub fn validate(&self) -> Result<(), CueSheetError> {
        if self.fps.is_finite() && self.fps > 0.0 {
            Ok(())
        } else {
            Err(CueSheetError::InvalidFps(self.fps))
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            fps: 60.0,
            realtime: false,
            until: None,
        }
    }
}

/// What an action does when it fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Log a message
    Log(String),
    /// Set one property of a target
    Set {
        /// Target name
        target: String,
        /// Property name
        property: String,
        /// New value
        value: f64,
    },
}

/// A scheduled action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCue {
    /// Time in seconds
    pub at: f64,
    /// Effect
    pub kind: ActionKind,
}

/// A scheduled tween. Omitted fields chain from the previous tween.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenCue {
    /// Start time in seconds
    #[serde(default)]
    pub at: Option<f64>,
    /// Duration in seconds
    pub duration: f64,
    /// Target names
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    /// Explicit start values
    #[serde(default)]
    pub from: Option<PropertyMap>,
    /// End values
    pub to: PropertyMap,
    /// Easing name
    #[serde(default)]
    pub easing: Option<String>,
    /// Log progress on every evaluated tick
    #[serde(default)]
    pub report: bool,
}

/// Extra easing curves declared by a cue sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CurveCue {
    /// Another name for an existing curve
    Alias(String),
    /// `k^exponent`
    Power(f64),
    /// Staircase with this many steps
    Steps(u32),
}

/// A complete cue sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueSheet {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Display name
    pub name: String,
    /// Playback settings
    #[serde(default)]
    pub settings: PlayerSettings,
    /// Named targets and their initial properties
    #[serde(default)]
    pub targets: IndexMap<String, PropertyBag>,
    /// Extra easing curves, by dotted name
    #[serde(default)]
    pub easings: IndexMap<String, CurveCue>,
    /// Actions
    #[serde(default)]
    pub actions: Vec<ActionCue>,
    /// Tweens
    #[serde(default)]
    pub tweens: Vec<TweenCue>,
}

fn default_version() -> u32 {
    CUE_SHEET_FORMAT_VERSION
}

/// A built director together with the targets it animates
pub struct Stage {
    /// The director
    pub director: Director,
    /// Targets by name, in declaration order
    pub targets: IndexMap<String, Rc<RefCell<PropertyBag>>>,
}

impl Stage {
    /// Current values of every target
    pub fn snapshot(&self) -> IndexMap<String, PropertyMap> {
        self.targets
            .iter()
            .map(|(name, bag)| (name.clone(), bag.borrow().values().clone()))
            .collect()
    }
}

impl CueSheet {
    /// Parse a cue sheet from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, CueSheetError> {
        let sheet: CueSheet = ron::from_str(text)?;

        if sheet.version > CUE_SHEET_FORMAT_VERSION {
            return Err(CueSheetError::UnsupportedVersion(sheet.version));
        }
        sheet.settings.validate()?;

        Ok(sheet)
    }

    /// Load a cue sheet from a file
    pub fn load(path: &Path) -> Result<Self, CueSheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Build a director driven by `clock`
    pub fn build(&self, clock: impl Clock + 'static) -> Result<Stage, CueSheetError> {
        let targets: IndexMap<String, Rc<RefCell<PropertyBag>>> = self
            .targets
            .iter()
            .map(|(name, bag)| (name.clone(), Rc::new(RefCell::new(bag.clone()))))
            .collect();

        let mut director = Director::with_clock(clock);
        director.set_fps(self.settings.fps);

        for (name, curve) in &self.easings {
            let easing = match curve {
                CurveCue::Alias(existing) => director.easing_table().resolve(existing)?,
                CurveCue::Power(exponent) => {
                    let exponent = *exponent;
                    Easing::custom(move |k| k.powf(exponent))
                }
                CurveCue::Steps(steps) => {
                    let steps = f64::from((*steps).max(1));
                    Easing::custom(move |k| (k * steps).floor() / steps)
                }
            };
            director.easing_table_mut().insert(name, easing);
        }

        for cue in &self.actions {
            match &cue.kind {
                ActionKind::Log(message) => {
                    let message = message.clone();
                    director.add_action(cue.at, move || tracing::info!("{message}"));
                }
                ActionKind::Set {
                    target,
                    property,
                    value,
                } => {
                    let bag = lookup(&targets, target)?;
                    let property = property.clone();
                    let value = *value;
                    director.add_action(cue.at, move || bag.borrow_mut().set(property.as_str(), value));
                }
            }
        }

        for cue in &self.tweens {
            director.add_tween(self.tween_spec(cue, &targets)?)?;
        }

        tracing::debug!(
            "Built `{}`: {} targets, {} actions, {} tweens",
            self.name,
            targets.len(),
            director.action_count(),
            director.tween_count()
        );

        Ok(Stage { director, targets })
    }

    fn tween_spec(
        &self,
        cue: &TweenCue,
        targets: &IndexMap<String, Rc<RefCell<PropertyBag>>>,
    ) -> Result<TweenSpec, CueSheetError> {
        let mut spec = TweenSpec::new(cue.duration, cue.to.clone());

        if let Some(at) = cue.at {
            spec = spec.at(at);
        }
        if let Some(names) = &cue.targets {
            let handles = names
                .iter()
                .map(|name| lookup(targets, name).map(|bag| -> TargetHandle { bag }))
                .collect::<Result<Vec<_>, _>>()?;
            spec = spec.targets(handles);
        }
        if let Some(from) = &cue.from {
            spec = spec.from(from.clone());
        }
        if let Some(easing) = &cue.easing {
            spec = spec.easing(easing.as_str());
        }
        if cue.report {
            let label = cue
                .targets
                .as_ref()
                .map_or_else(|| "(chained)".to_string(), |names| names.join(", "));
            spec = spec.on_update(move |k, _| tracing::debug!("Tween on {label}: k = {k:.3}"));
        }

        Ok(spec)
    }
}

fn lookup(
    targets: &IndexMap<String, Rc<RefCell<PropertyBag>>>,
    name: &str,
) -> Result<Rc<RefCell<PropertyBag>>, CueSheetError> {
    targets
        .get(name)
        .cloned()
        .ok_or_else(|| CueSheetError::UnknownTarget(name.to_string()))
}
