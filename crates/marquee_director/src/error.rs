// SPDX-License-Identifier: MIT OR Apache-2.0
//! Director errors.

/// Error raised while authoring a timeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectorError {
    /// A segment of a dotted easing name was not found in the easing table
    #[error("Easing `{name}` not found (missing segment `{segment}`)")]
    UnknownEasing {
        /// Full name that was looked up
        name: String,
        /// First segment that could not be resolved
        segment: String,
    },

    /// The easing name resolved to a group instead of a curve
    #[error("Easing `{0}` names a group, not a curve")]
    NotACurve(String),
}

/// Result type for director operations
pub type Result<T> = std::result::Result<T, DirectorError>;
