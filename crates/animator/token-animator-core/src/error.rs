//! Error types for the animator.
//!
//! Playback controls never surface these to their callers; they are returned by
//! validation helpers, the position sink and the animation library, and are
//! otherwise logged and swallowed by the registry.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimatorError {
    /// Animation has no path points
    #[error("Animation path is empty")]
    EmptyPath,

    /// Explicit speed is zero, negative or not finite
    #[error("Invalid speed: {speed}")]
    InvalidSpeed { speed: f64 },

    /// Entity is unknown to the host
    #[error("Entity not found: {entity}")]
    EntityNotFound { entity: EntityId },

    /// No stored animation with this name on the entity
    #[error("Animation '{name}' not found on entity {entity}")]
    AnimationNotFound { entity: EntityId, name: String },

    /// Host rejected a position update
    #[error("Position update failed for {entity}: {reason}")]
    PositionUpdate { entity: EntityId, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimatorError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyPath | Self::InvalidSpeed { .. } => "validation",
            Self::EntityNotFound { .. } | Self::PositionUpdate { .. } => "host",
            Self::AnimationNotFound { .. } => "library",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
