//! Host collaborator that owns entity positions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::Point;
use crate::error::AnimatorError;
use crate::ids::EntityId;

/// How a position update should be presented by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub animate: bool,
    pub duration: Duration,
}

impl Move {
    pub fn animated(duration: Duration) -> Self {
        Self {
            animate: true,
            duration,
        }
    }

    pub fn instant() -> Self {
        Self {
            animate: false,
            duration: Duration::ZERO,
        }
    }
}

/// Resolves entities and applies position updates on the host.
///
/// Implementations must return an error (not panic) when the entity is gone;
/// the walker treats any error as the end of the run.
pub trait PositionSink: Send + Sync {
    /// Whether the entity currently exists on the host.
    fn contains(&self, _entity: &EntityId) -> bool {
        true
    }

    fn update_position(&self, entity: &EntityId, to: Point, mv: Move) -> Result<(), AnimatorError>;
}
