//! Playback lifecycle signals published by the animator.
//!
//! Events are informational; playback never depends on anyone listening.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, Generation};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlaybackEvent {
    Started {
        entity: EntityId,
        generation: Generation,
        animation: String,
    },
    Paused {
        entity: EntityId,
    },
    Resumed {
        entity: EntityId,
    },
    /// Stopped by the caller and rewound to the home point.
    Stopped {
        entity: EntityId,
    },
    /// The run reached the end of its path.
    Completed {
        entity: EntityId,
        generation: Generation,
    },
    /// A newer `play` replaced this run.
    Superseded {
        entity: EntityId,
        generation: Generation,
    },
    /// The host rejected a position update mid-run.
    EntityLost {
        entity: EntityId,
        generation: Generation,
    },
}

impl PlaybackEvent {
    pub fn entity(&self) -> &EntityId {
        match self {
            Self::Started { entity, .. }
            | Self::Paused { entity }
            | Self::Resumed { entity }
            | Self::Stopped { entity }
            | Self::Completed { entity, .. }
            | Self::Superseded { entity, .. }
            | Self::EntityLost { entity, .. } => entity,
        }
    }
}
