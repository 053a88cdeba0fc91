//! Token Animator Core (host-agnostic)
//!
//! Plays recorded paths on tabletop tokens. An [`Animator`] keeps at most one
//! run per entity; each run is a [`PathWalker`] task that moves the entity in
//! short micro-steps through a host-provided [`PositionSink`], checking for
//! pause and stop before every step.
//!
//! ```no_run
//! use std::sync::Arc;
//! use token_animator::{Animation, Animator, Config, EntityId, Move, PathPoint, PlayOptions, Point, PositionSink};
//!
//! struct Canvas;
//! impl PositionSink for Canvas {
//!     fn update_position(&self, _e: &EntityId, _to: Point, _mv: Move) -> Result<(), token_animator::AnimatorError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let animator = Animator::new(Config::default(), Arc::new(Canvas));
//! let patrol = Animation::new("patrol", [PathPoint::new(0.0, 0.0), PathPoint::new(200.0, 0.0)]);
//! animator.play(&EntityId::from("goblin-1"), &patrol, PlayOptions::default()).await;
//! # }
//! ```

pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod events;
pub mod grid;
pub mod ids;
pub mod library;
pub mod registry;
pub mod signal;
pub mod sink;
pub mod walker;

// Re-exports for host adapters
pub use config::{Config, DEFAULT_SPEED};
pub use control::{BlockState, ControlBlock};
pub use data::{Animation, PathPoint, Point};
pub use error::AnimatorError;
pub use events::PlaybackEvent;
pub use grid::GridMetrics;
pub use ids::{EntityId, Generation};
pub use library::AnimationLibrary;
pub use registry::{Animator, PlayOptions};
pub use signal::Gate;
pub use sink::{Move, PositionSink};
pub use walker::{segment_targets, PathWalker, StepPlan, WalkOutcome};
