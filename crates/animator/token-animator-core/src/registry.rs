//! Animator: owns the entity → control block registry and the walker tasks.
//!
//! Public controls:
//! - play, pause, resume, stop, is_playing
//! - play_by_name and folder-wide controls over an [`AnimationLibrary`]
//!
//! None of the playback controls fail from the caller's point of view; invalid
//! input and host faults are logged and treated as no-ops or run endings.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::control::ControlBlock;
use crate::data::Animation;
use crate::error::AnimatorError;
use crate::events::PlaybackEvent;
use crate::grid::GridMetrics;
use crate::ids::{EntityId, GenerationAllocator};
use crate::library::AnimationLibrary;
use crate::sink::{Move, PositionSink};
use crate::walker::{PathWalker, StepPlan, WalkOutcome};

/// Per-call playback options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayOptions {
    /// Overrides the animation's own speed (grid units per second).
    #[serde(default)]
    pub speed: Option<f64>,
}

impl PlayOptions {
    pub fn with_speed(speed: f64) -> Self {
        Self { speed: Some(speed) }
    }
}

struct Inner {
    config: Config,
    sink: Arc<dyn PositionSink>,
    generations: GenerationAllocator,
    blocks: Mutex<HashMap<EntityId, Arc<ControlBlock>>>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl Inner {
    fn lock_blocks(&self) -> MutexGuard<'_, HashMap<EntityId, Arc<ControlBlock>>> {
        // The map is only ever mutated by single insert/remove calls, so it stays consistent.
        self.blocks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn block(&self, entity: &EntityId) -> Option<Arc<ControlBlock>> {
        self.lock_blocks().get(entity).cloned()
    }

    /// Remove `block` only if it is still the registered block for its entity.
    fn remove_if_current(&self, block: &Arc<ControlBlock>) -> bool {
        let mut blocks = self.lock_blocks();
        match blocks.get(block.entity()) {
            Some(current) if Arc::ptr_eq(current, block) => {
                blocks.remove(block.entity());
                true
            }
            _ => false,
        }
    }

    /// Snap a torn-down run's entity back to its first point, unless another
    /// run has since been registered for it. Best effort.
    fn reset_home(&self, block: &ControlBlock) {
        let entity = block.entity();
        match block.home() {
            Some(home) if !self.lock_blocks().contains_key(entity) => {
                if let Err(err) = self.sink.update_position(entity, home, Move::instant()) {
                    debug!(%entity, error = %err, "home reset failed");
                }
            }
            Some(_) => debug!(%entity, "home reset skipped: a newer run took over"),
            None => {}
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Releases the block's `finished` gate however the walker task ends,
/// including when the task is dropped before it is first polled.
struct FinishGuard(Arc<ControlBlock>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

/// Playback controller. Cheap to clone; clones share one registry.
#[derive(Clone)]
pub struct Animator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("config", &self.inner.config)
            .field("playing", &self.inner.lock_blocks().len())
            .finish()
    }
}

impl Animator {
    pub fn new(config: Config, sink: Arc<dyn PositionSink>) -> Self {
        let config = config.validated();
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            inner: Arc::new(Inner {
                config,
                sink,
                generations: GenerationAllocator::new(),
                blocks: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn grid(&self) -> GridMetrics {
        self.inner.config.grid()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    /// Play `animation` on `entity` and resolve when the run completes, is
    /// stopped, or is superseded.
    ///
    /// If the entity's current run is paused this resumes it instead and
    /// returns immediately. Otherwise any current run is stopped, awaited and
    /// reset to its home point before the new one starts. An unusable stored
    /// speed falls back to the override or the configured default.
    pub async fn play(&self, entity: &EntityId, animation: &Animation, options: PlayOptions) {
        let inner = &self.inner;
        if !inner.sink.contains(entity) {
            debug!(%entity, "play ignored: entity not found");
            return;
        }
        // A bad stored speed falls back through `effective_speed`; only an empty path is fatal.
        if animation.points.is_empty() {
            debug!(%entity, animation = %animation.name, error = %AnimatorError::EmptyPath, "play ignored");
            return;
        }
        if inner
            .block(entity)
            .is_some_and(|b| b.is_paused() && !b.is_stopped())
        {
            self.resume(entity);
            return;
        }

        let path = animation.resolved_points();
        if path.len() < 2 {
            debug!(%entity, animation = %animation.name, "single-point path, nothing to walk");
            return;
        }

        let block = loop {
            let previous = {
                let mut blocks = inner.lock_blocks();
                match blocks.entry(entity.clone()) {
                    // Stays registered until its walker exits, so racing plays wait on it too.
                    Entry::Occupied(slot) => Arc::clone(slot.get()),
                    Entry::Vacant(slot) => {
                        let block = Arc::new(ControlBlock::new(
                            entity.clone(),
                            inner.generations.alloc(),
                            animation.home(),
                        ));
                        slot.insert(Arc::clone(&block));
                        break block;
                    }
                }
            };
            let superseded = previous.generation();
            if previous.stop(inner.generations.alloc()) {
                debug!(%entity, generation = %superseded, "superseding current run");
                inner.emit(PlaybackEvent::Superseded {
                    entity: entity.clone(),
                    generation: superseded,
                });
            }
            previous.finished().await;
            inner.remove_if_current(&previous);
            inner.reset_home(&previous);
        };

        let generation = block.generation();
        let speed = animation.effective_speed(options.speed, inner.config.default_speed);
        let walker = PathWalker::new(Arc::clone(&inner.sink), StepPlan::new(&inner.config, speed));
        debug!(
            %entity,
            %generation,
            animation = %animation.name,
            speed,
            points = path.len(),
            step_ms = walker.plan().step_duration.as_millis() as u64,
            "starting run"
        );
        inner.emit(PlaybackEvent::Started {
            entity: entity.clone(),
            generation,
            animation: animation.name.clone(),
        });

        let guard = FinishGuard(Arc::clone(&block));
        let task_inner = Arc::clone(inner);
        let task = tokio::spawn(async move {
            let guard = guard;
            let block = &guard.0;
            let outcome = walker.run(block, generation, &path).await;
            task_inner.remove_if_current(block);
            let entity = block.entity().clone();
            match outcome {
                WalkOutcome::Completed => task_inner.emit(PlaybackEvent::Completed { entity, generation }),
                WalkOutcome::EntityLost => task_inner.emit(PlaybackEvent::EntityLost { entity, generation }),
                WalkOutcome::Aborted => {}
            }
            outcome
        });

        match task.await {
            Ok(outcome) => debug!(%entity, %generation, ?outcome, "run ended"),
            Err(err) => warn!(%entity, %generation, error = %err, "walker task failed"),
        }
    }

    /// Play a stored animation by name. Fails only when the name is unknown.
    pub async fn play_by_name(
        &self,
        library: &AnimationLibrary,
        entity: &EntityId,
        name: &str,
        options: PlayOptions,
    ) -> Result<(), AnimatorError> {
        let animation = library
            .find(entity, name)
            .cloned()
            .ok_or_else(|| AnimatorError::AnimationNotFound {
                entity: entity.clone(),
                name: name.to_string(),
            })?;
        self.play(entity, &animation, options).await;
        Ok(())
    }

    pub fn pause(&self, entity: &EntityId) {
        if let Some(block) = self.inner.block(entity) {
            if block.pause() {
                debug!(%entity, "paused");
                self.inner.emit(PlaybackEvent::Paused {
                    entity: entity.clone(),
                });
            }
        }
    }

    pub fn resume(&self, entity: &EntityId) {
        if let Some(block) = self.inner.block(entity) {
            if block.resume() {
                debug!(%entity, "resumed");
                self.inner.emit(PlaybackEvent::Resumed {
                    entity: entity.clone(),
                });
            }
        }
    }

    /// Stop the entity's run, wait for its walker to exit, then snap the
    /// entity back to the path's first point.
    ///
    /// The reset is skipped when the path has no home point or when a newer
    /// run was installed while the stopped walker was winding down.
    pub async fn stop(&self, entity: &EntityId) {
        let inner = &self.inner;
        let Some(block) = inner.block(entity) else {
            return;
        };
        let generation = block.generation();
        block.stop(inner.generations.alloc());
        block.finished().await;
        inner.remove_if_current(&block);
        inner.reset_home(&block);
        debug!(%entity, %generation, "stopped");
        inner.emit(PlaybackEvent::Stopped {
            entity: entity.clone(),
        });
    }

    pub fn is_playing(&self, entity: &EntityId) -> bool {
        self.inner.lock_blocks().contains_key(entity)
    }

    pub fn is_paused(&self, entity: &EntityId) -> bool {
        self.inner.block(entity).is_some_and(|b| b.is_paused())
    }

    pub fn playing_entities(&self) -> Vec<EntityId> {
        self.inner.lock_blocks().keys().cloned().collect()
    }

    /// Stop every run concurrently.
    pub async fn stop_all(&self) {
        let entities = self.playing_entities();
        join_all(entities.iter().map(|entity| self.stop(entity))).await;
    }

    /// Stop every run. The animator stays usable afterwards.
    pub async fn shutdown(&self) {
        self.stop_all().await;
        debug!("animator shut down");
    }

    /// Start every animation of `folder` as its own detached run.
    pub fn play_folder(&self, library: &AnimationLibrary, folder: &str) -> Vec<JoinHandle<()>> {
        library
            .folder(folder)
            .into_iter()
            .map(|(entity, animation)| {
                let this = self.clone();
                let options = PlayOptions {
                    speed: animation.speed,
                };
                tokio::spawn(async move { this.play(&entity, &animation, options).await })
            })
            .collect()
    }

    pub fn pause_folder(&self, library: &AnimationLibrary, folder: &str) {
        for (entity, _) in library.folder(folder) {
            self.pause(&entity);
        }
    }

    pub fn resume_folder(&self, library: &AnimationLibrary, folder: &str) {
        for (entity, _) in library.folder(folder) {
            self.resume(&entity);
        }
    }

    pub async fn stop_folder(&self, library: &AnimationLibrary, folder: &str) {
        let members = library.folder(folder);
        join_all(members.iter().map(|(entity, _)| self.stop(entity))).await;
    }
}
