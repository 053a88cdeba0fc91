//! Per-entity control block shared between the registry and one walker.
//!
//! The registry is the only party that creates, replaces or removes blocks.
//! The walker holds an `Arc<ControlBlock>` and only reads it.

use std::sync::{Mutex, MutexGuard};

use crate::data::Point;
use crate::ids::{EntityId, Generation};
use crate::signal::Gate;

/// Flags read by the walker on every micro-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockState {
    pub generation: Generation,
    pub paused: bool,
    pub stopped: bool,
}

impl BlockState {
    #[inline]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation && !self.stopped
    }
}

#[derive(Debug)]
pub struct ControlBlock {
    entity: EntityId,
    home: Option<Point>,
    state: Mutex<BlockState>,
    /// Armed while paused; released on resume or stop.
    pause_gate: Gate,
    /// Released once, on stop.
    stop_gate: Gate,
    /// Released once the walker bound to this block has returned.
    finished: Gate,
}

impl ControlBlock {
    pub fn new(entity: EntityId, generation: Generation, home: Option<Point>) -> Self {
        Self {
            entity,
            home,
            state: Mutex::new(BlockState {
                generation,
                paused: false,
                stopped: false,
            }),
            pause_gate: Gate::released(),
            stop_gate: Gate::armed(),
            finished: Gate::armed(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BlockState> {
        // Flags are plain data, so a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn home(&self) -> Option<Point> {
        self.home
    }

    pub fn snapshot(&self) -> BlockState {
        *self.lock()
    }

    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.lock().is_current(generation)
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Returns `true` when the block transitioned into the paused state.
    pub fn pause(&self) -> bool {
        let mut state = self.lock();
        if state.stopped || state.paused {
            return false;
        }
        state.paused = true;
        self.pause_gate.arm();
        true
    }

    /// Returns `true` when a paused block was released.
    pub fn resume(&self) -> bool {
        let mut state = self.lock();
        if state.stopped || !state.paused {
            return false;
        }
        state.paused = false;
        self.pause_gate.release();
        true
    }

    /// Mark the block stopped under a token no walker holds, and wake any
    /// waiting walker. Returns `false` if it was already stopped.
    pub fn stop(&self, retired: Generation) -> bool {
        let mut state = self.lock();
        let first = !state.stopped;
        state.stopped = true;
        state.generation = retired;
        self.pause_gate.release();
        self.stop_gate.release();
        first
    }

    /// Resolve once a pause is lifted or the block is stopped.
    pub async fn wait_unpaused(&self) {
        tokio::select! {
            _ = self.pause_gate.wait() => {}
            _ = self.stop_gate.wait() => {}
        }
    }

    /// Sleep for `duration` unless the block is stopped first.
    /// Returns `false` when the sleep was cut short by a stop.
    pub async fn sleep_or_stop(&self, duration: std::time::Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.stop_gate.wait() => false,
        }
    }

    pub fn mark_finished(&self) {
        self.finished.release();
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_released()
    }

    /// Resolve once the walker bound to this block has returned.
    pub async fn finished(&self) {
        self.finished.wait().await
    }
}
