use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tokio::time::Instant;
use token_animator::{AnimatorError, EntityId, Move, Point, PositionSink};

/// Fixture index: kind → name → path relative to `fixtures/`.
static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    animations: BTreeMap<String, String>,
    libraries: BTreeMap<String, String>,
}

/// Raw text of the `kind` fixture registered as `name`.
fn fixture_text(entries: &BTreeMap<String, String>, kind: &str, name: &str) -> Result<String> {
    let rel = entries
        .get(name)
        .ok_or_else(|| anyhow!("no {kind} fixture named '{name}' in the manifest"))?;
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    fs::read_to_string(&path).with_context(|| format!("reading {kind} fixture {}", path.display()))
}

pub mod animations {
    use super::*;
    use token_animator::Animation;

    pub fn keys() -> Vec<String> {
        MANIFEST.animations.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<Animation> {
        let text = fixture_text(&MANIFEST.animations, "animation", name)?;
        serde_json::from_str(&text).with_context(|| format!("animation fixture '{name}'"))
    }
}

pub mod libraries {
    use super::*;
    use token_animator::AnimationLibrary;

    pub fn keys() -> Vec<String> {
        MANIFEST.libraries.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<AnimationLibrary> {
        let text = fixture_text(&MANIFEST.libraries, "library", name)?;
        AnimationLibrary::from_json(&text).map_err(|e| anyhow!("library fixture '{name}': {e}"))
    }
}

/// One position update observed by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub entity: EntityId,
    pub to: Point,
    pub mv: Move,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct SinkState {
    updates: Vec<Recorded>,
    positions: HashMap<EntityId, Point>,
    removed: HashSet<EntityId>,
}

/// In-memory host: records every update with a (tokio) timestamp and can
/// simulate entities disappearing from the scene.
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<SinkState>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn updates(&self) -> Vec<Recorded> {
        self.lock().updates.clone()
    }

    pub fn updates_for(&self, entity: &EntityId) -> Vec<Recorded> {
        self.lock()
            .updates
            .iter()
            .filter(|r| &r.entity == entity)
            .cloned()
            .collect()
    }

    pub fn count_for(&self, entity: &EntityId) -> usize {
        self.lock()
            .updates
            .iter()
            .filter(|r| &r.entity == entity)
            .count()
    }

    pub fn position(&self, entity: &EntityId) -> Option<Point> {
        self.lock().positions.get(entity).copied()
    }

    /// From now on the entity is unknown and every update for it fails.
    pub fn remove_entity(&self, entity: &EntityId) {
        let mut state = self.lock();
        state.removed.insert(entity.clone());
        state.positions.remove(entity);
    }
}

impl PositionSink for RecordingSink {
    fn contains(&self, entity: &EntityId) -> bool {
        !self.lock().removed.contains(entity)
    }

    fn update_position(&self, entity: &EntityId, to: Point, mv: Move) -> Result<(), AnimatorError> {
        let mut state = self.lock();
        if state.removed.contains(entity) {
            return Err(AnimatorError::EntityNotFound {
                entity: entity.clone(),
            });
        }
        state.positions.insert(entity.clone(), to);
        state.updates.push(Recorded {
            entity: entity.clone(),
            to,
            mv,
            at: Instant::now(),
        });
        Ok(())
    }
}
