//! In-memory store of recorded animations per entity.
//!
//! Mirrors what the host keeps on each token: an ordered list of named
//! animations. Used for play-by-name and folder-wide controls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::Animation;
use crate::error::AnimatorError;
use crate::grid::GridMetrics;
use crate::ids::EntityId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationLibrary {
    entries: BTreeMap<EntityId, Vec<Animation>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{ "<entity>": [ { name, points, speed, snap, folder }, ... ] }`.
    pub fn from_json(json: &str) -> Result<Self, AnimatorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, AnimatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }

    pub fn get(&self, entity: &EntityId) -> &[Animation] {
        self.entries.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the entity's full list. An empty list removes the entity.
    pub fn set(&mut self, entity: EntityId, animations: Vec<Animation>) {
        if animations.is_empty() {
            self.entries.remove(&entity);
        } else {
            self.entries.insert(entity, animations);
        }
    }

    pub fn push(&mut self, entity: EntityId, animation: Animation) {
        self.entries.entry(entity).or_default().push(animation);
    }

    /// First animation on `entity` called `name`.
    pub fn find(&self, entity: &EntityId, name: &str) -> Option<&Animation> {
        self.get(entity).iter().find(|a| a.name == name)
    }

    pub fn remove(&mut self, entity: &EntityId, name: &str) -> Option<Animation> {
        let list = self.entries.get_mut(entity)?;
        let idx = list.iter().position(|a| a.name == name)?;
        let removed = list.remove(idx);
        if list.is_empty() {
            self.entries.remove(entity);
        }
        Some(removed)
    }

    /// Toggle the snap flag; turning it on also snaps the stored points.
    /// Returns `false` when the animation does not exist.
    pub fn set_snap(&mut self, entity: &EntityId, name: &str, snap: bool, grid: &GridMetrics) -> bool {
        let Some(anim) = self
            .entries
            .get_mut(entity)
            .and_then(|list| list.iter_mut().find(|a| a.name == name))
        else {
            return false;
        };
        anim.snap = snap;
        *anim = anim.snapped(grid);
        true
    }

    /// Every animation grouped by trimmed folder name ("" for none).
    pub fn folders(&self) -> BTreeMap<String, Vec<(EntityId, Animation)>> {
        let mut groups: BTreeMap<String, Vec<(EntityId, Animation)>> = BTreeMap::new();
        for (entity, list) in &self.entries {
            for anim in list {
                groups
                    .entry(anim.folder_key().to_string())
                    .or_default()
                    .push((entity.clone(), anim.clone()));
            }
        }
        groups
    }

    /// Members of one folder; the name is trimmed before matching.
    pub fn folder(&self, folder: &str) -> Vec<(EntityId, Animation)> {
        let key = folder.trim();
        self.entries
            .iter()
            .flat_map(|(entity, list)| {
                list.iter()
                    .filter(move |a| a.folder_key() == key)
                    .map(move |a| (entity.clone(), a.clone()))
            })
            .collect()
    }
}
