use bevy::prelude::*;
use serde::Serialize;

/// Resolution state of one machine texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureStatus {
    Pending,
    Ready,
    /// Load failed; the placeholder texture is used.
    Failed,
    /// No image in the catalog entry; the placeholder texture is used.
    Missing,
}

impl TextureStatus {
    pub fn is_resolved(self) -> bool {
        self != Self::Pending
    }
}

/// Loading progress for the active catalog generation.
///
/// Progress is derived from the explicit pending count: the scene may only be
/// composed once every tracked texture has resolved, successfully or not.
#[derive(Resource, Debug, Clone, Default)]
pub struct LoadingProgress {
    pub catalog_loaded: bool,
    pub generation: u32,
    pub scene_composed: bool,
    textures: Vec<(u32, TextureStatus)>,
}

impl LoadingProgress {
    /// Start tracking a new catalog generation. Previous entries are dropped.
    pub fn begin(&mut self, generation: u32, machine_ids: impl IntoIterator<Item = u32>) {
        self.catalog_loaded = true;
        self.generation = generation;
        self.scene_composed = false;
        self.textures = machine_ids
            .into_iter()
            .map(|id| (id, TextureStatus::Pending))
            .collect();
    }

    /// Record the outcome for `machine_id`. Returns whether anything changed.
    /// Late results for unknown or already resolved machines are ignored.
    pub fn resolve(&mut self, machine_id: u32, status: TextureStatus) -> bool {
        if !status.is_resolved() {
            return false;
        }
        match self
            .textures
            .iter_mut()
            .find(|(id, current)| *id == machine_id && !current.is_resolved())
        {
            Some((_, current)) => {
                *current = status;
                true
            }
            None => false,
        }
    }

    pub fn status(&self, machine_id: u32) -> Option<TextureStatus> {
        self.textures
            .iter()
            .find(|(id, _)| *id == machine_id)
            .map(|(_, status)| *status)
    }

    pub fn total(&self) -> usize {
        self.textures.len()
    }

    pub fn resolved(&self) -> usize {
        self.textures
            .iter()
            .filter(|(_, status)| status.is_resolved())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.textures
            .iter()
            .filter(|(_, status)| *status == TextureStatus::Failed)
            .count()
    }

    pub fn pending(&self) -> usize {
        self.total() - self.resolved()
    }

    /// Resolved share in `[0, 100]`. An empty catalog counts as complete.
    pub fn percent(&self) -> f32 {
        if self.textures.is_empty() {
            return 100.0;
        }
        self.resolved() as f32 / self.total() as f32 * 100.0
    }

    /// Catalog known and nothing pending.
    pub fn is_complete(&self) -> bool {
        self.catalog_loaded && self.pending() == 0
    }

    /// Per-machine states for the frontend.
    pub fn texture_states(&self) -> &[(u32, TextureStatus)] {
        &self.textures
    }
}
