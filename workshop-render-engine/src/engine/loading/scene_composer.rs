use bevy::prelude::*;

use super::catalog_loader::CatalogChanged;
use super::loading_overlay::LoadingOverlay;
use super::progress::LoadingProgress;
use super::texture_loader::{MachineTextures, PlaceholderTexture};
use crate::engine::assets::machine_catalog::ActiveCatalog;
use crate::engine::core::app_state::AppState;
use crate::engine::layout::GridLayout;
use crate::engine::lighting::fixtures::FloorIllumination;
use crate::engine::scene::floor::spawn_floor;
use crate::engine::scene::labels::spawn_machine_label;
use crate::engine::scene::machine_node::{
    SceneEntity, SceneMeshes, machine_material, spawn_machine_node,
};
use crate::engine::theme::{ThemeController, ThemeMode};
use crate::rpc::web_rpc::WebRpcInterface;

/// Whether everything the scene needs for `progress.generation` is in place.
pub fn ready_to_compose(
    progress: &LoadingProgress,
    textures: &MachineTextures,
    active: &ActiveCatalog,
    layout: &GridLayout,
) -> bool {
    progress.is_complete()
        && !progress.scene_composed
        && progress.generation == active.generation
        && textures.generation == active.generation
        && layout.len() == active.catalog.len()
}

/// Compose the whole scene in one pass once every texture has resolved.
///
/// Floor, machines and labels appear together with the overlay removal, so
/// a partially populated floor is never shown.
pub fn compose_scene_when_ready(
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
    active: Res<ActiveCatalog>,
    layout: Res<GridLayout>,
    textures: Res<MachineTextures>,
    placeholder: Option<Res<PlaceholderTexture>>,
    scene_meshes: Option<Res<SceneMeshes>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    controller: Option<Res<ThemeController>>,
    illumination: Res<FloorIllumination>,
    overlays: Query<Entity, With<LoadingOverlay>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if !ready_to_compose(&progress, &textures, &active, &layout) {
        return;
    }
    let (Some(placeholder), Some(scene_meshes)) = (placeholder, scene_meshes) else {
        return;
    };

    let mode = controller.map_or(ThemeMode::Light, |c| c.mode());
    spawn_floor(&mut commands, &mut meshes, &mut materials, mode, &illumination);

    for (index, machine) in active.catalog.machines.iter().enumerate() {
        let Some(position) = layout.position(index) else {
            warn!("No grid cell for machine {} at index {index}", machine.id);
            continue;
        };
        let texture = textures.texture_for(machine.id, &placeholder.0);
        let material = materials.add(machine_material(texture));

        spawn_machine_node(
            &mut commands,
            machine,
            index,
            position,
            scene_meshes.machine_box.clone(),
            material,
        );
        spawn_machine_label(&mut commands, machine.id, &machine.name, position);
    }

    for overlay in &overlays {
        commands.entity(overlay).despawn();
    }

    progress.scene_composed = true;
    next_state.set(AppState::Running);

    info!(
        "→ Scene composed: {} machines ({} textures failed), transitioning to Running",
        active.catalog.len(),
        progress.failed()
    );
    rpc.send_notification(
        "scene_ready",
        serde_json::json!({
            "generation": active.generation,
            "machine_count": active.catalog.len(),
            "failed_textures": progress.failed(),
        }),
    );
}

/// A catalog hot reload while running sends the app back through loading.
pub fn return_to_loading_on_catalog_change(
    mut changed: EventReader<CatalogChanged>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if let Some(event) = changed.read().last() {
        info!(
            "→ Catalog generation {} ({} machines), recomposing scene",
            event.generation, event.machine_count
        );
        next_state.set(AppState::Loading);
    }
}

/// Remove every entity belonging to the composed scene.
pub fn teardown_scene(mut commands: Commands, scene: Query<Entity, With<SceneEntity>>) {
    let mut removed = 0;
    for entity in &scene {
        commands.entity(entity).despawn();
        removed += 1;
    }
    debug!("Scene teardown removed {removed} entities");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::machine_catalog::{MachineCatalog, MachineRecord};
    use crate::engine::loading::progress::TextureStatus;

    fn catalog(ids: &[u32]) -> MachineCatalog {
        MachineCatalog {
            machines: ids
                .iter()
                .map(|id| MachineRecord {
                    id: *id,
                    name: format!("Machine {id}"),
                    ..default()
                })
                .collect(),
        }
    }

    fn loaded(ids: &[u32]) -> (LoadingProgress, MachineTextures, ActiveCatalog, GridLayout) {
        let mut active = ActiveCatalog::default();
        active.replace(catalog(ids));

        let mut progress = LoadingProgress::default();
        progress.begin(active.generation, ids.iter().copied());

        let textures = MachineTextures {
            generation: active.generation,
            entries: Vec::new(),
        };
        let mut layout = GridLayout::default();
        layout.ensure(ids.len(), 12.0);

        (progress, textures, active, layout)
    }

    #[test]
    fn waits_for_every_texture() {
        let (mut progress, textures, active, layout) = loaded(&[1, 2]);
        assert!(!ready_to_compose(&progress, &textures, &active, &layout));

        progress.resolve(1, TextureStatus::Ready);
        assert!(!ready_to_compose(&progress, &textures, &active, &layout));

        progress.resolve(2, TextureStatus::Failed);
        assert!(ready_to_compose(&progress, &textures, &active, &layout));
    }

    #[test]
    fn composes_once_per_generation() {
        let (mut progress, textures, active, layout) = loaded(&[]);
        assert!(ready_to_compose(&progress, &textures, &active, &layout));

        progress.scene_composed = true;
        assert!(!ready_to_compose(&progress, &textures, &active, &layout));
    }

    #[test]
    fn stale_textures_block_composition() {
        let (progress, mut textures, active, layout) = loaded(&[]);
        textures.generation = active.generation.wrapping_sub(1);
        assert!(!ready_to_compose(&progress, &textures, &active, &layout));
    }
}
