use bevy::prelude::*;
use constants::layout::{FLOOR_HEIGHT, FLOOR_SIZE};
use constants::lighting::FLOOR_SETTLED_EMISSIVE;
use constants::render_settings::{FIXTURE_COLOUR, FLOOR_COLOUR_DARK, FLOOR_COLOUR_LIGHT};

use super::machine_node::SceneEntity;
use crate::engine::lighting::fixtures::FloorIllumination;
use crate::engine::theme::{ThemeChanged, ThemeController, ThemeMode};

#[derive(Component)]
pub struct WorkshopFloor;

pub fn floor_colour(mode: ThemeMode) -> Color {
    match mode {
        ThemeMode::Dark => FLOOR_COLOUR_DARK,
        ThemeMode::Light => FLOOR_COLOUR_LIGHT,
    }
}

/// Warm glow picked up from the fixtures once they have all settled.
pub fn floor_emissive(mode: ThemeMode, illumination: &FloorIllumination) -> LinearRgba {
    if mode.is_dark() && illumination.lit {
        FIXTURE_COLOUR.to_linear() * FLOOR_SETTLED_EMISSIVE
    } else {
        LinearRgba::BLACK
    }
}

pub fn floor_material(mode: ThemeMode, illumination: &FloorIllumination) -> StandardMaterial {
    StandardMaterial {
        base_color: floor_colour(mode),
        emissive: floor_emissive(mode, illumination),
        perceptual_roughness: 0.5,
        metallic: 0.3,
        ..default()
    }
}

pub fn spawn_floor(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    mode: ThemeMode,
    illumination: &FloorIllumination,
) -> Entity {
    let (width, depth) = FLOOR_SIZE;
    commands
        .spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(width, depth))),
            MeshMaterial3d(materials.add(floor_material(mode, illumination))),
            Transform::from_xyz(0.0, FLOOR_HEIGHT, 0.0),
            WorkshopFloor,
            SceneEntity,
        ))
        .id()
}

/// Recolour the floor on theme changes and when the fixtures settle.
pub fn apply_theme_to_floor(
    mut changed: EventReader<ThemeChanged>,
    controller: Option<Res<ThemeController>>,
    illumination: Res<FloorIllumination>,
    floors: Query<&MeshMaterial3d<StandardMaterial>, With<WorkshopFloor>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let theme_changed = changed.read().count() > 0;
    if !theme_changed && !illumination.is_changed() {
        return;
    }
    let Some(controller) = controller else {
        return;
    };

    let mode = controller.mode();
    for handle in &floors {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = floor_colour(mode);
            material.emissive = floor_emissive(mode, &illumination);
        }
    }
}
