use bevy::prelude::*;
use constants::layout::{MACHINE_BOX_SIZE, MACHINE_WOBBLE_AMPLITUDE};

use crate::engine::assets::machine_catalog::MachineRecord;

/// Anything spawned as part of a composed scene. Removed as a whole when the
/// scene is torn down.
#[derive(Component)]
pub struct SceneEntity;

/// Root of one machine on the floor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineNode {
    pub machine_id: u32,
    pub index: usize,
}

/// Textured box under a `MachineNode`.
#[derive(Component)]
pub struct MachineBox;

#[derive(Resource, Clone)]
pub struct SceneMeshes {
    pub machine_box: Handle<Mesh>,
}

pub fn create_scene_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let machine_box = meshes.add(Cuboid::from_size(MACHINE_BOX_SIZE));
    commands.insert_resource(SceneMeshes { machine_box });
}

pub fn machine_material(texture: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(texture),
        perceptual_roughness: 0.5,
        metallic: 0.3,
        ..default()
    }
}

pub fn spawn_machine_node(
    commands: &mut Commands,
    record: &MachineRecord,
    index: usize,
    position: Vec3,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            MachineNode {
                machine_id: record.id,
                index,
            },
            Name::new(record.name.clone()),
            Transform::from_translation(position),
            Visibility::default(),
            SceneEntity,
        ))
        .with_children(|parent| {
            parent.spawn((Mesh3d(mesh), MeshMaterial3d(material), MachineBox));
        })
        .id()
}

/// Idle yaw wobble on every machine box.
pub fn wobble_machines(time: Res<Time>, mut boxes: Query<&mut Transform, With<MachineBox>>) {
    let yaw = time.elapsed_secs().sin() * MACHINE_WOBBLE_AMPLITUDE;
    for mut transform in &mut boxes {
        transform.rotation = Quat::from_rotation_y(yaw);
    }
}
