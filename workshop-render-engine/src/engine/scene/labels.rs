use bevy::prelude::*;
use constants::layout::MACHINE_LABEL_HEIGHT;

use super::machine_node::SceneEntity;

const LABEL_WIDTH: f32 = 180.0;

/// Screen-space name tag tracking a point above a machine.
#[derive(Component, Debug, Clone, Copy)]
pub struct MachineLabel {
    pub machine_id: u32,
    pub anchor: Vec3,
}

pub fn spawn_machine_label(commands: &mut Commands, machine_id: u32, name: &str, position: Vec3) {
    commands.spawn((
        MachineLabel {
            machine_id,
            anchor: position + Vec3::Y * MACHINE_LABEL_HEIGHT,
        },
        Text::new(name),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Px(LABEL_WIDTH),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.45)),
        Visibility::Hidden,
        SceneEntity,
    ));
}

/// Project label anchors into the viewport. Labels behind the camera hide.
pub fn position_machine_labels(
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut labels: Query<(&MachineLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for (label, mut node, mut visibility) in &mut labels {
        match camera.world_to_viewport(camera_transform, label.anchor) {
            Ok(screen) => {
                node.left = Val::Px(screen.x - LABEL_WIDTH / 2.0);
                node.top = Val::Px(screen.y);
                visibility.set_if_neq(Visibility::Inherited);
            }
            Err(_) => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
