use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::layout::{MACHINE_BOX_SIZE, MACHINE_HOVER_SCALE};
use constants::render_settings::CLICK_DRAG_THRESHOLD;

use super::selection::{SelectionRequest, SelectionSource};
use crate::engine::scene::machine_node::MachineNode;

/// Machine currently under the cursor.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HoveredMachine(pub Option<u32>);

/// Cursor position at the last left press, used to tell clicks from drags.
#[derive(Resource, Debug, Default)]
pub struct PointerPress {
    origin: Option<Vec2>,
}

/// Distance along the ray to the box, or `None` on a miss.
pub fn ray_hits_obb(origin: Vec3, dir: Vec3, xf: &GlobalTransform, size: Vec3) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    ray_aabb_hit_t(o_local, d_local, -he, he)
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = ray_origin[axis];
        let d = ray_direction[axis];
        if d.abs() < f32::EPSILON {
            // Parallel to this slab: miss unless already inside it.
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let mut t0 = (min[axis] - o) / d;
        let mut t1 = (max[axis] - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}

/// Nearest machine hit by `ray`.
pub fn pick_machine<'a>(
    ray: Ray3d,
    machines: impl IntoIterator<Item = (&'a MachineNode, &'a GlobalTransform)>,
) -> Option<u32> {
    machines
        .into_iter()
        .filter_map(|(node, xf)| {
            ray_hits_obb(ray.origin, *ray.direction, xf, MACHINE_BOX_SIZE)
                .map(|t| (node.machine_id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera3d>>,
) -> Option<(Vec2, Ray3d)> {
    let cursor = windows.single().ok()?.cursor_position()?;
    let (camera, camera_transform) = cameras.single().ok()?;
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    Some((cursor, ray))
}

/// Hover tracking, and selection on a left click that did not turn into a drag.
pub fn pick_machines(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    machines: Query<(&MachineNode, &GlobalTransform)>,
    ui_interactions: Query<&Interaction>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut press: ResMut<PointerPress>,
    mut hovered: ResMut<HoveredMachine>,
    mut requests: EventWriter<SelectionRequest>,
) {
    let over_ui = ui_interactions.iter().any(|i| *i != Interaction::None);
    let Some((cursor, ray)) = cursor_ray(&windows, &cameras) else {
        hovered.set_if_neq(HoveredMachine(None));
        return;
    };

    let hit = if over_ui {
        None
    } else {
        pick_machine(ray, machines.iter())
    };
    hovered.set_if_neq(HoveredMachine(hit));

    if mouse_button.just_pressed(MouseButton::Left) {
        press.origin = (!over_ui).then_some(cursor);
    }

    if mouse_button.just_released(MouseButton::Left) {
        let Some(origin) = press.origin.take() else {
            return;
        };
        if origin.distance(cursor) > CLICK_DRAG_THRESHOLD {
            return;
        }
        if let Some(machine_id) = hit {
            requests.write(SelectionRequest::select(machine_id, SelectionSource::Pointer));
        }
    }
}

pub fn apply_hover_scale(
    hovered: Res<HoveredMachine>,
    mut machines: Query<(&MachineNode, &mut Transform)>,
) {
    if !hovered.is_changed() {
        return;
    }
    for (node, mut transform) in &mut machines {
        let scale = if hovered.0 == Some(node.machine_id) {
            MACHINE_HOVER_SCALE
        } else {
            1.0
        };
        transform.scale = Vec3::splat(scale);
    }
}
