use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::render_settings::{
    CAMERA_START_POSITION, ORBIT_MAX_ELEVATION, ORBIT_MAX_RADIUS, ORBIT_MIN_ELEVATION,
    ORBIT_MIN_RADIUS, ORBIT_PAN_SENSITIVITY, ORBIT_ROTATE_SENSITIVITY, ORBIT_ZOOM_SENSITIVITY,
};

/// Orbit state around a focus point.
///
/// `elevation` is the angle of the eye above the focus plane. It is clamped
/// to `[0, π/2]` after every change, so the camera never dips below the floor.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub elevation: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(CAMERA_START_POSITION, Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Orbit that places the eye at `eye` while looking at `focus`.
    pub fn looking_from(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let horizontal = Vec2::new(offset.x, offset.z).length();
        let mut orbit = Self {
            focus,
            radius: offset.length(),
            yaw: offset.x.atan2(offset.z),
            elevation: offset.y.atan2(horizontal),
        };
        orbit.clamp();
        orbit
    }

    fn clamp(&mut self) {
        self.elevation = self
            .elevation
            .clamp(ORBIT_MIN_ELEVATION, ORBIT_MAX_ELEVATION);
        self.radius = self.radius.clamp(ORBIT_MIN_RADIUS, ORBIT_MAX_RADIUS);
    }

    /// Orientation of the eye. Built from angles so it stays well defined
    /// when looking straight down.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.elevation, 0.0)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.focus + self.rotation() * Vec3::Z * self.radius
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye_position()).with_rotation(self.rotation())
    }

    /// Drag delta in pixels. Moving the mouse up raises the eye.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_ROTATE_SENSITIVITY;
        self.elevation += delta.y * ORBIT_ROTATE_SENSITIVITY;
        self.clamp();
    }

    /// Positive `amount` moves the eye closer.
    pub fn zoom(&mut self, amount: f32) {
        self.radius *= 1.0 - amount * ORBIT_ZOOM_SENSITIVITY;
        self.clamp();
    }

    /// Slide the focus across the floor plane, scaled by distance.
    pub fn pan(&mut self, delta: Vec2) {
        let yaw = Quat::from_rotation_y(self.yaw);
        let right = yaw * Vec3::X;
        let forward = yaw * Vec3::NEG_Z;
        let scale = self.radius * ORBIT_PAN_SENSITIVITY;
        self.focus += (-right * delta.x + forward * delta.y) * scale;
    }
}

/// Left drag rotates, right drag pans, the wheel zooms.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    if mouse_delta != Vec2::ZERO {
        if mouse_button.pressed(MouseButton::Left) {
            orbit.rotate(mouse_delta);
        } else if mouse_button.pressed(MouseButton::Right) {
            orbit.pan(mouse_delta);
        }
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        orbit.zoom(scroll_accum);
    }

    if !orbit.is_changed() {
        return;
    }

    if let Ok(mut camera_transform) = camera_query.single_mut() {
        *camera_transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn default_orbit_reproduces_start_position() {
        let orbit = OrbitCamera::default();
        assert!(orbit.eye_position().distance(CAMERA_START_POSITION) < EPS);
        assert!(orbit.elevation > 0.0 && orbit.elevation < ORBIT_MAX_ELEVATION);
    }

    #[test]
    fn elevation_is_clamped_to_quarter_turn() {
        let mut orbit = OrbitCamera::default();

        orbit.rotate(Vec2::new(0.0, 100_000.0));
        assert_eq!(orbit.elevation, ORBIT_MAX_ELEVATION);

        orbit.rotate(Vec2::new(0.0, -100_000.0));
        assert_eq!(orbit.elevation, ORBIT_MIN_ELEVATION);
    }

    #[test]
    fn eye_never_goes_below_focus() {
        let mut orbit = OrbitCamera::default();
        for step in 0..200 {
            let delta = Vec2::new(step as f32 * 7.0, if step % 2 == 0 { -900.0 } else { 450.0 });
            orbit.rotate(delta);
            assert!(orbit.eye_position().y >= orbit.focus.y - EPS);
        }
    }

    #[test]
    fn straight_down_view_is_well_defined() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(Vec2::new(0.0, 100_000.0));

        let transform = orbit.transform();
        assert!(transform.rotation.is_finite());
        assert!((transform.forward().y + 1.0).abs() < EPS);
    }

    #[test]
    fn camera_looks_at_focus() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(8.0, 6.0, -12.0), Vec3::new(2.0, 0.0, 1.0));
        orbit.rotate(Vec2::new(40.0, -10.0));

        let transform = orbit.transform();
        let to_focus = (orbit.focus - transform.translation).normalize();
        assert!(transform.forward().dot(to_focus) > 1.0 - EPS);
    }

    #[test]
    fn zoom_respects_radius_limits() {
        let mut orbit = OrbitCamera::default();
        for _ in 0..100 {
            orbit.zoom(5.0);
        }
        assert_eq!(orbit.radius, ORBIT_MIN_RADIUS);

        for _ in 0..100 {
            orbit.zoom(-5.0);
        }
        assert_eq!(orbit.radius, ORBIT_MAX_RADIUS);
    }

    #[test]
    fn pan_keeps_focus_on_its_plane() {
        let mut orbit = OrbitCamera::default();
        orbit.pan(Vec2::new(120.0, -45.0));
        assert_eq!(orbit.focus.y, 0.0);
        assert!(orbit.focus.length() > 0.0);
    }
}
