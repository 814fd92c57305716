use bevy::math::Vec3;

/// Distance between neighbouring machine cells, in world units.
pub const MACHINE_SPACING: f32 = 12.0;

/// Machine box dimensions (width, height, depth).
pub const MACHINE_BOX_SIZE: Vec3 = Vec3::new(5.0, 5.0, 6.0);

/// Height above the machine origin where its name label floats.
pub const MACHINE_LABEL_HEIGHT: f32 = 3.0;

/// Scale applied to a machine under the cursor.
pub const MACHINE_HOVER_SCALE: f32 = 1.05;

/// Amplitude (radians) of the idle yaw wobble on machine boxes.
pub const MACHINE_WOBBLE_AMPLITUDE: f32 = 0.05;

/// Floor plane size (x, z) and vertical offset.
pub const FLOOR_SIZE: (f32, f32) = (60.0, 40.0);
pub const FLOOR_HEIGHT: f32 = -2.0;
