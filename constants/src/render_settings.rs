use bevy::color::Color;
use bevy::math::Vec3;

/// Initial camera position, looking at the origin.
pub const CAMERA_START_POSITION: Vec3 = Vec3::new(0.0, 15.0, 25.0);

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 35.0;

/// Orbit elevation limits above the horizontal, in radians.
/// Zero keeps the camera on or above the floor plane.
pub const ORBIT_MIN_ELEVATION: f32 = 0.0;
pub const ORBIT_MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2;

/// Orbit distance limits.
pub const ORBIT_MIN_RADIUS: f32 = 5.0;
pub const ORBIT_MAX_RADIUS: f32 = 120.0;

/// Input sensitivities.
pub const ORBIT_ROTATE_SENSITIVITY: f32 = 0.005;
pub const ORBIT_PAN_SENSITIVITY: f32 = 0.002;
pub const ORBIT_ZOOM_SENSITIVITY: f32 = 0.1;

/// Cursor travel (pixels) below which a press and release counts as a click.
pub const CLICK_DRAG_THRESHOLD: f32 = 4.0;

/// Theme palette.
pub const FLOOR_COLOUR_DARK: Color = Color::srgb(0.122, 0.161, 0.216);
pub const FLOOR_COLOUR_LIGHT: Color = Color::srgb(0.953, 0.957, 0.965);
pub const CLEAR_COLOUR_DARK: Color = Color::srgb(0.02, 0.02, 0.04);
pub const CLEAR_COLOUR_LIGHT: Color = Color::srgb(0.98, 0.93, 0.86);
pub const FIXTURE_COLOUR: Color = Color::srgb(1.0, 0.843, 0.0);
pub const PLACEHOLDER_TEXTURE_RGBA: [u8; 4] = [128, 128, 128, 255];

/// Overlay panel palette.
pub const PANEL_BACKGROUND_DARK: Color = Color::srgba(0.12, 0.16, 0.22, 0.95);
pub const PANEL_BACKGROUND_LIGHT: Color = Color::srgba(1.0, 1.0, 1.0, 0.95);
pub const PANEL_TEXT_DARK: Color = Color::srgb(0.95, 0.95, 0.97);
pub const PANEL_TEXT_LIGHT: Color = Color::srgb(0.07, 0.09, 0.15);
pub const PANEL_ACCENT: Color = Color::srgb(0.23, 0.51, 0.96);
