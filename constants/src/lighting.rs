use bevy::math::Vec3;

/// Interval between fixture blink toggles, in milliseconds.
pub const BLINK_INTERVAL_MS: u64 = 500;

/// Off to on transitions before a fixture settles.
pub const BLINK_CYCLES: u32 = 3;

/// Fixture intensity while lit during the blink sequence.
pub const FIXTURE_DIM_INTENSITY: f32 = 3.0;

/// Fixture intensity once settled.
pub const FIXTURE_BRIGHT_INTENSITY: f32 = 5.0;

/// Converts fixture intensity units to point light lumens.
pub const FIXTURE_LUMENS_PER_UNIT: f32 = 100_000.0;

/// Point light reach of a fixture.
pub const FIXTURE_RANGE: f32 = 50.0;

/// Bulb sphere radius.
pub const FIXTURE_BULB_RADIUS: f32 = 0.5;

/// Bulb emissive strength while blinking and otherwise.
pub const FIXTURE_EMISSIVE_BLINKING: f32 = 1.0;
pub const FIXTURE_EMISSIVE_IDLE: f32 = 0.5;

/// Amplitude (radians) of the fixture sway.
pub const FIXTURE_SWAY_AMPLITUDE: f32 = 0.1;

/// Fixture positions spread across the workshop.
pub const FIXTURE_POSITIONS: [Vec3; 6] = [
    Vec3::new(-20.0, 15.0, -15.0),
    Vec3::new(20.0, 15.0, -15.0),
    Vec3::new(-20.0, 15.0, 15.0),
    Vec3::new(20.0, 15.0, 15.0),
    Vec3::new(0.0, 15.0, -20.0),
    Vec3::new(0.0, 15.0, 20.0),
];

/// Ambient brightness per theme.
pub const AMBIENT_BRIGHTNESS_DARK: f32 = 220.0;
pub const AMBIENT_BRIGHTNESS_LIGHT: f32 = 50.0;

/// Key point light above the floor.
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const KEY_LIGHT_INTENSITY: f32 = 150_000.0;

/// Sun illuminance per environment preset.
pub const SUN_ILLUMINANCE_NIGHT: f32 = 400.0;
pub const SUN_ILLUMINANCE_SUNSET: f32 = 8_000.0;

/// Environment preset keys handed to the renderer and frontend.
pub const ENVIRONMENT_PRESET_DARK: &str = "night";
pub const ENVIRONMENT_PRESET_LIGHT: &str = "sunset";

/// Floor emissive lift once every fixture has settled.
pub const FLOOR_SETTLED_EMISSIVE: f32 = 0.15;
