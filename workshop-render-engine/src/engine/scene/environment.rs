use bevy::prelude::*;
use constants::lighting::{
    AMBIENT_BRIGHTNESS_DARK, AMBIENT_BRIGHTNESS_LIGHT, ENVIRONMENT_PRESET_DARK,
    KEY_LIGHT_INTENSITY, KEY_LIGHT_POSITION, SUN_ILLUMINANCE_NIGHT, SUN_ILLUMINANCE_SUNSET,
};
use constants::render_settings::{CLEAR_COLOUR_DARK, CLEAR_COLOUR_LIGHT};

use crate::engine::theme::{ThemeChanged, ThemeMode};

/// Directional light standing in for the environment preset.
#[derive(Component)]
pub struct SunLight;

#[derive(Component)]
pub struct KeyLight;

/// Lighting that exists regardless of the loading state.
pub fn spawn_environment_lighting(mut commands: Commands) {
    commands.spawn((
        PointLight {
            intensity: KEY_LIGHT_INTENSITY,
            range: 80.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(KEY_LIGHT_POSITION),
        KeyLight,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: SUN_ILLUMINANCE_SUNSET,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
        SunLight,
    ));
}

pub fn ambient_brightness(mode: ThemeMode) -> f32 {
    match mode {
        ThemeMode::Dark => AMBIENT_BRIGHTNESS_DARK,
        ThemeMode::Light => AMBIENT_BRIGHTNESS_LIGHT,
    }
}

pub fn clear_colour(mode: ThemeMode) -> Color {
    match mode {
        ThemeMode::Dark => CLEAR_COLOUR_DARK,
        ThemeMode::Light => CLEAR_COLOUR_LIGHT,
    }
}

/// Sun strength for a preset key.
pub fn sun_illuminance(preset: &str) -> f32 {
    if preset == ENVIRONMENT_PRESET_DARK {
        SUN_ILLUMINANCE_NIGHT
    } else {
        SUN_ILLUMINANCE_SUNSET
    }
}

pub fn apply_theme_to_environment(
    mut changed: EventReader<ThemeChanged>,
    mut ambient: ResMut<AmbientLight>,
    mut clear: ResMut<ClearColor>,
    mut suns: Query<&mut DirectionalLight, With<SunLight>>,
) {
    let Some(event) = changed.read().last() else {
        return;
    };

    ambient.brightness = ambient_brightness(event.mode);
    clear.0 = clear_colour(event.mode);
    for mut sun in &mut suns {
        sun.illuminance = sun_illuminance(event.mode.environment_preset());
    }
}
