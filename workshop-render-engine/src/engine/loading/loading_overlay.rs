use bevy::prelude::*;
use constants::render_settings::{
    PANEL_BACKGROUND_DARK, PANEL_BACKGROUND_LIGHT, PANEL_TEXT_DARK, PANEL_TEXT_LIGHT,
};

use super::progress::LoadingProgress;
use crate::engine::theme::{ThemeChanged, ThemeController, ThemeMode};
use crate::rpc::web_rpc::WebRpcInterface;

/// Full-screen placeholder shown while the scene is not composed.
#[derive(Component)]
pub struct LoadingOverlay;

#[derive(Component)]
pub struct LoadingText;

pub fn loading_label(percent: f32) -> String {
    format!("Loading... {percent:.0}%")
}

/// Background and text colour of the overlay.
pub fn overlay_colours(mode: ThemeMode) -> (Color, Color) {
    match mode {
        ThemeMode::Dark => (PANEL_BACKGROUND_DARK, PANEL_TEXT_DARK),
        ThemeMode::Light => (PANEL_BACKGROUND_LIGHT, PANEL_TEXT_LIGHT),
    }
}

pub fn spawn_loading_overlay(
    mut commands: Commands,
    controller: Option<Res<ThemeController>>,
    progress: Res<LoadingProgress>,
    existing: Query<(), With<LoadingOverlay>>,
) {
    if !existing.is_empty() {
        return;
    }

    let mode = controller.map_or(ThemeMode::Light, |c| c.mode());
    let (background, text) = overlay_colours(mode);
    let percent = if progress.catalog_loaded {
        progress.percent()
    } else {
        0.0
    };

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(background),
            GlobalZIndex(10),
            LoadingOverlay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(loading_label(percent)),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(text),
                LoadingText,
            ));
        });
}

/// Restyle an overlay that is already on screen when the theme flips.
pub fn apply_theme_to_loading_overlay(
    mut theme_events: EventReader<ThemeChanged>,
    mut overlays: Query<&mut BackgroundColor, With<LoadingOverlay>>,
    mut texts: Query<&mut TextColor, With<LoadingText>>,
) {
    let Some(event) = theme_events.read().last() else {
        return;
    };
    let (background, text) = overlay_colours(event.mode);

    for mut colour in &mut overlays {
        colour.0 = background;
    }
    for mut colour in &mut texts {
        colour.0 = text;
    }
}

/// Refresh the overlay text and tell the frontend when the percentage moves.
pub fn update_loading_frontend(
    progress: Res<LoadingProgress>,
    mut texts: Query<&mut Text, With<LoadingText>>,
    mut rpc: ResMut<WebRpcInterface>,
    mut last_reported: Local<Option<(u32, f32)>>,
) {
    if !progress.catalog_loaded {
        return;
    }

    let percent = progress.percent();
    let current = (progress.generation, percent);
    if *last_reported == Some(current) {
        return;
    }
    *last_reported = Some(current);

    for mut text in &mut texts {
        text.0 = loading_label(percent);
    }

    rpc.send_notification(
        "loading_progress",
        serde_json::json!({
            "generation": progress.generation,
            "percent": percent,
            "resolved": progress.resolved(),
            "failed": progress.failed(),
            "total": progress.total(),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rounds_to_whole_percent() {
        assert_eq!(loading_label(0.0), "Loading... 0%");
        assert_eq!(loading_label(100.0 / 3.0), "Loading... 33%");
        assert_eq!(loading_label(100.0), "Loading... 100%");
    }

    #[test]
    fn theme_change_restyles_visible_overlay() {
        let mut app = App::new();
        app.add_event::<ThemeChanged>()
            .add_systems(Update, apply_theme_to_loading_overlay);

        let (light_background, light_text) = overlay_colours(ThemeMode::Light);
        let overlay = app
            .world_mut()
            .spawn((BackgroundColor(light_background), LoadingOverlay))
            .id();
        let label = app
            .world_mut()
            .spawn((TextColor(light_text), LoadingText))
            .id();

        app.world_mut().send_event(ThemeChanged {
            mode: ThemeMode::Dark,
        });
        app.update();

        let (dark_background, dark_text) = overlay_colours(ThemeMode::Dark);
        assert_eq!(
            app.world().get::<BackgroundColor>(overlay).map(|c| c.0),
            Some(dark_background)
        );
        assert_eq!(
            app.world().get::<TextColor>(label).map(|c| c.0),
            Some(dark_text)
        );
    }
}
