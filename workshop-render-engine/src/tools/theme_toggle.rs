use bevy::prelude::*;
use constants::render_settings::{
    PANEL_BACKGROUND_DARK, PANEL_BACKGROUND_LIGHT, PANEL_TEXT_DARK, PANEL_TEXT_LIGHT,
};

use crate::engine::theme::{
    ThemeChanged, ThemeController, ThemeMode, ThemeToggleRequest, ThemeToggleSource,
};

#[derive(Component)]
pub struct ThemeToggleButton;

#[derive(Component)]
pub struct ThemeToggleLabel;

/// Button text offers the mode a press switches to.
pub fn toggle_label(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Dark => "Light mode",
        ThemeMode::Light => "Dark mode",
    }
}

fn button_colours(mode: ThemeMode) -> (Color, Color) {
    match mode {
        ThemeMode::Dark => (PANEL_BACKGROUND_DARK, PANEL_TEXT_DARK),
        ThemeMode::Light => (PANEL_BACKGROUND_LIGHT, PANEL_TEXT_LIGHT),
    }
}

pub fn spawn_theme_toggle(mut commands: Commands, controller: Option<Res<ThemeController>>) {
    let mode = controller.map_or(ThemeMode::Light, |c| c.mode());
    let (background, text) = button_colours(mode);

    commands
        .spawn((
            ThemeToggleButton,
            Button,
            Name::new("ThemeToggleButton"),
            BackgroundColor(background),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            GlobalZIndex(20),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(20.0),
                top: Val::Px(20.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(8.0)),
                border: UiRect::all(Val::Px(1.0)),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|btn| {
            btn.spawn((
                ThemeToggleLabel,
                Text::new(toggle_label(mode)),
                TextFont { font_size: 16.0, ..default() },
                TextColor(text),
            ));
        });
}

pub fn theme_toggle_interaction(
    q: Query<&Interaction, (Changed<Interaction>, With<ThemeToggleButton>)>,
    mut requests: EventWriter<ThemeToggleRequest>,
) {
    for interaction in &q {
        if *interaction == Interaction::Pressed {
            requests.write(ThemeToggleRequest { source: ThemeToggleSource::Button });
        }
    }
}

pub fn reflect_theme_on_toggle(
    mut changed: EventReader<ThemeChanged>,
    mut buttons: Query<&mut BackgroundColor, With<ThemeToggleButton>>,
    mut labels: Query<(&mut Text, &mut TextColor), With<ThemeToggleLabel>>,
) {
    let Some(event) = changed.read().last() else {
        return;
    };
    let (background, text) = button_colours(event.mode);

    for mut bg in &mut buttons {
        *bg = BackgroundColor(background);
    }
    for (mut label, mut colour) in &mut labels {
        *label = Text::new(toggle_label(event.mode));
        *colour = TextColor(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_the_other_mode() {
        assert_eq!(toggle_label(ThemeMode::Dark), "Light mode");
        assert_eq!(toggle_label(ThemeMode::Light), "Dark mode");
    }
}
