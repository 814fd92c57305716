use bevy::prelude::*;
use constants::render_settings::{
    PANEL_ACCENT, PANEL_BACKGROUND_DARK, PANEL_BACKGROUND_LIGHT, PANEL_TEXT_DARK, PANEL_TEXT_LIGHT,
};

use super::selection::{SelectionChanged, SelectionRequest, SelectionSource, SelectionStore};
use crate::engine::assets::machine_catalog::{ActiveCatalog, MachineRecord};
use crate::engine::loading::texture_loader::{MachineTextures, PlaceholderTexture};
use crate::engine::theme::{ThemeChanged, ThemeController, ThemeMode};
use crate::rpc::web_rpc::WebRpcInterface;

/// Request to open a machine's detail page.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub machine_id: u32,
    pub detail_link: String,
}

impl NavigationRequest {
    pub fn for_machine(record: &MachineRecord) -> Self {
        Self {
            machine_id: record.id,
            detail_link: record.detail_link.clone(),
        }
    }
}

#[derive(Component)]
pub struct DetailPanelRoot;

/// Machine picture under the panel header.
#[derive(Component)]
pub struct DetailPanelImage {
    pub machine_id: u32,
}

#[derive(Component)]
pub struct ClosePanelButton;

#[derive(Component)]
pub struct ExploreButton {
    pub machine_id: u32,
}

struct PanelPalette {
    background: Color,
    text: Color,
    row: Color,
}

impl PanelPalette {
    fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self {
                background: PANEL_BACKGROUND_DARK,
                text: PANEL_TEXT_DARK,
                row: Color::srgba(1.0, 1.0, 1.0, 0.06),
            },
            ThemeMode::Light => Self {
                background: PANEL_BACKGROUND_LIGHT,
                text: PANEL_TEXT_LIGHT,
                row: Color::srgba(0.0, 0.0, 0.0, 0.05),
            },
        }
    }
}

fn spawn_detail_panel(
    commands: &mut Commands,
    record: &MachineRecord,
    image: Option<Handle<Image>>,
    mode: ThemeMode,
) {
    let palette = PanelPalette::for_mode(mode);

    commands
        .spawn((
            DetailPanelRoot,
            Name::new("DetailPanel"),
            Interaction::default(),
            BackgroundColor(palette.background),
            GlobalZIndex(5),
            Node {
                width: Val::Px(380.0),
                position_type: PositionType::Absolute,
                right: Val::Px(20.0),
                top: Val::Px(20.0),
                bottom: Val::Px(20.0),
                padding: UiRect::all(Val::Px(20.0)),
                row_gap: Val::Px(12.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                overflow: Overflow::clip_y(),
                ..default()
            },
        ))
        .with_children(|panel| {
            panel
                .spawn(Node {
                    width: Val::Percent(100.0),
                    display: Display::Flex,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::SpaceBetween,
                    ..default()
                })
                .with_children(|header| {
                    header.spawn((
                        Text::new(record.name.clone()),
                        TextFont { font_size: 24.0, ..default() },
                        TextColor(palette.text),
                    ));
                    header
                        .spawn((
                            ClosePanelButton,
                            Button,
                            Name::new("ClosePanelButton"),
                            BackgroundColor(Color::NONE),
                            Node {
                                width: Val::Px(32.0),
                                height: Val::Px(32.0),
                                align_items: AlignItems::Center,
                                justify_content: JustifyContent::Center,
                                ..default()
                            },
                        ))
                        .with_children(|btn| {
                            btn.spawn((
                                Text::new("X"),
                                TextFont { font_size: 18.0, ..default() },
                                TextColor(palette.text),
                            ));
                        });
                });

            if let Some(image) = image {
                panel.spawn((
                    DetailPanelImage {
                        machine_id: record.id,
                    },
                    ImageNode::new(image),
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(200.0),
                        ..default()
                    },
                ));
            }

            if !record.description.is_empty() {
                panel.spawn((
                    Text::new(record.description.clone()),
                    TextFont { font_size: 15.0, ..default() },
                    TextColor(palette.text),
                ));
            }

            panel.spawn((
                Text::new("Technical Specifications"),
                TextFont { font_size: 18.0, ..default() },
                TextColor(PANEL_ACCENT),
            ));

            if record.specs.is_empty() {
                panel.spawn((
                    Text::new("No specifications listed."),
                    TextFont { font_size: 14.0, ..default() },
                    TextColor(palette.text.with_alpha(0.6)),
                ));
            }

            for (key, value) in record.specs.iter() {
                panel
                    .spawn((
                        BackgroundColor(palette.row),
                        Node {
                            width: Val::Percent(100.0),
                            padding: UiRect::all(Val::Px(8.0)),
                            column_gap: Val::Px(12.0),
                            justify_content: JustifyContent::SpaceBetween,
                            ..default()
                        },
                    ))
                    .with_children(|row| {
                        row.spawn((
                            Text::new(key.to_string()),
                            TextFont { font_size: 14.0, ..default() },
                            TextColor(palette.text.with_alpha(0.7)),
                        ));
                        row.spawn((
                            Text::new(value.to_string()),
                            TextFont { font_size: 14.0, ..default() },
                            TextColor(palette.text),
                        ));
                    });
            }

            panel
                .spawn((
                    ExploreButton { machine_id: record.id },
                    Button,
                    Name::new("ExploreButton"),
                    BackgroundColor(PANEL_ACCENT),
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(40.0),
                        margin: UiRect::top(Val::Px(8.0)),
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        ..default()
                    },
                ))
                .with_children(|btn| {
                    btn.spawn((
                        Text::new("Explore"),
                        TextFont { font_size: 16.0, ..default() },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

/// The panel exists exactly while a machine is selected. It is rebuilt on
/// selection and theme changes.
pub fn sync_detail_panel(
    mut commands: Commands,
    mut selection_events: EventReader<SelectionChanged>,
    mut theme_events: EventReader<ThemeChanged>,
    store: Res<SelectionStore>,
    active: Res<ActiveCatalog>,
    textures: Option<Res<MachineTextures>>,
    placeholder: Option<Res<PlaceholderTexture>>,
    controller: Option<Res<ThemeController>>,
    panels: Query<Entity, With<DetailPanelRoot>>,
) {
    let selection_changed = selection_events.read().count() > 0;
    let theme_changed = theme_events.read().count() > 0;
    if !selection_changed && !theme_changed {
        return;
    }

    for panel in &panels {
        commands.entity(panel).despawn();
    }

    let Some(record) = store.selected().and_then(|id| active.catalog.get(id)) else {
        return;
    };
    // Same texture as the machine box: the loaded image or the placeholder.
    let image = match (textures, placeholder) {
        (Some(textures), Some(placeholder)) => Some(textures.texture_for(record.id, &placeholder.0)),
        (None, Some(placeholder)) => Some(placeholder.0.clone()),
        _ => None,
    };
    let mode = controller.map_or(ThemeMode::Light, |c| c.mode());
    spawn_detail_panel(&mut commands, record, image, mode);
}

pub fn close_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<ClosePanelButton>)>,
    mut requests: EventWriter<SelectionRequest>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => { requests.write(SelectionRequest::deselect(SelectionSource::Panel)); }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgba(0.5, 0.5, 0.5, 0.2)),
            Interaction::None    => *bg = BackgroundColor(Color::NONE),
        }
    }
}

pub fn explore_button_interaction(
    mut q: Query<(&Interaction, &ExploreButton, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
    active: Res<ActiveCatalog>,
    mut navigation: EventWriter<NavigationRequest>,
) {
    for (interaction, button, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                if let Some(record) = active.catalog.get(button.machine_id) {
                    navigation.write(NavigationRequest::for_machine(record));
                }
            }
            Interaction::Hovered => *bg = BackgroundColor(PANEL_ACCENT.darker(0.08)),
            Interaction::None    => *bg = BackgroundColor(PANEL_ACCENT),
        }
    }
}

/// Hand navigation requests to the host page.
pub fn forward_navigation_requests(
    mut requests: EventReader<NavigationRequest>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for request in requests.read() {
        if request.detail_link.is_empty() {
            warn!("Machine {} has no detail link", request.machine_id);
            continue;
        }
        info!(
            "Navigating to {} for machine {}",
            request.detail_link, request.machine_id
        );
        rpc_interface.send_notification(
            "navigate",
            serde_json::json!({
                "machine_id": request.machine_id,
                "detail_link": request.detail_link,
            }),
        );
    }
}
