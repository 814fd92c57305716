use bevy::asset::AssetMetaCheck;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::render::camera::{PerspectiveProjection, Projection};
use bevy_common_assets::json::JsonAssetPlugin;
use constants::path::CATALOG_EXTENSION;
use constants::render_settings::CAMERA_FOV_DEGREES;

// Crate engine modules
use crate::engine::assets::machine_catalog::{ActiveCatalog, MachineCatalog};
use crate::engine::camera::orbit_camera::{OrbitCamera, camera_controller};
use crate::engine::core::app_state::AppState;
use crate::engine::core::window_config::create_window_config;
use crate::engine::layout::GridLayout;
use crate::engine::lighting::fixtures::{
    FixtureSettled, FloorIllumination, create_fixture_meshes, despawn_all_fixtures,
    drive_blink_controllers, spawn_fixtures_for_current_theme, sway_fixtures,
    sync_fixtures_with_theme, track_floor_illumination, update_bulb_emissive,
};
use crate::engine::loading::catalog_loader::{
    CatalogChanged, CatalogLoader, load_catalog_system, start_loading,
};
use crate::engine::loading::loading_overlay::{
    apply_theme_to_loading_overlay, spawn_loading_overlay, update_loading_frontend,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_composer::{
    compose_scene_when_ready, return_to_loading_on_catalog_change, teardown_scene,
};
use crate::engine::loading::texture_loader::{
    MachineTextures, check_texture_loading, create_placeholder_texture,
};
use crate::engine::scene::environment::{apply_theme_to_environment, spawn_environment_lighting};
use crate::engine::scene::floor::apply_theme_to_floor;
use crate::engine::scene::labels::position_machine_labels;
use crate::engine::scene::machine_node::{create_scene_meshes, wobble_machines};
use crate::engine::theme::theme_controller::{
    apply_theme_toggle_requests, init_theme, theme_keyboard_shortcut, update_environment_preset,
};
use crate::engine::theme::{EnvironmentPreset, ThemeChanged, ThemeSet, ThemeToggleRequest};
// Crate tools modules
use crate::tools::detail_panel::{NavigationRequest, forward_navigation_requests};
use crate::tools::picking::{HoveredMachine, PointerPress, apply_hover_scale, pick_machines};
use crate::tools::selection::{
    SelectionChanged, SelectionRequest, SelectionStore,
    handle_selection_requests, revalidate_selection,
};
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::tools::{
    detail_panel::{close_button_interaction, explore_button_interaction, sync_detail_panel},
    selection::deselect_on_escape,
    theme_toggle::{reflect_theme_on_toggle, spawn_theme_toggle, theme_toggle_interaction},
};

const LOG_FILTER: &str = "wgpu=error,naga=warn,workshop_render_engine=info";

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers MachineCatalog as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<MachineCatalog>::new(&[CATALOG_EXTENSION]))
        .add_plugins(WebRpcPlugin)
        .configure_sets(Update, (ThemeSet::Toggle, ThemeSet::Apply).chain());

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<CatalogLoader>()
        .init_resource::<ActiveCatalog>()
        .init_resource::<GridLayout>()
        .init_resource::<MachineTextures>()
        .init_resource::<FloorIllumination>()
        .init_resource::<EnvironmentPreset>()
        .init_resource::<SelectionStore>()
        .init_resource::<HoveredMachine>()
        .init_resource::<PointerPress>()
        .init_resource::<OrbitCamera>()
        .add_event::<CatalogChanged>()
        .add_event::<ThemeChanged>()
        .add_event::<ThemeToggleRequest>()
        .add_event::<FixtureSettled>()
        .add_event::<SelectionRequest>()
        .add_event::<SelectionChanged>()
        .add_event::<NavigationRequest>();

    // The theme must exist before the loading overlay is first shown.
    app.add_systems(PreStartup, init_theme).add_systems(
        Startup,
        (
            create_placeholder_texture,
            create_scene_meshes,
            create_fixture_meshes,
            spawn_environment_lighting,
            setup,
            start_loading,
        )
            .chain(),
    );

    // Catalog activation runs in every state so hot reloads are picked up.
    app.add_systems(
        Update,
        (
            load_catalog_system,
            revalidate_selection,
            return_to_loading_on_catalog_change.run_if(in_state(AppState::Running)),
        )
            .chain(),
    );

    // Loading phase systems
    app.add_systems(
        Update,
        (
            check_texture_loading,
            update_loading_frontend,
            compose_scene_when_ready,
        )
            .chain()
            .after(load_catalog_system)
            .run_if(in_state(AppState::Loading)),
    )
    .add_systems(OnEnter(AppState::Loading), spawn_loading_overlay)
    .add_systems(OnEnter(AppState::Running), spawn_fixtures_for_current_theme)
    .add_systems(
        OnExit(AppState::Running),
        (despawn_all_fixtures, teardown_scene),
    );

    // Theme propagation: requests are applied once, consumers follow in the same frame.
    app.add_systems(
        Update,
        (
            theme_keyboard_shortcut.before(ThemeSet::Toggle),
            apply_theme_toggle_requests.in_set(ThemeSet::Toggle),
            (
                update_environment_preset,
                apply_theme_to_environment,
                apply_theme_to_loading_overlay,
            )
                .in_set(ThemeSet::Apply),
        ),
    );

    // Fixture lifecycle and floor response, only while the scene exists.
    app.add_systems(
        Update,
        (
            sync_fixtures_with_theme,
            drive_blink_controllers,
            update_bulb_emissive,
            track_floor_illumination,
            apply_theme_to_floor,
        )
            .chain()
            .in_set(ThemeSet::Apply)
            .run_if(in_state(AppState::Running)),
    );

    // Runtime systems - only run when everything is ready
    let runtime_systems = (
        pick_machines,
        apply_hover_scale,
        wobble_machines,
        sway_fixtures,
        position_machine_labels,
    );
    app.add_systems(
        Update,
        (
            runtime_systems
                .chain()
                .before(handle_selection_requests)
                .run_if(in_state(AppState::Running)),
            camera_controller,
            handle_selection_requests,
            forward_navigation_requests,
        ),
    );

    // Native overlays; the web build leaves panels to the host page.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, spawn_theme_toggle.after(setup))
            .add_systems(
                Update,
                (
                    deselect_on_escape,
                    close_button_interaction,
                    explore_button_interaction.before(forward_navigation_requests),
                )
                    .before(handle_selection_requests),
            )
            .add_systems(
                Update,
                theme_toggle_interaction.before(ThemeSet::Toggle),
            )
            .add_systems(
                Update,
                (
                    reflect_theme_on_toggle,
                    sync_detail_panel
                        .after(handle_selection_requests)
                        .after(revalidate_selection),
                )
                    .in_set(ThemeSet::Apply),
            );
    }

    app
}

fn spawn_camera(commands: &mut Commands, orbit: &OrbitCamera) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        orbit.transform(),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, orbit: Res<OrbitCamera>) {
    spawn_camera(&mut commands, &orbit);
    info!("Workshop floor starting, camera at {}", orbit.eye_position());
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        level: Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
