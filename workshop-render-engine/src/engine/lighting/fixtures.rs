use bevy::prelude::*;
use constants::lighting::{
    FIXTURE_BULB_RADIUS, FIXTURE_EMISSIVE_BLINKING, FIXTURE_EMISSIVE_IDLE,
    FIXTURE_LUMENS_PER_UNIT, FIXTURE_POSITIONS, FIXTURE_RANGE, FIXTURE_SWAY_AMPLITUDE,
};
use constants::render_settings::FIXTURE_COLOUR;

use super::blink::{BlinkController, BlinkPhase, BlinkSignal};
use crate::engine::theme::{ThemeChanged, ThemeController, ThemeMode};

/// Ceiling light fixture. Exists only while the theme is dark.
#[derive(Component, Debug, Clone, Copy)]
pub struct LightFixture {
    pub index: usize,
}

/// Visible bulb mesh under a fixture.
#[derive(Component)]
pub struct FixtureBulb;

/// Shared bulb mesh, created once at startup.
#[derive(Resource, Clone)]
pub struct FixtureMeshes {
    pub bulb: Handle<Mesh>,
}

/// One fixture finished its blink sequence.
#[derive(Event, Debug, Clone, Copy)]
pub struct FixtureSettled {
    pub fixture: Entity,
    pub index: usize,
}

/// Tracks how many fixtures have settled since dark mode was entered.
/// `lit` turns on once every fixture has settled.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FloorIllumination {
    pub settled: usize,
    pub total: usize,
    pub lit: bool,
}

impl FloorIllumination {
    fn reset(&mut self, total: usize) {
        self.settled = 0;
        self.total = total;
        self.lit = false;
    }
}

pub fn create_fixture_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let bulb = meshes.add(Sphere::new(FIXTURE_BULB_RADIUS).mesh().uv(32, 18));
    commands.insert_resource(FixtureMeshes { bulb });
}

fn spawn_fixtures(
    commands: &mut Commands,
    fixture_meshes: Option<&FixtureMeshes>,
    materials: Option<&mut Assets<StandardMaterial>>,
) {
    let mut materials = materials;

    for (index, position) in FIXTURE_POSITIONS.iter().enumerate() {
        let controller = BlinkController::for_mode(ThemeMode::Dark);
        let mut fixture = commands.spawn((
            LightFixture { index },
            PointLight {
                color: FIXTURE_COLOUR,
                intensity: controller.intensity() * FIXTURE_LUMENS_PER_UNIT,
                range: FIXTURE_RANGE,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_translation(*position),
            Visibility::default(),
            controller,
        ));

        if let (Some(meshes), Some(materials)) = (fixture_meshes, materials.as_deref_mut()) {
            let material = materials.add(bulb_material(FIXTURE_EMISSIVE_BLINKING));
            fixture.with_children(|parent| {
                parent.spawn((
                    Mesh3d(meshes.bulb.clone()),
                    MeshMaterial3d(material),
                    FixtureBulb,
                ));
            });
        }
    }

    info!("Spawned {} light fixtures", FIXTURE_POSITIONS.len());
}

fn bulb_material(emissive_strength: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: FIXTURE_COLOUR,
        emissive: FIXTURE_COLOUR.to_linear() * emissive_strength,
        ..default()
    }
}

/// Cancel every fixture timer, then remove the fixtures.
fn retire_fixtures(
    commands: &mut Commands,
    fixtures: &mut Query<(Entity, &mut BlinkController), With<LightFixture>>,
) {
    let mut removed = 0;
    for (entity, mut controller) in fixtures.iter_mut() {
        controller.on_theme(ThemeMode::Light);
        commands.entity(entity).despawn();
        removed += 1;
    }
    if removed > 0 {
        info!("Removed {removed} light fixtures");
    }
}

/// Theme consumer: dark spawns (or restarts) fixtures, light retires them.
pub fn sync_fixtures_with_theme(
    mut commands: Commands,
    mut changed: EventReader<ThemeChanged>,
    mut fixtures: Query<(Entity, &mut BlinkController), With<LightFixture>>,
    mut illumination: ResMut<FloorIllumination>,
    fixture_meshes: Option<Res<FixtureMeshes>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(event) = changed.read().last() else {
        return;
    };

    match event.mode {
        ThemeMode::Dark => {
            if fixtures.is_empty() {
                spawn_fixtures(
                    &mut commands,
                    fixture_meshes.as_deref(),
                    materials.map(|m| m.into_inner()),
                );
            } else {
                for (_, mut controller) in fixtures.iter_mut() {
                    controller.on_theme(ThemeMode::Dark);
                }
            }
            illumination.reset(FIXTURE_POSITIONS.len());
        }
        ThemeMode::Light => {
            retire_fixtures(&mut commands, &mut fixtures);
            illumination.reset(0);
        }
    }
}

/// Scene entry: fixtures follow the current theme.
pub fn spawn_fixtures_for_current_theme(
    mut commands: Commands,
    controller: Option<Res<ThemeController>>,
    fixtures: Query<(), With<LightFixture>>,
    mut illumination: ResMut<FloorIllumination>,
    fixture_meshes: Option<Res<FixtureMeshes>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(controller) = controller else {
        return;
    };
    if controller.mode().is_dark() && fixtures.is_empty() {
        spawn_fixtures(
            &mut commands,
            fixture_meshes.as_deref(),
            materials.map(|m| m.into_inner()),
        );
        illumination.reset(FIXTURE_POSITIONS.len());
    }
}

/// Scene exit: no fixture or timer outlives the scene.
pub fn despawn_all_fixtures(
    mut commands: Commands,
    mut fixtures: Query<(Entity, &mut BlinkController), With<LightFixture>>,
    mut illumination: ResMut<FloorIllumination>,
) {
    retire_fixtures(&mut commands, &mut fixtures);
    illumination.reset(0);
}

/// Advance every fixture's state machine by the frame delta and mirror its
/// intensity onto the point light.
pub fn drive_blink_controllers(
    time: Res<Time>,
    mut fixtures: Query<(Entity, &LightFixture, &mut BlinkController, &mut PointLight)>,
    mut settled: EventWriter<FixtureSettled>,
) {
    let delta = time.delta();
    for (entity, fixture, mut controller, mut light) in &mut fixtures {
        if let Some(BlinkSignal::Settled) = controller.advance(delta) {
            debug!("Fixture {} settled", fixture.index);
            settled.write(FixtureSettled {
                fixture: entity,
                index: fixture.index,
            });
        }

        let lumens = controller.intensity() * FIXTURE_LUMENS_PER_UNIT;
        if light.intensity != lumens {
            light.intensity = lumens;
        }
    }
}

/// Cosmetic sway while a fixture is active. Does not touch the state machine.
pub fn sway_fixtures(
    time: Res<Time>,
    mut fixtures: Query<(&BlinkController, &mut Transform), With<LightFixture>>,
) {
    let t = time.elapsed_secs();
    for (controller, mut transform) in &mut fixtures {
        if controller.phase() == BlinkPhase::Idle {
            continue;
        }
        transform.rotation = Quat::from_euler(
            EulerRot::XYZ,
            t.sin() * FIXTURE_SWAY_AMPLITUDE,
            t.cos() * FIXTURE_SWAY_AMPLITUDE,
            0.0,
        );
    }
}

/// Bulbs glow harder while blinking.
pub fn update_bulb_emissive(
    fixtures: Query<(&BlinkController, &Children), (With<LightFixture>, Changed<BlinkController>)>,
    bulbs: Query<&MeshMaterial3d<StandardMaterial>, With<FixtureBulb>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (controller, children) in &fixtures {
        let strength = if controller.phase() == BlinkPhase::Blinking {
            FIXTURE_EMISSIVE_BLINKING
        } else {
            FIXTURE_EMISSIVE_IDLE
        };
        for child in children.iter() {
            let Ok(material_handle) = bulbs.get(child) else {
                continue;
            };
            if let Some(material) = materials.get_mut(&material_handle.0) {
                material.emissive = FIXTURE_COLOUR.to_linear() * strength;
            }
        }
    }
}

/// Counts settle signals; the floor lights up once all fixtures settled.
pub fn track_floor_illumination(
    mut settled: EventReader<FixtureSettled>,
    mut illumination: ResMut<FloorIllumination>,
) {
    for _ in settled.read() {
        illumination.settled += 1;
    }
    if !illumination.lit && illumination.total > 0 && illumination.settled >= illumination.total
    {
        illumination.lit = true;
        info!("All fixtures settled, floor illuminated");
    }
}
