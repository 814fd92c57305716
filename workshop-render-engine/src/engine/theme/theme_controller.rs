use bevy::prelude::*;
use constants::lighting::{ENVIRONMENT_PRESET_DARK, ENVIRONMENT_PRESET_LIGHT};
use constants::path::THEME_PREFERENCE_KEY;
use serde::{Deserialize, Serialize};

use super::preference::{PreferenceStorage, platform_preferences, system_prefers_dark};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    /// Parse a persisted value. Anything else counts as no preference.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// Environment lighting preset key handed to the renderer.
    pub fn environment_preset(self) -> &'static str {
        match self {
            Self::Dark => ENVIRONMENT_PRESET_DARK,
            Self::Light => ENVIRONMENT_PRESET_LIGHT,
        }
    }
}

/// Process-wide theme owner. The mode only changes through `toggle`.
#[derive(Resource)]
pub struct ThemeController {
    mode: ThemeMode,
    storage: Box<dyn PreferenceStorage>,
}

impl ThemeController {
    /// Stored preference first, then the ambient signal.
    /// An unreadable store behaves like an empty one.
    pub fn init(storage: Box<dyn PreferenceStorage>, prefers_dark: impl FnOnce() -> bool) -> Self {
        let stored = match storage.read(THEME_PREFERENCE_KEY) {
            Ok(value) => value.as_deref().and_then(ThemeMode::from_string),
            Err(e) => {
                warn!("Reading theme preference failed: {e}");
                None
            }
        };

        let mode = stored.unwrap_or_else(|| {
            if prefers_dark() {
                ThemeMode::Dark
            } else {
                ThemeMode::Light
            }
        });

        info!(
            "Theme initialised: {} ({})",
            mode.as_str(),
            if stored.is_some() { "stored" } else { "system" }
        );
        Self { mode, storage }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Flip the mode and persist it before returning.
    /// A failed write keeps the new mode for this session only.
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.toggled();
        if let Err(e) = self.storage.write(THEME_PREFERENCE_KEY, self.mode.as_str()) {
            warn!("Theme preference not persisted: {e}");
        }
        self.mode
    }
}

/// Broadcast on every mode change, including the initial one.
/// Theme-dependent systems run in `ThemeSet::Apply` in the same frame.
#[derive(Event, Debug, Clone, Copy)]
pub struct ThemeChanged {
    pub mode: ThemeMode,
}

/// Request to flip the theme, from keyboard, UI button or RPC.
#[derive(Event, Debug, Clone, Copy)]
pub struct ThemeToggleRequest {
    pub source: ThemeToggleSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeToggleSource {
    Keyboard,
    Button,
    Rpc,
}

/// Ordering for theme propagation within a frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThemeSet {
    Toggle,
    Apply,
}

/// Environment lighting preset derived from the theme.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPreset(pub &'static str);

impl Default for EnvironmentPreset {
    fn default() -> Self {
        Self(ThemeMode::Light.environment_preset())
    }
}

/// Startup: build the controller from platform storage and announce the mode.
pub fn init_theme(mut commands: Commands, mut changed: EventWriter<ThemeChanged>) {
    let controller = ThemeController::init(platform_preferences(), system_prefers_dark);
    changed.write(ThemeChanged {
        mode: controller.mode(),
    });
    commands.insert_resource(controller);
}

/// Apply toggle requests. Several requests in one frame each flip the mode.
pub fn apply_theme_toggle_requests(
    mut requests: EventReader<ThemeToggleRequest>,
    controller: Option<ResMut<ThemeController>>,
    mut changed: EventWriter<ThemeChanged>,
) {
    let Some(mut controller) = controller else {
        requests.clear();
        return;
    };

    for request in requests.read() {
        let mode = controller.toggle();
        info!("Theme toggled to {} via {:?}", mode.as_str(), request.source);
        changed.write(ThemeChanged { mode });
    }
}

/// Native shortcut: `T` toggles the theme.
pub fn theme_keyboard_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: EventWriter<ThemeToggleRequest>,
) {
    if keyboard.just_pressed(KeyCode::KeyT) {
        requests.write(ThemeToggleRequest {
            source: ThemeToggleSource::Keyboard,
        });
    }
}

pub fn update_environment_preset(
    mut changed: EventReader<ThemeChanged>,
    mut preset: ResMut<EnvironmentPreset>,
) {
    if let Some(event) = changed.read().last() {
        let key = event.mode.environment_preset();
        if preset.0 != key {
            preset.0 = key;
            info!("Environment preset: {key}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::theme::preference::{MemoryPreferences, PreferenceError};

    struct BrokenStorage;

    impl PreferenceStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, PreferenceError> {
            Err(PreferenceError::Unavailable("offline".into()))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), PreferenceError> {
            Err(PreferenceError::Unavailable("offline".into()))
        }
    }

    /// Shares its values with the test after the controller takes ownership.
    #[derive(Clone, Default)]
    struct SharedStorage(std::sync::Arc<std::sync::Mutex<MemoryPreferences>>);

    impl PreferenceStorage for SharedStorage {
        fn read(&self, key: &str) -> Result<Option<String>, PreferenceError> {
            self.0.lock().unwrap().read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
            self.0.lock().unwrap().write(key, value)
        }
    }

    #[test]
    fn stored_preference_wins_over_system() {
        let storage = MemoryPreferences::with(THEME_PREFERENCE_KEY, "light");
        let controller = ThemeController::init(Box::new(storage), || true);
        assert_eq!(controller.mode(), ThemeMode::Light);
    }

    #[test]
    fn system_signal_used_without_stored_value() {
        let dark = ThemeController::init(Box::new(MemoryPreferences::default()), || true);
        let light = ThemeController::init(Box::new(MemoryPreferences::default()), || false);
        assert_eq!(dark.mode(), ThemeMode::Dark);
        assert_eq!(light.mode(), ThemeMode::Light);
    }

    #[test]
    fn unknown_stored_value_falls_back_to_system() {
        let storage = MemoryPreferences::with(THEME_PREFERENCE_KEY, "sepia");
        let controller = ThemeController::init(Box::new(storage), || true);
        assert_eq!(controller.mode(), ThemeMode::Dark);
    }

    #[test]
    fn system_signal_not_consulted_when_stored() {
        let storage = MemoryPreferences::with(THEME_PREFERENCE_KEY, "dark");
        let controller = ThemeController::init(Box::new(storage), || {
            panic!("ambient preference must not be queried")
        });
        assert_eq!(controller.mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_persists_before_returning() {
        let storage = SharedStorage::default();
        let mut controller = ThemeController::init(Box::new(storage.clone()), || false);

        assert_eq!(controller.toggle(), ThemeMode::Dark);
        assert_eq!(
            storage.read(THEME_PREFERENCE_KEY).unwrap().as_deref(),
            Some("dark")
        );

        assert_eq!(controller.toggle(), ThemeMode::Light);
        assert_eq!(
            storage.read(THEME_PREFERENCE_KEY).unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn broken_storage_degrades_to_session_only() {
        let mut controller = ThemeController::init(Box::new(BrokenStorage), || false);
        assert_eq!(controller.mode(), ThemeMode::Light);
        assert_eq!(controller.toggle(), ThemeMode::Dark);
        assert_eq!(controller.mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_requests_emit_changes_in_the_same_update() {
        let mut app = App::new();
        app.add_event::<ThemeToggleRequest>()
            .add_event::<ThemeChanged>()
            .init_resource::<EnvironmentPreset>()
            .insert_resource(ThemeController::init(
                Box::new(MemoryPreferences::default()),
                || false,
            ))
            .add_systems(
                Update,
                (
                    apply_theme_toggle_requests.in_set(ThemeSet::Toggle),
                    update_environment_preset.in_set(ThemeSet::Apply),
                ),
            )
            .configure_sets(Update, ThemeSet::Apply.after(ThemeSet::Toggle));

        app.world_mut().send_event(ThemeToggleRequest {
            source: ThemeToggleSource::Rpc,
        });
        app.update();

        assert_eq!(
            app.world().resource::<ThemeController>().mode(),
            ThemeMode::Dark
        );
        assert_eq!(app.world().resource::<EnvironmentPreset>().0, "night");
    }
}
