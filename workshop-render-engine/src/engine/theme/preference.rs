use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to access preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preference file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value store for persisted user preferences.
pub trait PreferenceStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Session-only storage. Used in tests and when no platform store exists.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn with(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self { values }
    }
}

impl PreferenceStorage for MemoryPreferences {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Platform config location.
    /// - Linux: `~/.config/workshop-floor/preferences.json`
    /// - macOS: `~/Library/Application Support/workshop-floor/preferences.json`
    /// - Windows: `%APPDATA%\workshop-floor\preferences.json`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_config_dir() -> Result<Self, PreferenceError> {
        use constants::path::{PREFERENCES_DIR_NAME, PREFERENCES_FILE_NAME};

        let dir = dirs::config_dir().ok_or_else(|| {
            PreferenceError::Unavailable("no config directory on this platform".to_string())
        })?;
        Ok(Self::new(
            dir.join(PREFERENCES_DIR_NAME).join(PREFERENCES_FILE_NAME),
        ))
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PreferenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStorage for FilePreferences {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load_all()?.remove(key))
    }

    /// Temp file + rename so a crash never leaves a half-written file.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let io_error = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };

        // An unreadable file is overwritten rather than blocking the write.
        let mut values = self.load_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(&values).map_err(|source| {
            PreferenceError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(io_error)?;
        fs::rename(&temp_path, &self.path).map_err(io_error)?;
        Ok(())
    }
}

/// Browser `localStorage`, looked up on every access.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone)]
pub struct BrowserPreferences;

#[cfg(target_arch = "wasm32")]
impl BrowserPreferences {
    fn storage() -> Result<web_sys::Storage, PreferenceError> {
        web_sys::window()
            .ok_or_else(|| PreferenceError::Unavailable("window object not available".into()))?
            .local_storage()
            .ok()
            .flatten()
            .ok_or_else(|| PreferenceError::Unavailable("localStorage not available".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStorage for BrowserPreferences {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| PreferenceError::Unavailable(format!("{e:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| PreferenceError::Unavailable(format!("{e:?}")))
    }
}

/// Best available store for the current platform, falling back to memory.
pub fn platform_preferences() -> Box<dyn PreferenceStorage> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(BrowserPreferences)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match FilePreferences::in_config_dir() {
            Ok(file) => Box::new(file),
            Err(e) => {
                bevy::log::warn!("{e}; theme preference will not outlive this session");
                Box::new(MemoryPreferences::default())
            }
        }
    }
}

/// Host "prefers dark" signal, consulted only without a stored preference.
pub fn system_prefers_dark() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        matches!(dark_light::detect(), Ok(dark_light::Mode::Dark))
    }
}
