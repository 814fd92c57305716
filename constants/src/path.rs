/// Catalog asset, relative to the Bevy asset root.
pub const CATALOG_PATH: &str = "catalog/machines.catalog.json";

/// File extension registered with the JSON asset loader for catalogs.
pub const CATALOG_EXTENSION: &str = "catalog.json";

/// Directory created under the platform config dir for persisted preferences.
pub const PREFERENCES_DIR_NAME: &str = "workshop-floor";

/// Preference file inside `PREFERENCES_DIR_NAME`.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Key of the single persisted preference.
pub const THEME_PREFERENCE_KEY: &str = "theme";
