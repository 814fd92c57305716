//! Shared compile-time configuration for the workshop floor renderer.

/// Asset paths and persisted preference locations.
pub mod path;

/// Grid spacing and scene geometry sizes.
pub mod layout;

/// Fixture blink timing, intensities and theme-dependent light levels.
pub mod lighting;

/// Camera placement, orbit limits and theme palette.
pub mod render_settings;
