//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Registers resources, events and system ordering for loading, theming,
/// lighting and interaction.
pub mod app_setup;

/// Application state machine: `Loading` until the scene is composed, then `Running`.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
