//! Dark/light theme ownership and propagation.
//!
//! `ThemeController` owns the mode and its persisted preference. Changes are
//! broadcast as `ThemeChanged` events and consumed by every theme-dependent
//! system in `ThemeSet::Apply`, which runs after `ThemeSet::Toggle` in the
//! same frame.
//!
//! ```text
//! Keyboard / Button / RPC
//!   └─> ThemeToggleRequest
//!       └─> apply_theme_toggle_requests()   [ThemeSet::Toggle]
//!           └─> ThemeController::toggle() ── persist
//!               └─> ThemeChanged
//!                   ├─> fixtures (spawn / cancel + despawn)
//!                   ├─> ambient, sun, clear colour, floor material
//!                   ├─> environment preset
//!                   └─> frontend notification        [ThemeSet::Apply]
//! ```

/// Preference storage backends and the ambient "prefers dark" signal.
pub mod preference;

/// Theme mode, controller resource, events and toggle systems.
pub mod theme_controller;

pub use theme_controller::{
    EnvironmentPreset, ThemeChanged, ThemeController, ThemeMode, ThemeSet, ThemeToggleRequest,
    ThemeToggleSource,
};
