//! Loading pipeline from catalog fetch to a composed scene.
//!
//! The catalog asset is loaded (and hot reloaded), machine textures are
//! requested for the active generation, and the scene is composed in a
//! single pass once every texture has resolved or fallen back to the
//! placeholder. The overlay reports progress until then.

/// Catalog asset loading, validation and generation bookkeeping.
pub mod catalog_loader;

/// Loading overlay UI and progress notifications to the frontend.
pub mod loading_overlay;

/// Per-texture resolution tracking for the active catalog generation.
pub mod progress;

/// Atomic scene composition and teardown on catalog changes.
pub mod scene_composer;

/// Machine texture requests, load polling and placeholder fallback.
pub mod texture_loader;
