//! Workshop scene content.
//!
//! The floor, the machine nodes placed by the grid layout, their name labels
//! and the theme-driven environment lighting. Everything spawned for a
//! composed scene carries `SceneEntity` so it can be torn down in one pass.

/// Ambient, key and sun lighting driven by the theme.
pub mod environment;

/// Floor plane coloured by theme and lit once fixtures settle.
pub mod floor;

/// Screen-space machine name labels.
pub mod labels;

/// Machine node entities, shared meshes and idle animation.
pub mod machine_node;
