//! Workshop lighting: blinking ceiling fixtures and their lifecycle.
//!
//! Each fixture carries a `BlinkController` that owns its interval timer.
//! Fixtures exist only while the theme is dark. Leaving dark mode, or
//! leaving the running scene, cancels every timer before the fixtures are
//! despawned, so no timer outlives its fixture.

/// Per-fixture blink state machine (Idle → Blinking → SettledOn).
pub mod blink;

/// Fixture spawning, theme synchronisation, timer driving and sway.
pub mod fixtures;
