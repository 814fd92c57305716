//! Orbit camera for navigating the workshop floor.
//!
//! The eye orbits a focus point on the floor plane and is kept at or above
//! the floor by clamping its elevation.

/// Orbit camera resource and mouse-driven controller system.
pub mod orbit_camera;
