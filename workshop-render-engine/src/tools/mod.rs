//! User interaction on the workshop floor.
//!
//! Pointer picking, the single-machine selection store, the detail panel
//! that mirrors it, and the on-screen theme toggle.
//!
//! ## Selection Flow
//!
//! ```text
//! Click / RPC / Escape / Close button
//!   └─> SelectionRequest::{Select, Deselect}
//!       └─> handle_selection_requests()
//!           ├─> SelectionStore updated (unknown ids ignored)
//!           ├─> SelectionChanged event
//!           └─> `selection_changed` RPC notification
//!               └─> sync_detail_panel() rebuilds or removes the panel
//! ```
//!
//! A click only counts when the cursor moved less than the drag threshold
//! between press and release, so orbiting the camera never selects.

/// Detail panel UI, explore navigation and close handling.
pub mod detail_panel;

/// Cursor ray casting against machine boxes, hover scaling and click selection.
pub mod picking;

/// Selection store resource, requests and change events.
pub mod selection;

/// On-screen theme toggle button.
pub mod theme_toggle;
