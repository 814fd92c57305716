//! JSON-RPC 2.0 communication layer for the host page.
//!
//! Implements bidirectional messaging between Bevy engine and the host page via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent)     <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! Add a match arm in `handle_rpc_request()` and a handler returning
//! `Result<serde_json::Value, RpcError>`. Handlers that change state write
//! the same request events the keyboard and pointer paths use, so every
//! source goes through one system:
//!
//! ```rust,ignore
//! "select_machine" => handle_select_machine(&request.params, context),
//! ```
//!
//! Push updates with `WebRpcInterface::send_notification()`:
//!
//! ```rust,ignore
//! rpc.send_notification("scene_ready", json!({ "machine_count": 10 }));
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Theme
//! - `toggle_theme`: Flip between dark and light; replies with the resulting mode
//! - `get_theme`: Current mode and environment preset
//!
//! ### Selection
//! - `select_machine`: Select a machine by `machine_id` (unknown ids are rejected)
//! - `deselect_machine`: Clear the selection and close the detail panel
//! - `get_selection`: Selected id and its catalog record
//! - `explore_machine`: Navigate to a machine's detail link
//!
//! ### Scene
//! - `get_loading_progress`: Texture resolution progress for the active catalog
//! - `list_machines`: Catalog records with their floor positions
//!
//! ## Notifications
//!
//! `loading_progress`, `scene_ready`, `theme_changed`, `selection_changed`,
//! `navigate`, `fixture_settled`, plus `debug_message` for unparseable input.

/// JSON-RPC 2.0 bidirectional communication system with the host page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
