use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::machine_catalog::ActiveCatalog;
use crate::engine::layout::GridLayout;
use crate::engine::lighting::fixtures::{FixtureSettled, FloorIllumination};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::theme::{
    ThemeChanged, ThemeController, ThemeSet, ThemeToggleRequest, ThemeToggleSource,
};
use crate::tools::detail_panel::NavigationRequest;
use crate::tools::selection::{SelectionRequest, SelectionSource, SelectionStore};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the host page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(ThemeSet::Toggle),
            )
            .add_systems(Update, notify_theme_changes.in_set(ThemeSet::Apply))
            .add_systems(Update, notify_fixture_settled)
            .add_systems(PostUpdate, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Attempt JSON parsing to validate RPC format before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    // Write events using the non-deprecated method.
    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Resources and event writers the RPC handlers act on.
#[derive(SystemParam)]
struct RpcContext<'w> {
    theme: Option<Res<'w, ThemeController>>,
    theme_requests: EventWriter<'w, ThemeToggleRequest>,
    selection: Res<'w, SelectionStore>,
    selection_requests: EventWriter<'w, SelectionRequest>,
    navigation: EventWriter<'w, NavigationRequest>,
    active: Res<'w, ActiveCatalog>,
    layout: Res<'w, GridLayout>,
    progress: Res<'w, LoadingProgress>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut context: RpcContext,
) {
    // Toggles queued this frame are applied together after this system.
    let mut pending_toggles = 0;
    for event in events.read() {
        debug!("Received RPC: {}", event.content);

        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(&request, &mut context, &mut pending_toggles) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    context: &mut RpcContext,
    pending_toggles: &mut u32,
) -> Option<RpcResponse> {
    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "toggle_theme" => handle_toggle_theme(context, pending_toggles),
        "get_theme" => handle_get_theme(context),
        "select_machine" => handle_select_machine(&request.params, context),
        "deselect_machine" => handle_deselect_machine(context),
        "get_selection" => handle_get_selection(context),
        "explore_machine" => handle_explore_machine(&request.params, context),
        "get_loading_progress" => Ok(loading_progress_json(&context.progress)),
        "list_machines" => Ok(machine_list_json(&context.active, &context.layout)),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

#[derive(Deserialize)]
struct MachineParams {
    machine_id: u32,
}

/// The toggle is applied later in the same frame; the reply carries the
/// mode it will produce, counting toggles already queued before it.
fn handle_toggle_theme(
    context: &mut RpcContext,
    pending_toggles: &mut u32,
) -> Result<serde_json::Value, RpcError> {
    let Some(theme) = context.theme.as_ref() else {
        return Err(RpcError::internal_error("Theme not initialised"));
    };
    *pending_toggles += 1;
    let next = if *pending_toggles % 2 == 1 {
        theme.mode().toggled()
    } else {
        theme.mode()
    };

    context.theme_requests.write(ThemeToggleRequest {
        source: ThemeToggleSource::Rpc,
    });

    Ok(serde_json::json!({
        "success": true,
        "theme": next.as_str(),
        "environment_preset": next.environment_preset(),
    }))
}

fn handle_get_theme(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let Some(theme) = context.theme.as_ref() else {
        return Err(RpcError::internal_error("Theme not initialised"));
    };
    Ok(serde_json::json!({
        "theme": theme.mode().as_str(),
        "environment_preset": theme.mode().environment_preset(),
    }))
}

fn handle_select_machine(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let parsed = serde_json::from_value::<MachineParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'machine_id' parameter"))?;

    if !context.active.catalog.contains(parsed.machine_id) {
        return Err(RpcError::invalid_params(&format!(
            "Unknown machine: {}",
            parsed.machine_id
        )));
    }

    context
        .selection_requests
        .write(SelectionRequest::select(parsed.machine_id, SelectionSource::Rpc));

    Ok(serde_json::json!({
        "success": true,
        "machine_id": parsed.machine_id
    }))
}

fn handle_deselect_machine(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    context
        .selection_requests
        .write(SelectionRequest::deselect(SelectionSource::Rpc));
    Ok(serde_json::json!({ "success": true }))
}

fn handle_get_selection(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let selected = context.selection.selected();
    let machine = selected.and_then(|id| context.active.catalog.get(id));
    Ok(serde_json::json!({
        "machine_id": selected,
        "machine": machine,
    }))
}

/// Explore the given machine, or the selected one when no id is passed.
fn handle_explore_machine(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let requested = serde_json::from_value::<MachineParams>(params.clone())
        .ok()
        .map(|p| p.machine_id);
    let Some(machine_id) = requested.or(context.selection.selected()) else {
        return Err(RpcError::invalid_params(
            "Expected 'machine_id' parameter or an active selection",
        ));
    };
    let Some(record) = context.active.catalog.get(machine_id) else {
        return Err(RpcError::invalid_params(&format!(
            "Unknown machine: {machine_id}"
        )));
    };

    let request = NavigationRequest::for_machine(record);
    let detail_link = request.detail_link.clone();
    context.navigation.write(request);

    Ok(serde_json::json!({
        "success": true,
        "machine_id": machine_id,
        "detail_link": detail_link,
    }))
}

pub fn loading_progress_json(progress: &LoadingProgress) -> serde_json::Value {
    let textures: Vec<_> = progress
        .texture_states()
        .iter()
        .map(|(machine_id, status)| serde_json::json!({ "machine_id": machine_id, "status": status }))
        .collect();

    serde_json::json!({
        "generation": progress.generation,
        "catalog_loaded": progress.catalog_loaded,
        "scene_composed": progress.scene_composed,
        "percent": progress.percent(),
        "resolved": progress.resolved(),
        "failed": progress.failed(),
        "total": progress.total(),
        "textures": textures,
    })
}

pub fn machine_list_json(active: &ActiveCatalog, layout: &GridLayout) -> serde_json::Value {
    let machines: Vec<_> = active
        .catalog
        .machines
        .iter()
        .enumerate()
        .map(|(index, machine)| {
            let position = layout.position(index).map(|p| [p.x, p.y, p.z]);
            serde_json::json!({
                "id": machine.id,
                "name": machine.name,
                "image": machine.image,
                "detailLink": machine.detail_link,
                "position": position,
            })
        })
        .collect();

    serde_json::json!({
        "generation": active.generation,
        "machines": machines,
    })
}

fn notify_theme_changes(
    mut changed: EventReader<ThemeChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in changed.read() {
        rpc_interface.send_notification(
            "theme_changed",
            serde_json::json!({
                "theme": event.mode.as_str(),
                "environment_preset": event.mode.environment_preset(),
            }),
        );
    }
}

fn notify_fixture_settled(
    mut settled: EventReader<FixtureSettled>,
    illumination: Res<FloorIllumination>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in settled.read() {
        rpc_interface.send_notification(
            "fixture_settled",
            serde_json::json!({
                "fixture": event.index,
                "settled": illumination.settled,
                "total": illumination.total,
            }),
        );
    }
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::machine_catalog::{MachineCatalog, MachineRecord};
    use crate::engine::theme::ThemeMode;
    use crate::engine::theme::preference::MemoryPreferences;

    fn rpc_app() -> App {
        let mut app = App::new();
        let mut active = ActiveCatalog::default();
        active.replace(MachineCatalog {
            machines: vec![
                MachineRecord {
                    id: 1,
                    name: "Lathe".into(),
                    detail_link: "/machines/lathe".into(),
                    ..default()
                },
                MachineRecord {
                    id: 2,
                    name: "Mill".into(),
                    ..default()
                },
            ],
        });
        let layout = GridLayout::new(2, 12.0);

        app.insert_resource(active)
            .insert_resource(layout)
            .insert_resource(ThemeController::init(
                Box::new(MemoryPreferences::default()),
                || false,
            ))
            .init_resource::<SelectionStore>()
            .init_resource::<LoadingProgress>()
            .init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<ThemeToggleRequest>()
            .add_event::<SelectionRequest>()
            .add_event::<NavigationRequest>()
            .add_systems(Update, handle_rpc_messages);
        app
    }

    fn call(app: &mut App, method: &str, params: serde_json::Value) -> RpcResponse {
        let content = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 7
        })
        .to_string();
        app.world_mut().send_event(IncomingRpcMessage { content });
        app.update();

        let mut rpc = app.world_mut().resource_mut::<WebRpcInterface>();
        assert_eq!(rpc.outgoing_responses.len(), 1);
        rpc.outgoing_responses.remove(0)
    }

    #[test]
    fn unknown_method_is_reported() {
        let mut app = rpc_app();
        let response = call(&mut app, "make_coffee", serde_json::Value::Null);
        assert_eq!(response.error.map(|e| e.code), Some(-32601));
    }

    #[test]
    fn select_machine_rejects_unknown_ids() {
        let mut app = rpc_app();

        let response = call(&mut app, "select_machine", serde_json::json!({"machine_id": 42}));
        assert_eq!(response.error.map(|e| e.code), Some(-32602));

        let response = call(&mut app, "select_machine", serde_json::json!({"machine_id": 2}));
        assert!(response.error.is_none());
        let queued: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<SelectionRequest>>()
            .drain()
            .collect();
        assert_eq!(
            queued,
            vec![SelectionRequest::select(2, SelectionSource::Rpc)]
        );
    }

    #[test]
    fn toggle_theme_reports_next_mode() {
        let mut app = rpc_app();
        let response = call(&mut app, "toggle_theme", serde_json::Value::Null);
        let result = response.result.unwrap_or_default();
        assert_eq!(result["theme"], ThemeMode::Dark.as_str());
        assert_eq!(result["environment_preset"], "night");
    }

    #[test]
    fn toggles_in_one_frame_report_successive_modes() {
        let mut app = rpc_app();
        for id in [1, 2, 3] {
            let content = serde_json::json!({
                "jsonrpc": "2.0",
                "method": "toggle_theme",
                "id": id
            })
            .to_string();
            app.world_mut().send_event(IncomingRpcMessage { content });
        }
        app.update();

        let responses = std::mem::take(
            &mut app
                .world_mut()
                .resource_mut::<WebRpcInterface>()
                .outgoing_responses,
        );
        let themes: Vec<_> = responses
            .iter()
            .filter_map(|r| r.result.as_ref())
            .map(|result| result["theme"].clone())
            .collect();
        assert_eq!(themes, vec!["dark", "light", "dark"]);

        let queued = app
            .world_mut()
            .resource_mut::<Events<ThemeToggleRequest>>()
            .drain()
            .count();
        assert_eq!(queued, 3);
    }

    #[test]
    fn explore_uses_detail_link() {
        let mut app = rpc_app();
        let response = call(&mut app, "explore_machine", serde_json::json!({"machine_id": 1}));
        assert_eq!(
            response.result.unwrap_or_default()["detail_link"],
            "/machines/lathe"
        );

        let response = call(&mut app, "explore_machine", serde_json::Value::Null);
        assert!(response.error.is_some(), "no selection and no id");
    }

    #[test]
    fn machine_list_includes_grid_positions() {
        let mut app = rpc_app();
        let response = call(&mut app, "list_machines", serde_json::Value::Null);
        let result = response.result.unwrap_or_default();
        let machines = result["machines"].as_array().cloned().unwrap_or_default();

        assert_eq!(machines.len(), 2);
        assert_eq!(machines[0]["name"], "Lathe");
        assert_eq!(machines[0]["position"][0], -6.0);
        assert_eq!(machines[1]["position"][0], 6.0);
    }

    #[test]
    fn notifications_without_id_get_no_response() {
        let mut app = rpc_app();
        let content = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "deselect_machine",
            "params": {}
        })
        .to_string();
        app.world_mut().send_event(IncomingRpcMessage { content });
        app.update();

        assert!(app.world().resource::<WebRpcInterface>().outgoing_responses.is_empty());
    }
}
