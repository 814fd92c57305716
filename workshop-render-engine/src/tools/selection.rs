use bevy::prelude::*;

use crate::engine::assets::machine_catalog::{ActiveCatalog, MachineCatalog};
use crate::engine::loading::catalog_loader::CatalogChanged;
use crate::rpc::web_rpc::WebRpcInterface;

/// At most one selected machine, referenced by catalog id.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionStore {
    selected: Option<u32>,
}

impl SelectionStore {
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Select `machine_id` if the catalog knows it. Unknown ids leave the
    /// current selection untouched. Returns whether the selection changed.
    pub fn select(&mut self, machine_id: u32, catalog: &MachineCatalog) -> bool {
        if !catalog.contains(machine_id) {
            return false;
        }
        if self.selected == Some(machine_id) {
            return false;
        }
        self.selected = Some(machine_id);
        true
    }

    /// Returns the id that was selected, if any.
    pub fn deselect(&mut self) -> Option<u32> {
        self.selected.take()
    }

    /// Drop a selection whose id is gone from `catalog`.
    pub fn retain_valid(&mut self, catalog: &MachineCatalog) -> bool {
        match self.selected {
            Some(id) if !catalog.contains(id) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_panel_visible(&self) -> bool {
        self.selected.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Pointer,
    Keyboard,
    Panel,
    Rpc,
}

/// Select or deselect, applied in the order the requests were written.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRequest {
    Select {
        machine_id: u32,
        source: SelectionSource,
    },
    Deselect {
        source: SelectionSource,
    },
}

impl SelectionRequest {
    pub fn select(machine_id: u32, source: SelectionSource) -> Self {
        Self::Select { machine_id, source }
    }

    pub fn deselect(source: SelectionSource) -> Self {
        Self::Deselect { source }
    }
}

/// Emitted after the selection actually changed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub selected: Option<u32>,
}

fn announce(
    store: &SelectionStore,
    changed: &mut EventWriter<SelectionChanged>,
    rpc_interface: &mut WebRpcInterface,
) {
    changed.write(SelectionChanged {
        selected: store.selected(),
    });
    rpc_interface.send_notification(
        "selection_changed",
        serde_json::json!({ "machine_id": store.selected() }),
    );
}

/// Apply selection requests in arrival order.
pub fn handle_selection_requests(
    mut requests: EventReader<SelectionRequest>,
    mut store: ResMut<SelectionStore>,
    active: Res<ActiveCatalog>,
    mut changed: EventWriter<SelectionChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for request in requests.read() {
        match *request {
            SelectionRequest::Select { machine_id, source } => {
                if store.select(machine_id, &active.catalog) {
                    info!("Selected machine {machine_id} via {source:?}");
                    announce(&store, &mut changed, &mut rpc_interface);
                } else if !active.catalog.contains(machine_id) {
                    warn!("Ignoring selection of unknown machine {machine_id}");
                }
            }
            SelectionRequest::Deselect { source } => {
                if let Some(previous) = store.deselect() {
                    info!("Deselected machine {previous} via {source:?}");
                    announce(&store, &mut changed, &mut rpc_interface);
                }
            }
        }
    }
}

/// A catalog change may remove the selected id.
pub fn revalidate_selection(
    mut catalog_events: EventReader<CatalogChanged>,
    mut store: ResMut<SelectionStore>,
    active: Res<ActiveCatalog>,
    mut changed: EventWriter<SelectionChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if catalog_events.read().count() == 0 {
        return;
    }
    if store.retain_valid(&active.catalog) {
        info!("Selection cleared: machine no longer in catalog");
        announce(&store, &mut changed, &mut rpc_interface);
    }
}

/// Native: Escape closes the detail panel.
#[cfg(not(target_arch = "wasm32"))]
pub fn deselect_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: EventWriter<SelectionRequest>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        requests.write(SelectionRequest::deselect(SelectionSource::Keyboard));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::machine_catalog::MachineRecord;

    fn catalog(ids: &[u32]) -> MachineCatalog {
        MachineCatalog {
            machines: ids
                .iter()
                .map(|id| MachineRecord {
                    id: *id,
                    name: format!("Machine {id}"),
                    ..default()
                })
                .collect(),
        }
    }

    #[test]
    fn select_then_deselect_leaves_nothing_selected() {
        let catalog = catalog(&[1, 2, 3]);
        let mut store = SelectionStore::default();

        assert!(store.select(2, &catalog));
        assert!(store.is_panel_visible());
        assert_eq!(store.deselect(), Some(2));
        assert_eq!(store.selected(), None);
        assert!(!store.is_panel_visible());
    }

    #[test]
    fn unknown_id_keeps_prior_selection() {
        let catalog = catalog(&[1, 2]);
        let mut store = SelectionStore::default();
        store.select(1, &catalog);

        assert!(!store.select(42, &catalog));
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn selecting_twice_equals_once() {
        let catalog = catalog(&[7]);
        let mut once = SelectionStore::default();
        once.select(7, &catalog);

        let mut twice = SelectionStore::default();
        twice.select(7, &catalog);
        assert!(!twice.select(7, &catalog));

        assert_eq!(once, twice);
    }

    #[test]
    fn catalog_change_clears_dangling_selection() {
        let mut store = SelectionStore::default();
        store.select(3, &catalog(&[1, 3]));

        assert!(!store.retain_valid(&catalog(&[3, 4])));
        assert_eq!(store.selected(), Some(3));

        assert!(store.retain_valid(&catalog(&[1, 4])));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn requests_update_store_and_emit_changes() {
        let mut app = App::new();
        let mut active = ActiveCatalog::default();
        active.replace(catalog(&[1, 2]));

        app.insert_resource(active)
            .init_resource::<SelectionStore>()
            .init_resource::<WebRpcInterface>()
            .add_event::<SelectionRequest>()
            .add_event::<SelectionChanged>()
            .add_systems(Update, handle_selection_requests);

        app.world_mut()
            .send_event(SelectionRequest::select(2, SelectionSource::Rpc));
        app.world_mut()
            .send_event(SelectionRequest::select(99, SelectionSource::Rpc));
        app.update();

        assert_eq!(app.world().resource::<SelectionStore>().selected(), Some(2));
        let emitted: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<SelectionChanged>>()
            .drain()
            .collect();
        assert_eq!(emitted, vec![SelectionChanged { selected: Some(2) }]);

        app.world_mut()
            .send_event(SelectionRequest::deselect(SelectionSource::Panel));
        app.update();
        assert_eq!(app.world().resource::<SelectionStore>().selected(), None);
    }

    fn selection_app(ids: &[u32]) -> App {
        let mut app = App::new();
        let mut active = ActiveCatalog::default();
        active.replace(catalog(ids));

        app.insert_resource(active)
            .init_resource::<SelectionStore>()
            .init_resource::<WebRpcInterface>()
            .add_event::<SelectionRequest>()
            .add_event::<SelectionChanged>()
            .add_systems(Update, handle_selection_requests);
        app
    }

    #[test]
    fn deselect_then_select_in_one_frame_keeps_the_new_selection() {
        let mut app = selection_app(&[1, 2]);
        app.world_mut().resource_mut::<SelectionStore>().select(2, &catalog(&[1, 2]));

        app.world_mut()
            .send_event(SelectionRequest::deselect(SelectionSource::Keyboard));
        app.world_mut()
            .send_event(SelectionRequest::select(1, SelectionSource::Pointer));
        app.update();

        assert_eq!(app.world().resource::<SelectionStore>().selected(), Some(1));
        let emitted: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<SelectionChanged>>()
            .drain()
            .collect();
        assert_eq!(
            emitted,
            vec![
                SelectionChanged { selected: None },
                SelectionChanged { selected: Some(1) },
            ]
        );
    }

    #[test]
    fn select_then_deselect_in_one_frame_ends_empty() {
        let mut app = selection_app(&[1, 2]);

        app.world_mut()
            .send_event(SelectionRequest::select(1, SelectionSource::Rpc));
        app.world_mut()
            .send_event(SelectionRequest::deselect(SelectionSource::Rpc));
        app.update();

        assert_eq!(app.world().resource::<SelectionStore>().selected(), None);
    }
}
