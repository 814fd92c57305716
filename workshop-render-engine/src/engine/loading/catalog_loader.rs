use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::layout::MACHINE_SPACING;
use constants::path::CATALOG_PATH;

use crate::engine::assets::machine_catalog::{ActiveCatalog, MachineCatalog};
use crate::engine::layout::GridLayout;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::texture_loader::{PlaceholderTexture, request_textures};

#[derive(Resource, Default)]
pub struct CatalogLoader {
    handle: Option<Handle<MachineCatalog>>,
    failure_reported: bool,
}

/// A new catalog generation is active. Everything derived from the previous
/// one (nodes, textures, selection) must be rebuilt or revalidated.
#[derive(Event, Debug, Clone, Copy)]
pub struct CatalogChanged {
    pub generation: u32,
    pub machine_count: usize,
}

// Start the loading process
pub fn start_loading(mut loader: ResMut<CatalogLoader>, asset_server: Res<AssetServer>) {
    info!("Loading machine catalog from: {CATALOG_PATH}");
    loader.handle = Some(asset_server.load(CATALOG_PATH));
}

/// Catalog to activate this frame, if any: the reloaded asset, or an empty
/// catalog the first time the load is seen to have failed.
pub fn next_catalog(
    reloaded: Option<&MachineCatalog>,
    load_failed: bool,
    loader: &mut CatalogLoader,
) -> Option<MachineCatalog> {
    if let Some(catalog) = reloaded {
        return Some(catalog.clone());
    }
    if load_failed && !loader.failure_reported {
        // The floor still renders, just without machines.
        error!("Machine catalog failed to load from {CATALOG_PATH}; showing an empty workshop");
        loader.failure_reported = true;
        return Some(MachineCatalog::default());
    }
    None
}

/// Validate `catalog` and make it the active generation. Layout and progress
/// tracking follow the new machine list.
pub fn activate_catalog(
    catalog: &MachineCatalog,
    active: &mut ActiveCatalog,
    layout: &mut GridLayout,
    progress: &mut LoadingProgress,
) -> CatalogChanged {
    let (catalog, issues) = catalog.validated();
    for issue in &issues {
        warn!("Catalog: {issue}");
    }

    active.replace(catalog);
    let generation = active.generation;
    let machine_count = active.catalog.len();

    if layout.ensure(machine_count, MACHINE_SPACING) {
        debug!("Grid layout recomputed for {machine_count} machines");
    }
    progress.begin(
        generation,
        active.catalog.machines.iter().map(|machine| machine.id),
    );

    CatalogChanged {
        generation,
        machine_count,
    }
}

/// Activate the catalog once loaded, and again on every hot reload.
pub fn load_catalog_system(
    mut loader: ResMut<CatalogLoader>,
    mut asset_events: EventReader<AssetEvent<MachineCatalog>>,
    catalogs: Res<Assets<MachineCatalog>>,
    asset_server: Res<AssetServer>,
    placeholder: Res<PlaceholderTexture>,
    mut active: ResMut<ActiveCatalog>,
    mut layout: ResMut<GridLayout>,
    mut progress: ResMut<LoadingProgress>,
    mut commands: Commands,
    mut changed: EventWriter<CatalogChanged>,
) {
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    let reloaded = asset_events.read().any(|event| match event {
        AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id } => {
            *id == handle.id()
        }
        _ => false,
    });
    let load_failed = matches!(
        asset_server.get_load_state(&handle),
        Some(LoadState::Failed(_))
    );

    let reloaded = if reloaded {
        match catalogs.get(&handle) {
            Some(catalog) => Some(catalog),
            None => return,
        }
    } else {
        None
    };
    let Some(catalog) = next_catalog(reloaded, load_failed, &mut loader) else {
        return;
    };

    let event = activate_catalog(&catalog, &mut active, &mut layout, &mut progress);
    commands.insert_resource(request_textures(
        &active.catalog,
        event.generation,
        &asset_server,
        &placeholder.0,
    ));

    info!(
        "✓ Catalog generation {} active with {} machines",
        event.generation, event.machine_count
    );
    changed.write(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::machine_catalog::MachineRecord;
    use crate::engine::loading::progress::TextureStatus;

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
    fn failed_load_yields_one_empty_catalog() {
        let mut loader = CatalogLoader::default();

        let first = next_catalog(None, true, &mut loader);
        assert!(first.is_some_and(|c| c.is_empty()));
        assert!(next_catalog(None, true, &mut loader).is_none());
    }

    #[test]
    fn nothing_to_do_while_still_loading() {
        let mut loader = CatalogLoader::default();
        assert!(next_catalog(None, false, &mut loader).is_none());
    }

    #[test]
    fn reload_wins_over_earlier_failure() {
        let mut loader = CatalogLoader::default();
        next_catalog(None, true, &mut loader);

        let reloaded = catalog(&[1, 2]);
        let next = next_catalog(Some(&reloaded), true, &mut loader);
        assert_eq!(next.map(|c| c.len()), Some(2));
    }

    #[test]
    fn activation_validates_and_lays_out_the_catalog() {
        let mut active = ActiveCatalog::default();
        let mut layout = GridLayout::default();
        let mut progress = LoadingProgress::default();

        let event = activate_catalog(
            &catalog(&[1, 2, 1, 3]),
            &mut active,
            &mut layout,
            &mut progress,
        );

        assert_eq!(event.generation, 1);
        assert_eq!(event.machine_count, 3);
        assert_eq!(active.catalog.len(), 3);
        assert_eq!(layout.len(), 3);
        assert_eq!(progress.generation, 1);
        assert_eq!(progress.total(), 3);
        assert_eq!(progress.status(3), Some(TextureStatus::Pending));
        assert!(!progress.is_complete());
    }

    #[test]
    fn reactivation_starts_a_new_generation() {
        let mut active = ActiveCatalog::default();
        let mut layout = GridLayout::default();
        let mut progress = LoadingProgress::default();

        activate_catalog(&catalog(&[1, 2]), &mut active, &mut layout, &mut progress);
        progress.resolve(1, TextureStatus::Ready);

        let event = activate_catalog(&catalog(&[5]), &mut active, &mut layout, &mut progress);
        assert_eq!(event.generation, 2);
        assert_eq!(layout.len(), 1);
        assert_eq!(progress.generation, 2);
        assert_eq!(progress.status(1), None);
        assert_eq!(progress.pending(), 1);
    }

    #[test]
    fn empty_catalog_activates_complete() {
        let mut active = ActiveCatalog::default();
        let mut layout = GridLayout::default();
        let mut progress = LoadingProgress::default();

        let event = activate_catalog(
            &MachineCatalog::default(),
            &mut active,
            &mut layout,
            &mut progress,
        );
        assert_eq!(event.machine_count, 0);
        assert!(progress.is_complete());
        assert_eq!(progress.percent(), 100.0);
    }
}
