use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::render_settings::PLACEHOLDER_TEXTURE_RGBA;

use crate::engine::assets::machine_catalog::MachineCatalog;
use crate::engine::loading::progress::{LoadingProgress, TextureStatus};

/// Neutral texture used for pending, failed and missing machine images.
#[derive(Resource, Clone)]
pub struct PlaceholderTexture(pub Handle<Image>);

#[derive(Debug, Clone)]
pub struct MachineTexture {
    pub machine_id: u32,
    pub handle: Handle<Image>,
    pub status: TextureStatus,
}

/// Texture handles requested for one catalog generation.
/// Replacing the resource drops the old handles, so late results for a
/// superseded catalog are never consumed.
#[derive(Resource, Debug, Clone, Default)]
pub struct MachineTextures {
    pub generation: u32,
    pub entries: Vec<MachineTexture>,
}

impl MachineTextures {
    /// Texture to bind for `machine_id`: the loaded image once ready,
    /// otherwise the placeholder.
    pub fn texture_for(&self, machine_id: u32, placeholder: &Handle<Image>) -> Handle<Image> {
        self.entries
            .iter()
            .find(|entry| entry.machine_id == machine_id)
            .filter(|entry| entry.status == TextureStatus::Ready)
            .map(|entry| entry.handle.clone())
            .unwrap_or_else(|| placeholder.clone())
    }
}

pub fn create_placeholder_texture(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let image = Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &PLACEHOLDER_TEXTURE_RGBA,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );
    commands.insert_resource(PlaceholderTexture(images.add(image)));
}

/// Start loading every machine image of `catalog`.
/// Entries without an image resolve immediately as `Missing`.
pub fn request_textures(
    catalog: &MachineCatalog,
    generation: u32,
    asset_server: &AssetServer,
    placeholder: &Handle<Image>,
) -> MachineTextures {
    let entries = catalog
        .machines
        .iter()
        .map(|machine| match machine.image.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => MachineTexture {
                machine_id: machine.id,
                handle: asset_server.load(path.to_string()),
                status: TextureStatus::Pending,
            },
            _ => {
                warn!(
                    "Machine {} ('{}') has no image, using placeholder",
                    machine.id, machine.name
                );
                MachineTexture {
                    machine_id: machine.id,
                    handle: placeholder.clone(),
                    status: TextureStatus::Missing,
                }
            }
        })
        .collect::<Vec<_>>();

    info!(
        "Requested {} machine textures (generation {generation})",
        entries
            .iter()
            .filter(|e| e.status == TextureStatus::Pending)
            .count()
    );

    MachineTextures {
        generation,
        entries,
    }
}

/// Map an asset server load state to a texture outcome. `None` while pending.
pub fn classify_load_state(state: Option<&LoadState>) -> Option<TextureStatus> {
    match state {
        Some(LoadState::Loaded) => Some(TextureStatus::Ready),
        Some(LoadState::Failed(_)) => Some(TextureStatus::Failed),
        _ => None,
    }
}

/// Record texture outcomes for the current generation.
///
/// `outcome` reports a terminal status for a pending handle. Failed entries
/// are rebound to the placeholder. Textures from another generation are left
/// alone, so late results for a superseded catalog never count.
pub fn poll_textures(
    textures: &mut MachineTextures,
    progress: &mut LoadingProgress,
    placeholder: Option<&Handle<Image>>,
    mut outcome: impl FnMut(&Handle<Image>) -> Option<TextureStatus>,
) {
    if !progress.catalog_loaded || progress.generation != textures.generation {
        return;
    }

    for entry in textures.entries.iter_mut() {
        if entry.status != TextureStatus::Pending {
            progress.resolve(entry.machine_id, entry.status);
            continue;
        }

        let Some(status) = outcome(&entry.handle) else {
            continue;
        };

        if status == TextureStatus::Failed {
            warn!(
                "Texture for machine {} failed to load, using placeholder",
                entry.machine_id
            );
            if let Some(placeholder) = placeholder {
                entry.handle = placeholder.clone();
            }
        }

        entry.status = status;
        progress.resolve(entry.machine_id, status);
    }
}

/// Poll pending texture loads and record outcomes in the loading progress.
pub fn check_texture_loading(
    mut textures: ResMut<MachineTextures>,
    mut progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
    placeholder: Option<Res<PlaceholderTexture>>,
) {
    poll_textures(
        &mut textures,
        &mut progress,
        placeholder.as_ref().map(|p| &p.0),
        |handle| {
            let state = asset_server.get_load_state(handle);
            if let Some(LoadState::Failed(err)) = &state {
                debug!("Texture load error: {err}");
            }
            classify_load_state(state.as_ref())
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_states_resolve() {
        assert_eq!(classify_load_state(None), None);
        assert_eq!(classify_load_state(Some(&LoadState::NotLoaded)), None);
        assert_eq!(classify_load_state(Some(&LoadState::Loading)), None);
        assert_eq!(
            classify_load_state(Some(&LoadState::Loaded)),
            Some(TextureStatus::Ready)
        );
    }

    #[test]
    fn unresolved_textures_fall_back_to_placeholder() {
        let placeholder = Handle::<Image>::default();
        let textures = MachineTextures {
            generation: 1,
            entries: vec![MachineTexture {
                machine_id: 4,
                handle: Handle::default(),
                status: TextureStatus::Pending,
            }],
        };

        assert_eq!(textures.texture_for(4, &placeholder), placeholder);
        assert_eq!(textures.texture_for(99, &placeholder), placeholder);
    }

    fn pending(machine_id: u32, handle: Handle<Image>) -> MachineTexture {
        MachineTexture {
            machine_id,
            handle,
            status: TextureStatus::Pending,
        }
    }

    fn weak(n: u128) -> Handle<Image> {
        Handle::weak_from_u128(n)
    }

    #[test]
    fn failed_texture_is_rebound_to_placeholder() {
        let placeholder = weak(1);
        let image = weak(2);
        let mut textures = MachineTextures {
            generation: 1,
            entries: vec![pending(7, image.clone())],
        };
        let mut progress = LoadingProgress::default();
        progress.begin(1, [7]);

        poll_textures(&mut textures, &mut progress, Some(&placeholder), |_| {
            Some(TextureStatus::Failed)
        });

        assert_eq!(textures.entries[0].handle, placeholder);
        assert_eq!(textures.entries[0].status, TextureStatus::Failed);
        assert_eq!(textures.texture_for(7, &placeholder), placeholder);
        assert_eq!(progress.status(7), Some(TextureStatus::Failed));
        assert!(progress.is_complete());
    }

    #[test]
    fn results_for_a_superseded_generation_are_ignored() {
        let mut textures = MachineTextures {
            generation: 1,
            entries: vec![pending(7, weak(2))],
        };
        let mut progress = LoadingProgress::default();
        progress.begin(2, [7]);

        let mut polled = 0;
        poll_textures(&mut textures, &mut progress, None, |_| {
            polled += 1;
            Some(TextureStatus::Ready)
        });

        assert_eq!(polled, 0);
        assert_eq!(textures.entries[0].status, TextureStatus::Pending);
        assert_eq!(progress.status(7), Some(TextureStatus::Pending));
    }

    #[test]
    fn pending_loads_resolve_as_they_finish() {
        let ready = weak(3);
        let mut textures = MachineTextures {
            generation: 1,
            entries: vec![
                pending(1, ready.clone()),
                pending(2, weak(4)),
                MachineTexture {
                    machine_id: 3,
                    handle: weak(1),
                    status: TextureStatus::Missing,
                },
            ],
        };
        let mut progress = LoadingProgress::default();
        progress.begin(1, [1, 2, 3]);

        poll_textures(&mut textures, &mut progress, None, |handle| {
            (*handle == ready).then_some(TextureStatus::Ready)
        });

        assert_eq!(progress.status(1), Some(TextureStatus::Ready));
        assert_eq!(progress.status(2), Some(TextureStatus::Pending));
        assert_eq!(progress.status(3), Some(TextureStatus::Missing));
        assert_eq!(textures.texture_for(1, &weak(1)), ready);
        assert!(!progress.is_complete());
    }
}
