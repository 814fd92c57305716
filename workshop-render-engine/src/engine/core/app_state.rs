use bevy::prelude::*;

/// `Loading` shows the overlay until the scene is composed. A catalog change
/// while `Running` goes back to `Loading`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}
