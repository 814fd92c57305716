pub mod assets;
pub mod camera;
pub mod core;
pub mod layout;
pub mod lighting;
pub mod loading;
pub mod scene;
pub mod theme;
