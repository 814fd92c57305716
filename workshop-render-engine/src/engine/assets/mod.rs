//! Machine catalog asset types.
//!
//! The catalog is a JSON asset listing every machine on the floor, loaded
//! through the asset server and hot reloaded when the file changes.

/// Catalog records, spec value flattening, validation and the active generation.
pub mod machine_catalog;
