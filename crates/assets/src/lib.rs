//! Model loading for the mirror scene.
//!
//! Models are imported into a standalone [`Scene`] which the caller grafts
//! into its own graph with [`Scene::adopt`]. Loading can run on a background
//! thread through [`ModelLoader`] so the frame loop never blocks on IO.
//!
//! # Naming
//! Imported nodes take the glTF node name, falling back to the mesh name and
//! then to `mesh_<index>`. Names are sanitised so lookups such as `"Sphere"`
//! behave the same for every exporter.

mod demo;
mod import;
mod loader;

pub use demo::demo_model;
pub use import::{import_gltf, sanitize_node_name};
pub use loader::{ModelLoader, ModelSource, PendingModel};
use mirrorscene_scene::Scene;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("model has no scene")]
    NoScene,
    #[error("loader thread stopped before delivering a model")]
    LoaderGone,
}

/// Load a model from its source on the calling thread.
pub fn load(source: &ModelSource) -> Result<Scene, AssetError> {
    match source {
        ModelSource::Builtin => Ok(demo_model()),
        ModelSource::Gltf(path) => import_gltf(path),
    }
}
