//! wgpu render backend for the mirror scene.
//!
//! Renders lit meshes, mirror meshes that sample a cube environment map, and
//! the axes helper. Cube maps are captured into [`CubeRenderTarget`]s owned by
//! the renderer and keyed by the scene's env-map handles.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - A cube target is never sampled by the pass that writes it; mirrors using
//!   the target being captured are skipped during that capture.
//! - A cube target matches its camera's resolution before every capture.

mod cube_target;
mod gpu;
mod shaders;

pub use cube_target::{CUBE_FORMAT, CubeRenderTarget};
pub use gpu::{WgpuFrame, WgpuRenderer};

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cube target of {requested}px exceeds the device limit of {max}px")]
    CubeTooLarge { requested: u32, max: u32 },
}
