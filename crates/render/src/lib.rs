//! Rendering adapter: renderer-agnostic cameras and the mirror frame protocol.
//!
//! # Invariants
//! - Renderers read the scene; only the mirror rig toggles visibility, and it
//!   always restores it before the main pass.
//! - A camera's projection matrix changes only through
//!   [`PerspectiveCamera::update_projection_matrix`].
//!
//! Backends implement [`SceneRenderer`]. [`TraceRenderer`] records calls
//! instead of drawing and backs tests and headless runs.

mod camera;
mod cube_camera;
mod mirror;
mod orbit;
mod renderer;

pub use camera::PerspectiveCamera;
pub use cube_camera::{CUBE_FACES, CubeCamera, CubeFace};
pub use mirror::{MirrorRig, render_frame};
pub use orbit::OrbitControls;
pub use renderer::{RenderCall, SceneRenderer, TraceError, TraceRenderer};
