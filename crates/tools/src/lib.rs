//! Developer tooling: scene inspector and frame statistics.
//!
//! # Invariants
//! - Tools only read the scene.

pub mod inspector;
pub mod stats;

pub use inspector::{MeshInfo, SceneInspector, SceneSummary};
pub use stats::FrameStats;
