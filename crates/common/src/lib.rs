//! Shared types for the mirror scene workspace.
//!
//! # Invariants
//! - `SceneConfig` values always sit inside their slider ranges.
//! - Ids are plain indices; they are only meaningful for the scene that issued them.

pub mod config;
pub mod settings;
pub mod types;

pub use config::{CUBE_SIZE_RANGE, FOV_RANGE, SceneConfig};
pub use settings::{
    CameraSettings, ControlsSettings, MirrorSettings, SettingsError, StageSettings, WindowSettings,
};
pub use types::{Color, EnvMapId, GeometryId, NodeId, Transform};
