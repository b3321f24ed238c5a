//! The mirror scene: a model lit by a directional and a hemisphere light,
//! viewed through an orbiting perspective camera, with the mesh named
//! `Sphere` turned into a live mirror.
//!
//! # Invariants
//! - `config` is the only source of the fov and cube resolution; the camera
//!   and capture camera are updated from it whenever it changes.
//! - The camera projection is recomputed on every fov or aspect change.
//! - At most one mirror exists.

mod stage;

pub use stage::{ModelReport, Stage, StageEvent};
