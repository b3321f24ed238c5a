use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Slider range for the camera field of view, in degrees.
pub const FOV_RANGE: RangeInclusive<f32> = 1.0..=150.0;

/// Slider range for the edge length of the reflection cube target, in texels.
pub const CUBE_SIZE_RANGE: RangeInclusive<u32> = 1..=1024;

/// The live parameters exposed on the debug panel.
///
/// Values are mutated by panel callbacks and always stay inside
/// [`FOV_RANGE`] and [`CUBE_SIZE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub cube_render_target_size: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            cube_render_target_size: 512,
        }
    }
}

impl SceneConfig {
    /// Store a new field of view, clamped to the slider range.
    ///
    /// Non-finite values leave the config untouched. Returns the stored value.
    pub fn set_fov(&mut self, fov: f32) -> f32 {
        if fov.is_finite() {
            self.fov = fov.clamp(*FOV_RANGE.start(), *FOV_RANGE.end());
        }
        self.fov
    }

    /// Store a new cube target edge length, clamped to the slider range.
    pub fn set_cube_render_target_size(&mut self, size: u32) -> u32 {
        self.cube_render_target_size = size.clamp(*CUBE_SIZE_RANGE.start(), *CUBE_SIZE_RANGE.end());
        self.cube_render_target_size
    }

    /// Re-apply the range constraints, e.g. after deserializing.
    pub fn clamped(mut self) -> Self {
        if !self.fov.is_finite() {
            self.fov = Self::default().fov;
        }
        self.set_fov(self.fov);
        self.set_cube_render_target_size(self.cube_render_target_size);
        self
    }
}
