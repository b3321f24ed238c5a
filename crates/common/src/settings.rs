//! Startup settings, loaded from an optional YAML file.
//!
//! Every field has a default so a partial file (or no file) is valid. Only
//! [`SceneConfig`] stays live after startup; the rest is consumed once when the
//! stage is built.

use crate::config::SceneConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.05, 0.93, 2.75],
            near: 0.001,
            far: 5000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: 10.0,
        }
    }
}

/// Which mesh becomes the mirror, and the capture camera clip planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    pub mesh_name: String,
    pub near: f32,
    pub far: f32,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            mesh_name: "Sphere".into(),
            near: 0.1,
            far: 5000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Everything needed to build the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// glTF model to load. `None` selects the built-in demo model.
    pub model: Option<PathBuf>,
    pub scene: SceneConfig,
    /// Background colour as `0xRRGGBB`.
    pub background: u32,
    pub camera: CameraSettings,
    pub controls: ControlsSettings,
    pub mirror: MirrorSettings,
    pub window: WindowSettings,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            model: None,
            scene: SceneConfig::default(),
            background: 0xdddddd,
            camera: CameraSettings::default(),
            controls: ControlsSettings::default(),
            mirror: MirrorSettings::default(),
            window: WindowSettings::default(),
        }
    }
}

impl StageSettings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_yaml(&text)?;
        tracing::debug!("settings loaded from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Parse settings from YAML text and validate them.
    pub fn from_yaml(text: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = serde_yaml::from_str(text)?;
        settings.scene = settings.scene.clamped();
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(SettingsError::Invalid {
                field: "camera",
                reason: format!(
                    "need 0 < near < far, got near={} far={}",
                    self.camera.near, self.camera.far
                ),
            });
        }
        if !(self.mirror.near > 0.0 && self.mirror.far > self.mirror.near) {
            return Err(SettingsError::Invalid {
                field: "mirror",
                reason: format!(
                    "need 0 < near < far, got near={} far={}",
                    self.mirror.near, self.mirror.far
                ),
            });
        }
        if self.controls.min_distance < 0.0
            || self.controls.max_distance < self.controls.min_distance
        {
            return Err(SettingsError::Invalid {
                field: "controls",
                reason: format!(
                    "need 0 <= min_distance <= max_distance, got {}..{}",
                    self.controls.min_distance, self.controls.max_distance
                ),
            });
        }
        if self.background > 0xff_ffff {
            return Err(SettingsError::Invalid {
                field: "background",
                reason: format!("{:#x} is not a 0xRRGGBB colour", self.background),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let s = StageSettings::from_yaml("{}").unwrap();
        assert_eq!(s, StageSettings::default());
        assert_eq!(s.mirror.mesh_name, "Sphere");
        assert_eq!(s.background, 0xdddddd);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let s = StageSettings::from_yaml(
            "model: models/esher.gltf\nscene:\n  fov: 75\ncontrols:\n  max_distance: 20\n",
        )
        .unwrap();
        assert_eq!(s.model.as_deref(), Some(Path::new("models/esher.gltf")));
        assert_eq!(s.scene.fov, 75.0);
        assert_eq!(s.scene.cube_render_target_size, 512);
        assert_eq!(s.controls.max_distance, 20.0);
        assert_eq!(s.controls.min_distance, 0.0);
    }

    #[test]
    fn scene_values_are_clamped_on_load() {
        let s = StageSettings::from_yaml("scene:\n  fov: 500\n  cube_render_target_size: 0\n")
            .unwrap();
        assert_eq!(s.scene.fov, 150.0);
        assert_eq!(s.scene.cube_render_target_size, 1);
    }

    #[test]
    fn invalid_clip_planes_are_rejected() {
        let err = StageSettings::from_yaml("camera:\n  near: 10\n  far: 1\n").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "camera", .. }));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "window:\n  width: 800\n  height: 600").unwrap();
        let s = StageSettings::load(tmp.path()).unwrap();
        assert_eq!(s.window.width, 800);
        assert_eq!(s.window.height, 600);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StageSettings::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
