use crate::camera::PerspectiveCamera;
use crate::cube_camera::CubeCamera;
use glam::Vec3;
use mirrorscene_common::EnvMapId;
use mirrorscene_scene::Scene;

/// Renderer-agnostic interface. All backends implement this trait.
///
/// Both calls read the scene as it is at call time, including node
/// visibility; neither may mutate it.
pub trait SceneRenderer {
    type Error: std::error::Error;

    /// Render the six faces seen by `camera` into its cube target, creating
    /// or resizing the target to the camera's resolution first.
    fn capture_cube(&mut self, scene: &Scene, camera: &CubeCamera) -> Result<(), Self::Error>;

    /// Render the scene through the main camera.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), Self::Error>;
}

/// One call observed by [`TraceRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Capture {
        target: EnvMapId,
        position: Vec3,
        resolution: u32,
        /// Names of meshes that were visible during the capture.
        visible: Vec<String>,
    },
    Render {
        fov: f32,
        aspect: f32,
        visible: Vec<String>,
    },
}

/// Errors a [`TraceRenderer`] can be told to produce.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("capture into {0:?} failed")]
    CaptureFailed(EnvMapId),
}

/// Records render calls instead of drawing.
///
/// Used for tests and the headless CLI; also handy for logging what a frame
/// would contain.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    calls: Vec<RenderCall>,
    fail_captures: bool,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent capture return an error.
    pub fn fail_captures(&mut self, fail: bool) {
        self.fail_captures = fail;
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn drain_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    fn visible_meshes(scene: &Scene) -> Vec<String> {
        scene
            .draw_list()
            .iter()
            .filter_map(|item| scene.get(item.node).map(|n| n.name.clone()))
            .collect()
    }
}

impl SceneRenderer for TraceRenderer {
    type Error = TraceError;

    fn capture_cube(&mut self, scene: &Scene, camera: &CubeCamera) -> Result<(), TraceError> {
        if self.fail_captures {
            return Err(TraceError::CaptureFailed(camera.target()));
        }
        self.calls.push(RenderCall::Capture {
            target: camera.target(),
            position: camera.position,
            resolution: camera.resolution(),
            visible: Self::visible_meshes(scene),
        });
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), TraceError> {
        self.calls.push(RenderCall::Render {
            fov: camera.fov,
            aspect: camera.aspect,
            visible: Self::visible_meshes(scene),
        });
        Ok(())
    }
}

impl std::fmt::Display for RenderCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capture {
                target,
                position,
                resolution,
                visible,
            } => write!(
                f,
                "capture env{} at ({:.2}, {:.2}, {:.2}) {res}x{res} meshes=[{}]",
                target.0,
                position.x,
                position.y,
                position.z,
                visible.join(", "),
                res = resolution
            ),
            Self::Render {
                fov,
                aspect,
                visible,
            } => write!(
                f,
                "render fov={fov:.1} aspect={aspect:.3} meshes=[{}]",
                visible.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorscene_scene::{Geometry, Material, MeshData, Node};

    fn scene_with(names: &[&str]) -> Scene {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        for name in names {
            scene.add(None, Node::mesh(*name, MeshData::new(g, Material::default())));
        }
        scene
    }

    #[test]
    fn records_render_calls() {
        let scene = scene_with(&["a", "b"]);
        let cam = PerspectiveCamera::new(45.0, 2.0, 0.1, 10.0);
        let mut r = TraceRenderer::new();
        r.render(&scene, &cam).unwrap();
        assert_eq!(
            r.calls(),
            &[RenderCall::Render {
                fov: 45.0,
                aspect: 2.0,
                visible: vec!["a".into(), "b".into()],
            }]
        );
        assert!(r.calls()[0].to_string().contains("meshes=[a, b]"));
    }

    #[test]
    fn failing_capture_records_nothing() {
        let scene = scene_with(&["a"]);
        let mut r = TraceRenderer::new();
        r.fail_captures(true);
        let cube = CubeCamera::new(0.1, 10.0, 8, EnvMapId(3));
        assert!(r.capture_cube(&scene, &cube).is_err());
        assert!(r.drain_calls().is_empty());
    }
}
