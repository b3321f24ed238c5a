use crate::camera::PerspectiveCamera;
use crate::cube_camera::CubeCamera;
use crate::renderer::SceneRenderer;
use mirrorscene_common::NodeId;
use mirrorscene_scene::{Material, Scene};

/// A mesh that shows a live reflection of its surroundings, and the cube
/// camera that captures them.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorRig {
    mesh: NodeId,
    camera: CubeCamera,
}

impl MirrorRig {
    /// Turn the mesh `mesh` into a mirror: allocate a cube target, point a
    /// cube camera at it and swap the mesh material for one sampling it.
    ///
    /// Returns `None` if `mesh` is not a mesh node of `scene`.
    pub fn attach(scene: &mut Scene, mesh: NodeId, near: f32, far: f32, resolution: u32) -> Option<Self> {
        scene.get(mesh)?.as_mesh()?;
        let env_map = scene.allocate_env_map();
        let data = scene.get_mut(mesh)?.as_mesh_mut()?;
        data.material = Material::Mirror { env_map };

        let mut camera = CubeCamera::new(near, far, resolution, env_map);
        camera.position = scene.world_position(mesh);
        tracing::debug!(?mesh, ?env_map, resolution, "mirror attached");
        Some(Self { mesh, camera })
    }

    pub fn mesh(&self) -> NodeId {
        self.mesh
    }

    pub fn camera(&self) -> &CubeCamera {
        &self.camera
    }

    pub fn set_resolution(&mut self, resolution: u32) {
        self.camera.set_size(resolution);
    }

    /// Refresh the reflection.
    ///
    /// The mesh is hidden so it does not reflect itself, the capture camera
    /// moves to the mesh's current world position, the six faces are
    /// recaptured, and the mesh is shown again. The mesh is shown again even
    /// when the capture fails.
    pub fn capture<R>(&mut self, renderer: &mut R, scene: &mut Scene) -> Result<(), R::Error>
    where
        R: SceneRenderer + ?Sized,
    {
        scene.set_visible(self.mesh, false);
        self.camera.position = scene.world_position(self.mesh);
        let result = renderer.capture_cube(scene, &self.camera);
        scene.set_visible(self.mesh, true);
        result
    }
}

/// One frame: refresh the mirror (if any), then render through `camera`.
pub fn render_frame<R>(
    renderer: &mut R,
    scene: &mut Scene,
    camera: &PerspectiveCamera,
    mirror: Option<&mut MirrorRig>,
) -> Result<(), R::Error>
where
    R: SceneRenderer + ?Sized,
{
    if let Some(rig) = mirror {
        rig.capture(renderer, scene)?;
    }
    renderer.render(scene, camera)
}
