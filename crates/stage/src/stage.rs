use glam::Vec3;
use mirrorscene_common::{Color, NodeId, SceneConfig, StageSettings};
use mirrorscene_input::OrbitAction;
use mirrorscene_render::{MirrorRig, OrbitControls, PerspectiveCamera, SceneRenderer, render_frame};
use mirrorscene_scene::{DirectionalLight, HemisphereLight, Node, NodeKind, Scene};
use serde::Serialize;

/// Something that changed on the stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StageEvent {
    FovChanged(f32),
    CubeResized(u32),
    Resized { width: u32, height: u32 },
    ModelInstalled(ModelReport),
}

/// What [`Stage::install_model`] found in a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub roots: Vec<NodeId>,
    pub meshes: usize,
    /// The mesh turned into a mirror, if the model has one.
    pub mirror: Option<NodeId>,
}

/// Scene, camera, controls and the optional mirror, plus the live config.
///
/// The window layer drives it: panel changes go through [`set_fov`] and
/// [`set_cube_render_target_size`], window events through [`resize`] and
/// [`apply`], and each redraw through [`frame`].
///
/// [`set_fov`]: Self::set_fov
/// [`set_cube_render_target_size`]: Self::set_cube_render_target_size
/// [`resize`]: Self::resize
/// [`apply`]: Self::apply
/// [`frame`]: Self::frame
#[derive(Debug)]
pub struct Stage {
    config: SceneConfig,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    mirror: Option<MirrorRig>,
    mirror_name: String,
    mirror_near: f32,
    mirror_far: f32,
    viewport: (u32, u32),
    event_log: Vec<StageEvent>,
}

impl Stage {
    /// Build the empty stage: background, axes, lights, camera and controls.
    pub fn new(settings: &StageSettings, viewport: (u32, u32)) -> Self {
        let config = settings.scene.clamped();
        let viewport = (viewport.0.max(1), viewport.1.max(1));

        let mut scene = Scene::new();
        scene.set_background(Color::from_hex(settings.background));
        scene.add(None, Node::new("Axes", NodeKind::Axes { size: 1.0 }));
        scene.add(
            None,
            Node::new(
                "DirectionalLight",
                NodeKind::DirectionalLight(DirectionalLight {
                    color: Color::WHITE,
                    intensity: 1.0,
                    cast_shadow: true,
                    shadow_bias: 0.0001,
                }),
            )
            .with_position(Vec3::splat(50.0)),
        );
        scene.add(
            None,
            Node::new(
                "HemisphereLight",
                NodeKind::HemisphereLight(HemisphereLight {
                    sky_color: Color::from_hex(0xcccccc),
                    ground_color: Color::from_hex(0xffffff),
                    intensity: 1.0,
                }),
            )
            .with_position(Vec3::Y),
        );

        let mut camera = PerspectiveCamera::new(
            config.fov,
            aspect(viewport),
            settings.camera.near,
            settings.camera.far,
        );
        camera.position = Vec3::from_array(settings.camera.position);
        camera.look_at(Vec3::ZERO);

        let mut controls = OrbitControls::new(
            settings.controls.min_distance,
            settings.controls.max_distance,
        );
        controls.update(&mut camera);

        tracing::info!(
            fov = config.fov,
            cube = config.cube_render_target_size,
            width = viewport.0,
            height = viewport.1,
            "stage ready"
        );

        Self {
            config,
            scene,
            camera,
            controls,
            mirror: None,
            mirror_name: settings.mirror.mesh_name.clone(),
            mirror_near: settings.mirror.near,
            mirror_far: settings.mirror.far,
            viewport,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn mirror(&self) -> Option<&MirrorRig> {
        self.mirror.as_ref()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Set the field of view (clamped to the panel range) and recompute the
    /// projection. Returns the stored value.
    pub fn set_fov(&mut self, fov: f32) -> f32 {
        let fov = self.config.set_fov(fov);
        if fov != self.camera.fov {
            self.camera.set_fov(fov);
            self.event_log.push(StageEvent::FovChanged(fov));
        }
        fov
    }

    /// Set the cube map edge length (clamped to the panel range). The
    /// renderer recreates the target before the next capture. Returns the
    /// stored value.
    pub fn set_cube_render_target_size(&mut self, size: u32) -> u32 {
        let previous = self.config.cube_render_target_size;
        let size = self.config.set_cube_render_target_size(size);
        if let Some(rig) = &mut self.mirror {
            rig.set_resolution(size);
        }
        if size != previous {
            self.event_log.push(StageEvent::CubeResized(size));
        }
        size
    }

    /// Window resized: update aspect and viewport. Zero sizes count as 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = (width.max(1), height.max(1));
        self.viewport = viewport;
        self.camera.set_aspect(aspect(viewport));
        self.event_log.push(StageEvent::Resized {
            width: viewport.0,
            height: viewport.1,
        });
    }

    /// Add a loaded model to the scene.
    ///
    /// Every mesh is flagged to cast and receive shadows. The first mesh
    /// carrying the mirror name becomes the mirror, and the controls turn to
    /// face it. A model without that mesh simply has no mirror.
    pub fn install_model(&mut self, model: Scene) -> ModelReport {
        let first_new = self.scene.node_count() as u32;
        let roots = self.scene.adopt(None, model);

        let meshes: Vec<NodeId> = self
            .scene
            .mesh_ids()
            .into_iter()
            .filter(|id| id.0 >= first_new)
            .collect();
        for &id in &meshes {
            if let Some(mesh) = self.scene.get_mut(id).and_then(Node::as_mesh_mut) {
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
            }
        }

        let mut mirror = None;
        if self.mirror.is_none() {
            let candidate = meshes.iter().copied().find(|&id| {
                self.scene
                    .get(id)
                    .is_some_and(|n| n.name == self.mirror_name)
            });
            match candidate {
                Some(id) => {
                    self.mirror = MirrorRig::attach(
                        &mut self.scene,
                        id,
                        self.mirror_near,
                        self.mirror_far,
                        self.config.cube_render_target_size,
                    );
                    if self.mirror.is_some() {
                        self.controls.target = self.scene.world_position(id);
                        self.controls.update(&mut self.camera);
                        mirror = Some(id);
                    }
                }
                None => tracing::debug!(name = %self.mirror_name, "model has no mirror mesh"),
            }
        }

        let report = ModelReport {
            roots,
            meshes: meshes.len(),
            mirror,
        };
        tracing::info!(meshes = report.meshes, mirror = report.mirror.is_some(), "model installed");
        self.event_log.push(StageEvent::ModelInstalled(report.clone()));
        report
    }

    /// Feed a pointer gesture to the orbit controls and move the camera.
    pub fn apply(&mut self, action: OrbitAction) -> bool {
        let height = self.viewport.1 as f32;
        match action {
            OrbitAction::Rotate(delta) => self.controls.rotate(delta, height),
            OrbitAction::Pan(delta) => self.controls.pan(delta, height, &self.camera),
            OrbitAction::Dolly(amount) => self.controls.dolly(amount),
        }
        self.controls.update(&mut self.camera)
    }

    /// Render one frame: refresh the mirror, then draw through the camera.
    pub fn frame<R>(&mut self, renderer: &mut R) -> Result<(), R::Error>
    where
        R: SceneRenderer + ?Sized,
    {
        render_frame(renderer, &mut self.scene, &self.camera, self.mirror.as_mut())
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.event_log)
    }
}

fn aspect((width, height): (u32, u32)) -> f32 {
    width as f32 / height as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use mirrorscene_assets::demo_model;
    use mirrorscene_render::{RenderCall, TraceRenderer};
    use mirrorscene_scene::{Geometry, Material, MeshData};

    fn stage() -> Stage {
        Stage::new(&StageSettings::default(), (800, 600))
    }

    fn model_without_sphere() -> Scene {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        scene.add(None, Node::mesh("Cube", MeshData::new(g, Material::default())));
        scene
    }

    #[test]
    fn new_stage_matches_defaults() {
        let s = stage();
        assert_eq!(s.camera().fov, 60.0);
        assert!((s.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(s.camera().near, 0.001);
        assert_eq!(s.camera().far, 5000.0);
        assert!((s.camera().position - Vec3::new(0.05, 0.93, 2.75)).length() < 1e-4);
        assert_eq!(s.scene().background(), Color::from_hex(0xdddddd));
        assert_eq!(s.controls().max_distance, 10.0);
        assert!(s.mirror().is_none());

        let lighting = s.scene().lighting();
        let (dir, light) = lighting.directional.unwrap();
        assert!((dir - Vec3::splat(1.0).normalize()).length() < 1e-6);
        assert!(light.cast_shadow);
        assert_eq!(light.shadow_bias, 0.0001);
        let hemi = lighting.hemisphere.unwrap();
        assert_eq!(hemi.sky_color, Color::from_hex(0xcccccc));
        assert_eq!(hemi.ground_color, Color::WHITE);
        assert_eq!(s.scene().line_list().len(), 1);
    }

    #[test]
    fn fov_updates_camera_projection() {
        let mut s = stage();
        let before = s.camera().projection_matrix();
        assert_eq!(s.set_fov(90.0), 90.0);
        assert_eq!(s.camera().fov, 90.0);
        assert_ne!(s.camera().projection_matrix(), before);

        let mut expected = s.camera().clone();
        expected.update_projection_matrix();
        assert_eq!(s.camera().projection_matrix(), expected.projection_matrix());
        assert_eq!(s.events(), &[StageEvent::FovChanged(90.0)]);
    }

    #[test]
    fn fov_is_clamped() {
        let mut s = stage();
        assert_eq!(s.set_fov(500.0), 150.0);
        assert_eq!(s.set_fov(0.0), 1.0);
        assert_eq!(s.camera().fov, 1.0);
    }

    #[test]
    fn cube_resize_reaches_next_capture() {
        let mut s = stage();
        s.install_model(demo_model());
        assert_eq!(s.set_cube_render_target_size(128), 128);
        assert_eq!(s.mirror().unwrap().camera().resolution(), 128);

        let mut r = TraceRenderer::new();
        s.frame(&mut r).unwrap();
        match &r.calls()[0] {
            RenderCall::Capture { resolution, .. } => assert_eq!(*resolution, 128),
            other => panic!("expected capture, got {other:?}"),
        }
    }

    #[test]
    fn cube_size_before_model_applies_at_install() {
        let mut s = stage();
        assert_eq!(s.set_cube_render_target_size(4096), 1024);
        s.install_model(demo_model());
        assert_eq!(s.mirror().unwrap().camera().resolution(), 1024);
    }

    #[test]
    fn sphere_becomes_mirror_hidden_only_during_capture() {
        let mut s = stage();
        let report = s.install_model(demo_model());
        let sphere = report.mirror.unwrap();
        assert_eq!(report.meshes, 6);

        let node = s.scene().get(sphere).unwrap();
        let mesh = node.as_mesh().unwrap();
        assert!(mesh.material.is_mirror());
        assert!(mesh.cast_shadow && mesh.receive_shadow);
        assert_eq!(s.controls().target, s.scene().world_position(sphere));

        let mut r = TraceRenderer::new();
        s.frame(&mut r).unwrap();
        let calls = r.drain_calls();
        assert_eq!(calls.len(), 2);
        let RenderCall::Capture { visible, position, .. } = &calls[0] else {
            panic!("expected capture first");
        };
        assert!(!visible.iter().any(|n| n == "Sphere"));
        assert_eq!(*position, s.scene().world_position(sphere));
        let RenderCall::Render { visible, .. } = &calls[1] else {
            panic!("expected render second");
        };
        assert!(visible.iter().any(|n| n == "Sphere"));
        assert!(s.scene().get(sphere).unwrap().visible);
    }

    #[test]
    fn model_without_sphere_renders_plainly() {
        let mut s = stage();
        let report = s.install_model(model_without_sphere());
        assert!(report.mirror.is_none());
        assert!(s.mirror().is_none());
        assert_eq!(s.controls().target, Vec3::ZERO);

        let mut r = TraceRenderer::new();
        s.frame(&mut r).unwrap();
        assert!(matches!(r.calls(), [RenderCall::Render { .. }]));
    }

    #[test]
    fn frames_render_before_model_arrives() {
        let mut s = stage();
        let mut r = TraceRenderer::new();
        s.frame(&mut r).unwrap();
        s.frame(&mut r).unwrap();
        assert_eq!(r.calls().len(), 2);
    }

    #[test]
    fn only_first_sphere_is_mirrored() {
        let mut s = stage();
        let mut model = Scene::new();
        let g = model.add_geometry(Geometry::uv_sphere(1.0, 8, 6));
        model.add(None, Node::mesh("Sphere", MeshData::new(g, Material::default())));
        model.add(None, Node::mesh("Sphere", MeshData::new(g, Material::default())));

        let report = s.install_model(model);
        let mirror = report.mirror.unwrap();
        assert_eq!(report.roots[0], mirror);
        let mirrors = s
            .scene()
            .mesh_ids()
            .into_iter()
            .filter(|&id| s.scene().get(id).unwrap().as_mesh().unwrap().material.is_mirror())
            .count();
        assert_eq!(mirrors, 1);

        // A second model never adds a second mirror
        let again = s.install_model(demo_model());
        assert!(again.mirror.is_none());
    }

    #[test]
    fn resize_sets_aspect_and_viewport() {
        let mut s = stage();
        s.resize(1920, 1080);
        assert_eq!(s.viewport(), (1920, 1080));
        assert!((s.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);

        s.resize(0, 0);
        assert_eq!(s.viewport(), (1, 1));
        assert_eq!(s.camera().aspect, 1.0);
        assert!(s.camera().projection_matrix().is_finite());
    }

    #[test]
    fn orbit_actions_move_camera() {
        let mut s = stage();
        let before = s.camera().position;
        assert!(s.apply(OrbitAction::Rotate(Vec2::new(40.0, 0.0))));
        assert_ne!(s.camera().position, before);

        let distance = s.controls().distance(s.camera());
        s.apply(OrbitAction::Dolly(1.0));
        assert!(s.controls().distance(s.camera()) < distance);
    }

    #[test]
    fn events_drain() {
        let mut s = stage();
        s.set_fov(45.0);
        s.set_fov(45.0);
        s.resize(10, 10);
        s.set_cube_render_target_size(64);
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![
                StageEvent::FovChanged(45.0),
                StageEvent::Resized {
                    width: 10,
                    height: 10
                },
                StageEvent::CubeResized(64),
            ]
        );
        assert!(s.events().is_empty());
    }
}
