use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` at `target`.
///
/// The projection matrix is cached: after changing `fov`, `aspect`, `near`
/// or `far`, call [`update_projection_matrix`](Self::update_projection_matrix)
/// before the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Recompute the cached projection from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        );
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.update_projection_matrix();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn projection_is_cached_until_updated() {
        let mut cam = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        let before = cam.projection_matrix();
        cam.fov = 90.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 100.0)
        );
    }

    #[test]
    fn set_fov_recomputes() {
        let mut cam = PerspectiveCamera::new(60.0, 2.0, 0.1, 100.0);
        cam.set_fov(30.0);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(30f32.to_radians(), 2.0, 0.1, 100.0)
        );
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut cam = PerspectiveCamera::default();
        cam.position = Vec3::new(0.05, 0.93, 2.75);
        cam.look_at(Vec3::ZERO);
        let clip = cam.view_projection().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
    }
}
