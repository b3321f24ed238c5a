use crate::camera::PerspectiveCamera;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const POLE_EPSILON: f32 = 1e-6;

/// Orbit-style camera controls: rotate around, pan, and dolly towards a
/// target point.
///
/// Input methods accumulate deltas; [`update`](Self::update) applies them to
/// a camera and resets them.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// (azimuth, polar) change in radians.
    pending_rotation: Vec2,
    pending_scale: f32,
    pending_pan: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            pending_rotation: Vec2::ZERO,
            pending_scale: 1.0,
            pending_pan: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        Self {
            min_distance,
            max_distance,
            ..Self::default()
        }
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    ///
    /// A drag across the full viewport height turns the camera once around.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_rotation.x -= TAU * delta.x / h * self.rotate_speed;
        self.pending_rotation.y -= TAU * delta.y / h * self.rotate_speed;
    }

    /// Queue a screen-space pan from a pointer drag of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &PerspectiveCamera) {
        let h = viewport_height.max(1.0);
        let distance = (camera.position - self.target).length();
        // Distance covered by the full viewport height at the target depth
        let visible = distance * (camera.fov.to_radians() * 0.5).tan();
        let forward = camera.forward();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let dx = 2.0 * delta.x * visible / h * self.pan_speed;
        let dy = 2.0 * delta.y * visible / h * self.pan_speed;
        self.pending_pan += -right * dx + up * dy;
    }

    /// Queue a dolly step. Positive `amount` moves towards the target.
    pub fn dolly(&mut self, amount: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        if amount > 0.0 {
            self.pending_scale *= step;
        } else if amount < 0.0 {
            self.pending_scale /= step;
        }
    }

    /// Apply queued input to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI * 0.5)
        };

        theta += self.pending_rotation.x;
        phi = (phi + self.pending_rotation.y).clamp(POLE_EPSILON, PI - POLE_EPSILON);

        let lower = self.min_distance.max(POLE_EPSILON);
        let upper = self.max_distance.max(lower);
        let radius = (radius * self.pending_scale).clamp(lower, upper);

        self.target += self.pending_pan;

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let new_position = self.target + new_offset;

        self.pending_rotation = Vec2::ZERO;
        self.pending_scale = 1.0;
        self.pending_pan = Vec3::ZERO;

        let moved = new_position.distance_squared(camera.position) > 1e-12
            || camera.target != self.target;
        camera.position = new_position;
        camera.look_at(self.target);
        moved
    }

    pub fn distance(&self, camera: &PerspectiveCamera) -> f32 {
        (camera.position - self.target).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(60.0, 1.0, 0.01, 100.0);
        cam.position = position;
        cam
    }

    #[test]
    fn update_without_input_keeps_position() {
        let mut controls = OrbitControls::new(0.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.05, 0.93, 2.75));
        let start = cam.position;
        controls.update(&mut cam);
        assert!(cam.position.distance(start) < 1e-5);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn distance_is_clamped() {
        let mut controls = OrbitControls::new(1.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 50.0));
        controls.update(&mut cam);
        assert!((controls.distance(&cam) - 10.0).abs() < 1e-4);

        for _ in 0..200 {
            controls.dolly(1.0);
        }
        controls.update(&mut cam);
        assert!((controls.distance(&cam) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn dolly_in_moves_closer() {
        let mut controls = OrbitControls::new(0.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        controls.dolly(1.0);
        assert!(controls.update(&mut cam));
        assert!((controls.distance(&cam) - 5.0 * 0.95).abs() < 1e-4);

        controls.dolly(-1.0);
        controls.update(&mut cam);
        assert!((controls.distance(&cam) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_preserves_distance_and_avoids_poles() {
        let mut controls = OrbitControls::new(0.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 3.0));
        controls.rotate(Vec2::new(120.0, 0.0), 600.0);
        controls.update(&mut cam);
        assert!((controls.distance(&cam) - 3.0).abs() < 1e-4);
        assert!(cam.position.x.abs() > 0.1);

        controls.rotate(Vec2::new(0.0, 10_000.0), 600.0);
        controls.update(&mut cam);
        assert!(cam.position.y > 2.9);
        assert!(cam.position.x.is_finite() && cam.position.z.is_finite());
        assert!((controls.distance(&cam) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::new(0.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 3.0));
        controls.update(&mut cam);
        let offset_before = cam.position - controls.target;

        controls.pan(Vec2::new(100.0, 0.0), 600.0, &cam);
        controls.update(&mut cam);
        // Dragging right moves the view left
        assert!(controls.target.x < 0.0);
        assert!((cam.position - controls.target).distance(offset_before) < 1e-4);
        assert_eq!(cam.target, controls.target);
    }

    #[test]
    fn new_target_reaims_camera() {
        let mut controls = OrbitControls::new(0.0, 10.0);
        let mut cam = camera_at(Vec3::new(0.0, 1.0, 3.0));
        controls.target = Vec3::new(0.0, 1.0, 0.0);
        assert!(controls.update(&mut cam));
        assert_eq!(cam.target, Vec3::new(0.0, 1.0, 0.0));
    }
}
