use glam::{Mat4, Vec3};
use mirrorscene_common::EnvMapId;

/// One face of a cube map, in array-layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

pub const CUBE_FACES: [CubeFace; 6] = [
    CubeFace::PositiveX,
    CubeFace::NegativeX,
    CubeFace::PositiveY,
    CubeFace::NegativeY,
    CubeFace::PositiveZ,
    CubeFace::NegativeZ,
];

impl CubeFace {
    /// Viewing direction and up vector for this face.
    pub fn basis(self) -> (Vec3, Vec3) {
        match self {
            Self::PositiveX => (Vec3::X, Vec3::NEG_Y),
            Self::NegativeX => (Vec3::NEG_X, Vec3::NEG_Y),
            Self::PositiveY => (Vec3::Y, Vec3::Z),
            Self::NegativeY => (Vec3::NEG_Y, Vec3::NEG_Z),
            Self::PositiveZ => (Vec3::Z, Vec3::NEG_Y),
            Self::NegativeZ => (Vec3::NEG_Z, Vec3::NEG_Y),
        }
    }

    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Captures the scene in six 90° views from a point into a cube target.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeCamera {
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    /// Edge length of each face, in texels.
    resolution: u32,
    target: EnvMapId,
}

impl CubeCamera {
    pub fn new(near: f32, far: f32, resolution: u32, target: EnvMapId) -> Self {
        Self {
            position: Vec3::ZERO,
            near,
            far,
            resolution: resolution.max(1),
            target,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Request a new face size; renderers resize the target before the next capture.
    pub fn set_size(&mut self, resolution: u32) {
        self.resolution = resolution.max(1);
    }

    pub fn target(&self) -> EnvMapId {
        self.target
    }

    /// View-projection for one face.
    ///
    /// Rasterisation puts NDC +Y on texture row 0, while cube sampling puts
    /// each face's `up` vector on the last row, so the projection flips Y.
    /// That flip reverses triangle winding in the capture pass.
    pub fn face_view_projection(&self, face: CubeFace) -> Mat4 {
        let (dir, up) = face.basis();
        let view = Mat4::look_at_rh(self.position, self.position + dir, up);
        let projection = Mat4::perspective_rh(90f32.to_radians(), 1.0, self.near, self.far);
        Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0)) * projection * view
    }

    pub fn face_view_projections(&self) -> [Mat4; 6] {
        CUBE_FACES.map(|face| self.face_view_projection(face))
    }
}
