use glam::Vec3;
use mirrorscene_common::{Color, EnvMapId, GeometryId, NodeId, Transform};
use serde::{Deserialize, Serialize};

/// Surface description of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Diffuse surface lit by the scene lights.
    Standard { base_color: [f32; 4] },
    /// Unlit surface that shows the given cube environment map along the
    /// reflected view direction.
    Mirror { env_map: EnvMapId },
}

impl Default for Material {
    fn default() -> Self {
        Self::Standard {
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Material {
    pub fn is_mirror(&self) -> bool {
        matches!(self, Self::Mirror { .. })
    }
}

/// Mesh component of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub geometry: GeometryId,
    pub material: Material,
    /// Stored for parity with model data; no shadow pass consumes them.
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshData {
    pub fn new(geometry: GeometryId, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// Parallel light shining from its position towards the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            cast_shadow: false,
            shadow_bias: 0.0,
        }
    }
}

/// Ambient light blending from the ground colour (facing down) to the sky
/// colour (facing up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group,
    Mesh(MeshData),
    DirectionalLight(DirectionalLight),
    HemisphereLight(HemisphereLight),
    /// RGB axis lines of the given length along +X, +Y, +Z.
    Axes { size: f32 },
}

/// A node in the scene arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::DirectionalLight(_) | NodeKind::HemisphereLight(_)
        )
    }
}
