use mirrorscene_common::NodeId;
use mirrorscene_scene::{NodeKind, Scene};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries for the CLI, logs and the debug panel.
pub struct SceneInspector;

impl SceneInspector {
    /// Count what the scene holds.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut summary = SceneSummary {
            nodes: scene.node_count(),
            ..SceneSummary::default()
        };
        scene.traverse(|_, node| match &node.kind {
            NodeKind::Mesh(mesh) => {
                summary.meshes += 1;
                if mesh.material.is_mirror() {
                    summary.mirrors += 1;
                }
                if node.name == "Sphere" {
                    summary.mirror_candidates += 1;
                }
                if let Some(g) = scene.geometry(mesh.geometry) {
                    summary.triangles += g.triangle_count();
                }
            }
            NodeKind::DirectionalLight(_) | NodeKind::HemisphereLight(_) => summary.lights += 1,
            NodeKind::Group | NodeKind::Axes { .. } => {}
        });
        summary.geometries = scene.geometries().count();
        tracing::debug!(
            nodes = summary.nodes,
            meshes = summary.meshes,
            triangles = summary.triangles,
            "scene summarised"
        );
        summary
    }

    /// Describe one mesh node.
    pub fn inspect_mesh(scene: &Scene, id: NodeId) -> Option<MeshInfo> {
        let node = scene.get(id)?;
        let mesh = node.as_mesh()?;
        let geometry = scene.geometry(mesh.geometry)?;
        Some(MeshInfo {
            id,
            name: node.name.clone(),
            position: scene.world_position(id).to_array(),
            vertices: geometry.vertex_count(),
            triangles: geometry.triangle_count(),
            mirror: mesh.material.is_mirror(),
        })
    }

    /// Every mesh in traversal order.
    pub fn list_meshes(scene: &Scene) -> Vec<MeshInfo> {
        scene
            .mesh_ids()
            .into_iter()
            .filter_map(|id| Self::inspect_mesh(scene, id))
            .collect()
    }
}

/// Summary of a scene for the inspector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub lights: usize,
    pub geometries: usize,
    pub triangles: usize,
    pub mirrors: usize,
    /// Meshes named `Sphere`; the first becomes the mirror.
    pub mirror_candidates: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} lights={} geometries={} triangles={} mirrors={} sphere_meshes={}",
            self.nodes,
            self.meshes,
            self.lights,
            self.geometries,
            self.triangles,
            self.mirrors,
            self.mirror_candidates
        )
    }
}

/// Detailed info about a single mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshInfo {
    pub id: NodeId,
    pub name: String,
    pub position: [f32; 3],
    pub vertices: usize,
    pub triangles: usize,
    pub mirror: bool,
}

impl std::fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh [{}] {} pos=({:.2}, {:.2}, {:.2}) verts={} tris={}{}",
            self.id.0,
            self.name,
            self.position[0],
            self.position[1],
            self.position[2],
            self.vertices,
            self.triangles,
            if self.mirror { " mirror" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use mirrorscene_scene::{DirectionalLight, Geometry, Material, MeshData, Node};

    fn sample() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let cube = scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        let root = scene.add(None, Node::group("Scene"));
        scene.add(Some(root), Node::mesh("Box", MeshData::new(cube, Material::default())));
        let sphere = scene.add(
            Some(root),
            Node::mesh("Sphere", MeshData::new(cube, Material::default()))
                .with_position(Vec3::new(1.0, 2.0, 3.0)),
        );
        scene.add(
            None,
            Node::new("Sun", NodeKind::DirectionalLight(DirectionalLight::default())),
        );
        (scene, sphere)
    }

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&Scene::new());
        assert_eq!(summary, SceneSummary::default());
    }

    #[test]
    fn summary_counts() {
        let (scene, _) = sample();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.meshes, 2);
        assert_eq!(summary.lights, 1);
        assert_eq!(summary.geometries, 1);
        assert_eq!(summary.triangles, 24);
        assert_eq!(summary.mirror_candidates, 1);
        assert_eq!(summary.mirrors, 0);
        assert!(summary.to_string().contains("meshes=2"));
    }

    #[test]
    fn inspect_mesh_found() {
        let (scene, sphere) = sample();
        let info = SceneInspector::inspect_mesh(&scene, sphere).unwrap();
        assert_eq!(info.name, "Sphere");
        assert_eq!(info.position, [1.0, 2.0, 3.0]);
        assert_eq!(info.triangles, 12);
        assert!(info.to_string().starts_with("Mesh [2] Sphere"));
    }

    #[test]
    fn inspect_non_mesh() {
        let (scene, _) = sample();
        assert!(SceneInspector::inspect_mesh(&scene, NodeId(0)).is_none());
        assert!(SceneInspector::inspect_mesh(&scene, NodeId(99)).is_none());
    }

    #[test]
    fn list_meshes_in_order() {
        let (scene, _) = sample();
        let names: Vec<_> = SceneInspector::list_meshes(&scene)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Box", "Sphere"]);
    }
}
