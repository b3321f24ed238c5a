use crate::geometry::Geometry;
use crate::node::{DirectionalLight, HemisphereLight, Material, Node, NodeKind};
use glam::{Mat4, Vec3};
use mirrorscene_common::{Color, EnvMapId, GeometryId, NodeId};

/// A visible mesh, flattened for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: GeometryId,
    pub material: Material,
}

/// A visible axes helper, flattened for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItem {
    pub node: NodeId,
    pub world: Mat4,
    pub size: f32,
}

/// The lights a renderer needs for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lighting {
    /// Unit vector pointing from the surface towards the light, with the light.
    pub directional: Option<(Vec3, DirectionalLight)>,
    pub hemisphere: Option<HemisphereLight>,
}

/// Arena-backed scene graph.
///
/// Nodes are never removed, so a [`NodeId`] stays valid for the lifetime of
/// the scene that issued it.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    geometries: Vec<Geometry>,
    background: Color,
    env_maps: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            geometries: Vec::new(),
            background: Color::new(0.0, 0.0, 0.0),
            env_maps: 0,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Insert a node under `parent`, or as a root when `parent` is `None`.
    ///
    /// # Panics
    /// If `parent` was not issued by this scene.
    pub fn add(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = parent;
        node.children.clear();
        match parent {
            Some(p) => self.nodes[p.0 as usize].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        let id = GeometryId(self.geometries.len() as u32);
        self.geometries.push(geometry);
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0 as usize)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &Geometry)> {
        self.geometries
            .iter()
            .enumerate()
            .map(|(i, g)| (GeometryId(i as u32), g))
    }

    /// Reserve a handle for a new cube environment map.
    pub fn allocate_env_map(&mut self) -> EnvMapId {
        let id = EnvMapId(self.env_maps);
        self.env_maps += 1;
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set a node's own visibility flag. Returns `false` for unknown ids.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Depth-first pre-order walk over every node, visible or not.
    pub fn traverse(&self, mut f: impl FnMut(NodeId, &Node)) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            f(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Ids of every mesh node in traversal order.
    pub fn mesh_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.traverse(|id, node| {
            if node.as_mesh().is_some() {
                ids.push(id);
            }
        });
        ids
    }

    /// First mesh in traversal order whose name matches exactly.
    pub fn find_mesh(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.traverse(|id, node| {
            if found.is_none() && node.as_mesh().is_some() && node.name == name {
                found = Some(id);
            }
        });
        found
    }

    /// Local-to-world matrix of a node.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let Some(node) = self.get(cur) else { break };
            m = node.transform.matrix() * m;
            cursor = node.parent;
        }
        m
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// Graft every root of `other` under `parent` (or as roots).
    ///
    /// Node, geometry and env-map handles inside `other` are remapped into
    /// this scene. Returns the new ids of `other`'s roots.
    pub fn adopt(&mut self, parent: Option<NodeId>, other: Scene) -> Vec<NodeId> {
        let node_base = self.nodes.len() as u32;
        let geometry_base = self.geometries.len() as u32;
        let env_base = self.env_maps;

        self.geometries.extend(other.geometries);
        self.env_maps += other.env_maps;

        for mut node in other.nodes {
            node.parent = match node.parent {
                Some(p) => Some(NodeId(p.0 + node_base)),
                None => parent,
            };
            for child in &mut node.children {
                child.0 += node_base;
            }
            if let NodeKind::Mesh(mesh) = &mut node.kind {
                mesh.geometry.0 += geometry_base;
                if let Material::Mirror { env_map } = &mut mesh.material {
                    env_map.0 += env_base;
                }
            }
            self.nodes.push(node);
        }

        let new_roots: Vec<NodeId> = other
            .roots
            .iter()
            .map(|r| NodeId(r.0 + node_base))
            .collect();
        match parent {
            Some(p) => self.nodes[p.0 as usize].children.extend(&new_roots),
            None => self.roots.extend(&new_roots),
        }
        tracing::debug!(
            nodes = self.nodes.len() as u32 - node_base,
            geometries = self.geometries.len() as u32 - geometry_base,
            "adopted scene"
        );
        new_roots
    }

    /// Walk the visible part of the graph with accumulated world matrices.
    fn visit_visible(&self, mut f: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            f(id, node, world);
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    /// Every mesh that would appear in a frame rendered right now.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.visit_visible(|id, node, world| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                items.push(DrawItem {
                    node: id,
                    world,
                    geometry: mesh.geometry,
                    material: mesh.material,
                });
            }
        });
        items
    }

    pub fn line_list(&self) -> Vec<LineItem> {
        let mut items = Vec::new();
        self.visit_visible(|id, node, world| {
            if let NodeKind::Axes { size } = node.kind {
                items.push(LineItem {
                    node: id,
                    world,
                    size,
                });
            }
        });
        items
    }

    /// First visible directional and hemisphere light.
    pub fn lighting(&self) -> Lighting {
        let mut lighting = Lighting::default();
        self.visit_visible(|_, node, world| match node.kind {
            NodeKind::DirectionalLight(light) if lighting.directional.is_none() => {
                // Directional lights aim at the origin
                let towards = world.transform_point3(Vec3::ZERO);
                let dir = towards.try_normalize().unwrap_or(Vec3::Y);
                lighting.directional = Some((dir, light));
            }
            NodeKind::HemisphereLight(light) if lighting.hemisphere.is_none() => {
                lighting.hemisphere = Some(light);
            }
            _ => {}
        });
        lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MeshData;
    use mirrorscene_common::Transform;

    fn mesh_node(scene: &mut Scene, name: &str) -> Node {
        let g = scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        Node::mesh(name, MeshData::new(g, Material::default()))
    }

    #[test]
    fn add_links_parent_and_children() {
        let mut scene = Scene::new();
        let root = scene.add(None, Node::group("root"));
        let child = scene.add(Some(root), Node::group("child"));
        assert_eq!(scene.roots(), &[root]);
        assert_eq!(scene.get(root).unwrap().children(), &[child]);
        assert_eq!(scene.get(child).unwrap().parent(), Some(root));
    }

    #[test]
    fn node_copied_from_another_scene_gets_fresh_links() {
        let mut source = Scene::new();
        let root = source.add(None, Node::group("root"));
        source.add(Some(root), Node::group("leaf"));
        source.add(Some(root), Node::group("leaf2"));
        let copied = source.get(root).unwrap().clone();
        assert_eq!(copied.children().len(), 2);

        let mut scene = Scene::new();
        let id = scene.add(None, copied);
        assert!(scene.get(id).unwrap().children().is_empty());
        assert_eq!(scene.get(id).unwrap().parent(), None);

        let mut visited = Vec::new();
        scene.traverse(|id, _| visited.push(id));
        assert_eq!(visited, [id]);
    }

    #[test]
    fn traverse_is_depth_first_preorder() {
        let mut scene = Scene::new();
        let a = scene.add(None, Node::group("a"));
        scene.add(Some(a), Node::group("a1"));
        let a2 = scene.add(Some(a), Node::group("a2"));
        scene.add(Some(a2), Node::group("a2x"));
        scene.add(None, Node::group("b"));

        let mut names = Vec::new();
        scene.traverse(|_, n| names.push(n.name.clone()));
        assert_eq!(names, ["a", "a1", "a2", "a2x", "b"]);
    }

    #[test]
    fn find_mesh_ignores_groups_and_returns_first() {
        let mut scene = Scene::new();
        scene.add(None, Node::group("Sphere"));
        let m1 = mesh_node(&mut scene, "Sphere");
        let first = scene.add(None, m1);
        let m2 = mesh_node(&mut scene, "Sphere");
        scene.add(None, m2);
        assert_eq!(scene.find_mesh("Sphere"), Some(first));
        assert_eq!(scene.find_mesh("sphere"), None);
    }

    #[test]
    fn world_position_composes_parents() {
        let mut scene = Scene::new();
        let root = scene.add(
            None,
            Node::group("root").with_transform(Transform {
                scale: Vec3::splat(2.0),
                ..Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
            }),
        );
        let child = scene.add(
            Some(root),
            Node::group("child").with_position(Vec3::new(0.0, 1.0, 0.0)),
        );
        assert_eq!(scene.world_position(child), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn invisible_parent_hides_subtree() {
        let mut scene = Scene::new();
        let group = scene.add(None, Node::group("g"));
        let m = mesh_node(&mut scene, "inner");
        let inner = scene.add(Some(group), m);
        assert_eq!(scene.draw_list().len(), 1);

        scene.set_visible(group, false);
        assert!(scene.draw_list().is_empty());

        scene.set_visible(group, true);
        scene.set_visible(inner, false);
        assert!(scene.draw_list().is_empty());
        assert!(!scene.set_visible(NodeId(99), true));
    }

    #[test]
    fn adopt_remaps_handles() {
        let mut scene = Scene::new();
        let holder = scene.add(None, Node::group("holder"));
        scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        scene.allocate_env_map();

        let mut model = Scene::new();
        let model_root = model.add(None, Node::group("Scene"));
        let g = model.add_geometry(Geometry::cuboid(Vec3::ONE));
        let env = model.allocate_env_map();
        model.add(
            Some(model_root),
            Node::mesh("Sphere", MeshData::new(g, Material::Mirror { env_map: env })),
        );

        let roots = scene.adopt(Some(holder), model);
        assert_eq!(roots.len(), 1);
        assert_eq!(scene.get(roots[0]).unwrap().parent(), Some(holder));

        let sphere = scene.find_mesh("Sphere").unwrap();
        let mesh = scene.get(sphere).unwrap().as_mesh().unwrap();
        assert_eq!(mesh.geometry, GeometryId(1));
        assert_eq!(mesh.material, Material::Mirror { env_map: EnvMapId(1) });
        assert_eq!(scene.allocate_env_map(), EnvMapId(2));
        assert_eq!(scene.get(sphere).unwrap().parent(), Some(roots[0]));
    }

    #[test]
    fn lighting_picks_first_visible_lights() {
        let mut scene = Scene::new();
        scene.add(
            None,
            Node::new(
                "sun",
                NodeKind::DirectionalLight(DirectionalLight::default()),
            )
            .with_position(Vec3::new(0.0, 10.0, 0.0)),
        );
        scene.add(
            None,
            Node::new(
                "sky",
                NodeKind::HemisphereLight(HemisphereLight {
                    sky_color: Color::WHITE,
                    ground_color: Color::new(0.0, 0.0, 0.0),
                    intensity: 0.5,
                }),
            ),
        );
        let lighting = scene.lighting();
        let (dir, _) = lighting.directional.unwrap();
        assert_eq!(dir, Vec3::Y);
        assert_eq!(lighting.hemisphere.unwrap().intensity, 0.5);
    }

    #[test]
    fn line_list_collects_axes() {
        let mut scene = Scene::new();
        scene.add(None, Node::new("axes", NodeKind::Axes { size: 1.0 }));
        let lines = scene.line_list();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].size, 1.0);
    }
}
