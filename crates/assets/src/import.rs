use crate::AssetError;
use glam::{Quat, Vec3};
use mirrorscene_common::{NodeId, Transform};
use mirrorscene_scene::{Geometry, Material, MeshData, Node, Scene};
use std::path::Path;

/// Replace whitespace with `_` and drop characters that clash with property
/// paths (`[ ] . : /`).
pub fn sanitize_node_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '.' | ':' | '/'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Import a `.gltf` or `.glb` file into a standalone scene.
///
/// The result has a single root group named after the glTF scene. Only
/// triangle primitives are imported; positions, normals, indices and the base
/// colour factor are kept. Textures, skins and animation are ignored.
///
/// A node whose mesh has several primitives becomes a group carrying the node
/// name, with one child mesh per primitive named `{name}_0`, `{name}_1` and so
/// on. Lookups such as [`Scene::find_mesh`] therefore only match the node name
/// of single-primitive meshes.
pub fn import_gltf(path: impl AsRef<Path>) -> Result<Scene, AssetError> {
    let path = path.as_ref();
    tracing::info!("importing glTF from {}", path.display());

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

    let source_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut scene = Scene::new();
    let root_name = source_scene
        .name()
        .map(sanitize_node_name)
        .unwrap_or_else(|| "Scene".to_string());
    let root = scene.add(None, Node::group(root_name));

    for node in source_scene.nodes() {
        import_node(&mut scene, root, &node, &buffers);
    }

    tracing::info!(
        nodes = scene.node_count(),
        meshes = scene.mesh_ids().len(),
        "glTF import finished"
    );
    Ok(scene)
}

fn import_node(scene: &mut Scene, parent: NodeId, node: &gltf::Node, buffers: &[gltf::buffer::Data]) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        position: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };

    let name = match (node.name(), node.mesh()) {
        (Some(n), _) => sanitize_node_name(n),
        (None, Some(mesh)) => mesh
            .name()
            .map(sanitize_node_name)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index())),
        (None, None) => String::new(),
    };

    let primitives: Vec<MeshData> = node
        .mesh()
        .map(|mesh| {
            mesh.primitives()
                .filter_map(|p| import_primitive(scene, &p, buffers))
                .collect()
        })
        .unwrap_or_default();

    let id = match primitives.as_slice() {
        [single] => scene.add(Some(parent), Node::mesh(name, *single).with_transform(transform)),
        _ => {
            let group = scene.add(
                Some(parent),
                Node::group(name.clone()).with_transform(transform),
            );
            for (i, mesh) in primitives.iter().enumerate() {
                scene.add(Some(group), Node::mesh(format!("{name}_{i}"), *mesh));
            }
            group
        }
    };

    for child in node.children() {
        import_node(scene, id, &child, buffers);
    }
}

fn import_primitive(
    scene: &mut Scene,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::warn!("skipping primitive with mode {:?}", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let Some(positions) = reader.read_positions() else {
        tracing::warn!("skipping primitive without positions");
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();
    let geometry = scene.add_geometry(Geometry::new(positions, normals, indices));
    Some(MeshData::new(geometry, Material::Standard { base_color }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorscene_scene::NodeKind;
    use std::path::PathBuf;

    /// Write a glTF whose mesh "Tri" repeats one triangle `primitives` times,
    /// backed by an external buffer.
    fn write_triangle_gltf(
        dir: &Path,
        nodes_json: &str,
        node_count: usize,
        primitives: usize,
    ) -> PathBuf {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        std::fs::write(dir.join("tri.bin"), &bin).unwrap();

        let scene_nodes: Vec<String> = (0..node_count).map(|i| i.to_string()).collect();
        let primitive = r#"{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }"#;
        let mesh_primitives = vec![primitive; primitives].join(", ");
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "name": "Esher Scene", "nodes": [{}] }}],
  "nodes": {nodes_json},
  "meshes": [{{ "name": "Tri", "primitives": [{mesh_primitives}] }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorFactor": [0.5, 0.25, 1.0, 1.0] }} }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "buffers": [{{ "uri": "tri.bin", "byteLength": 42 }}]
}}"#,
            scene_nodes.join(", ")
        );
        let path = dir.join("tri.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn sanitize_matches_property_path_rules() {
        assert_eq!(sanitize_node_name("Sphere"), "Sphere");
        assert_eq!(sanitize_node_name("my mesh.001"), "my_mesh001");
        assert_eq!(sanitize_node_name("a/b:c[0]"), "abc0");
    }

    #[test]
    fn imports_named_meshes_with_transforms() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(
            tmp.path(),
            r#"[{ "name": "Sphere", "mesh": 0, "translation": [0, 1, 0] }, { "name": "Floor", "mesh": 0 }]"#,
            2,
            1,
        );
        let scene = import_gltf(&path).unwrap();

        assert_eq!(scene.roots().len(), 1);
        assert_eq!(scene.get(scene.roots()[0]).unwrap().name, "Esher_Scene");

        let sphere = scene.find_mesh("Sphere").expect("sphere mesh");
        assert_eq!(scene.world_position(sphere), Vec3::new(0.0, 1.0, 0.0));
        assert!(scene.find_mesh("Floor").is_some());

        let mesh = scene.get(sphere).unwrap().as_mesh().unwrap();
        assert_eq!(
            mesh.material,
            Material::Standard {
                base_color: [0.5, 0.25, 1.0, 1.0]
            }
        );
        let geometry = scene.geometry(mesh.geometry).unwrap();
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn unnamed_node_falls_back_to_mesh_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(tmp.path(), r#"[{ "mesh": 0 }]"#, 1, 1);
        let scene = import_gltf(&path).unwrap();
        assert!(scene.find_mesh("Tri").is_some());
    }

    #[test]
    fn child_nodes_keep_hierarchy() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(
            tmp.path(),
            r#"[{ "name": "Holder", "translation": [2, 0, 0], "children": [1] }, { "name": "Sphere", "mesh": 0 }]"#,
            1,
            1,
        );
        let scene = import_gltf(&path).unwrap();
        let sphere = scene.find_mesh("Sphere").unwrap();
        let parent = scene.get(sphere).unwrap().parent().unwrap();
        let holder = scene.get(parent).unwrap();
        assert_eq!(holder.name, "Holder");
        assert!(matches!(holder.kind, NodeKind::Group));
        assert_eq!(scene.world_position(sphere), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn multi_primitive_mesh_becomes_group_of_parts() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(tmp.path(), r#"[{ "name": "Sphere", "mesh": 0 }]"#, 1, 2);
        let scene = import_gltf(&path).unwrap();

        let root = scene.get(scene.roots()[0]).unwrap();
        let group = scene.get(root.children()[0]).unwrap();
        assert_eq!(group.name, "Sphere");
        assert!(matches!(group.kind, NodeKind::Group));
        let parts: Vec<&str> = group
            .children()
            .iter()
            .map(|&id| scene.get(id).unwrap().name.as_str())
            .collect();
        assert_eq!(parts, ["Sphere_0", "Sphere_1"]);

        assert!(scene.find_mesh("Sphere").is_none());
        assert!(scene.find_mesh("Sphere_1").is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(import_gltf(tmp.path().join("nope.gltf")).is_err());
    }
}
