use glam::{Quat, Vec3};
use mirrorscene_common::Transform;
use mirrorscene_scene::{Geometry, Material, MeshData, Node, Scene};

const BLOCK_COLORS: [[f32; 4]; 4] = [
    [0.90, 0.30, 0.25, 1.0],
    [0.25, 0.70, 0.35, 1.0],
    [0.25, 0.45, 0.90, 1.0],
    [0.95, 0.80, 0.25, 1.0],
];

/// Built-in stand-in model: a floor, a ring of coloured blocks and a sphere
/// named `Sphere` floating in the middle.
pub fn demo_model() -> Scene {
    let mut scene = Scene::new();
    let root = scene.add(None, Node::group("Scene"));

    let floor = scene.add_geometry(Geometry::cuboid(Vec3::new(3.0, 0.1, 3.0)));
    scene.add(
        Some(root),
        Node::mesh(
            "Floor",
            MeshData::new(
                floor,
                Material::Standard {
                    base_color: [0.85, 0.85, 0.85, 1.0],
                },
            ),
        )
        .with_position(Vec3::new(0.0, -0.05, 0.0)),
    );

    let block = scene.add_geometry(Geometry::cuboid(Vec3::new(0.3, 0.6, 0.3)));
    for (i, color) in BLOCK_COLORS.iter().enumerate() {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2 + std::f32::consts::FRAC_PI_4;
        let position = Vec3::new(angle.cos(), 0.3, angle.sin()) * Vec3::new(0.9, 1.0, 0.9);
        scene.add(
            Some(root),
            Node::mesh(
                format!("Block_{i}"),
                MeshData::new(block, Material::Standard { base_color: *color }),
            )
            .with_transform(Transform {
                position,
                rotation: Quat::from_rotation_y(-angle),
                scale: Vec3::ONE,
            }),
        );
    }

    let sphere = scene.add_geometry(Geometry::uv_sphere(0.35, 48, 32));
    scene.add(
        Some(root),
        Node::mesh("Sphere", MeshData::new(sphere, Material::default()))
            .with_position(Vec3::new(0.0, 0.5, 0.0)),
    );

    scene
}
