use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Indexed triangle list with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Build a geometry, generating smooth normals when none are supplied.
    pub fn new(positions: Vec<[f32; 3]>, normals: Option<Vec<[f32; 3]>>, indices: Vec<u32>) -> Self {
        let mut geometry = Self {
            positions,
            normals: Vec::new(),
            indices,
        };
        match normals {
            Some(n) if n.len() == geometry.positions.len() => geometry.normals = n,
            _ => geometry.compute_normals(),
        }
        geometry
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Area-weighted smooth normals from the triangle list.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                continue;
            }
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// UV sphere centred on the origin.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut positions = Vec::new();
        let mut normals = Vec::new();

        for y in 0..=hs {
            let v = y as f32 / hs as f32;
            let theta = v * PI;
            for x in 0..=ws {
                let u = x as f32 / ws as f32;
                let phi = u * TAU;
                let n = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
                positions.push((n * radius).to_array());
                normals.push(n.to_array());
            }
        }

        let row = ws + 1;
        let mut indices = Vec::new();
        for y in 0..hs {
            for x in 0..ws {
                let a = y * row + x + 1;
                let b = y * row + x;
                let c = (y + 1) * row + x;
                let d = (y + 1) * row + x + 1;
                if y != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if y != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        // (normal, tangent u, tangent v) per face; u x v == normal keeps CCW winding outward
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * h;
                positions.push(p.to_array());
                normals.push(n.to_array());
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_normals_follow_winding() {
        let g = Geometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            vec![0, 1, 2],
        );
        for n in &g.normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn mismatched_normals_are_regenerated() {
        let g = Geometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![[1.0, 0.0, 0.0]]),
            vec![0, 1, 2],
        );
        assert_eq!(g.normals.len(), 3);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let g = Geometry::uv_sphere(2.0, 16, 8);
        assert_eq!(g.vertex_count(), 17 * 9);
        for p in &g.positions {
            assert!((Vec3::from(*p).length() - 2.0).abs() < 1e-4);
        }
        assert!(g.indices.iter().all(|&i| (i as usize) < g.vertex_count()));
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let g = Geometry::cuboid(Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        for tri in g.indices.chunks_exact(3) {
            let a = Vec3::from(g.positions[tri[0] as usize]);
            let b = Vec3::from(g.positions[tri[1] as usize]);
            let c = Vec3::from(g.positions[tri[2] as usize]);
            let face_n = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(face_n.dot(centre) > 0.0);
        }
    }

    #[test]
    fn uv_sphere_faces_point_outward() {
        let g = Geometry::uv_sphere(1.0, 8, 6);
        // Pole rings contribute one triangle per segment, inner rings two.
        assert_eq!(g.triangle_count(), 8 * 2 + 8 * 2 * 4);
        for tri in g.indices.chunks_exact(3) {
            let a = Vec3::from(g.positions[tri[0] as usize]);
            let b = Vec3::from(g.positions[tri[1] as usize]);
            let c = Vec3::from(g.positions[tri[2] as usize]);
            let face_n = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(face_n.dot(centre) > 0.0);
        }
    }
}
