//! UV sphere generator.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{MeshData, Vertex};

/// Latitude rings between the two poles.
pub const SPHERE_RINGS: u32 = 15;
/// Longitude samples per ring.
pub const SPHERE_SEGMENTS: u32 = 16;

/// Equirectangular UV for a unit normal. The seam sits where `atan2` wraps.
fn spherical_uv(n: Vec3) -> [f32; 2] {
    [n.x.atan2(n.z) / TAU + 0.5, n.y * 0.5 + 0.5]
}

fn sphere_vertex(position: Vec3) -> Vertex {
    let normal = position.normalize();
    Vertex::new(position.to_array(), normal.to_array(), spherical_uv(normal))
}

/// Generate a unit sphere centred at the origin.
///
/// Layout: top pole at index 0, then `rings` rings of `segments` vertices
/// each (north to south, each starting at +Z and sweeping toward +X), then
/// the bottom pole at the last index.
pub(super) fn generate(rings: u32, segments: u32) -> MeshData {
    let rings = rings.max(1);
    let segments = segments.max(3);

    let mut vertices =
        Vec::with_capacity((2 + rings * segments) as usize);
    vertices.push(sphere_vertex(Vec3::Y));
    for k in 1..=rings {
        let phi = k as f32 * PI / (rings + 1) as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..segments {
            let theta = j as f32 * TAU / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(sphere_vertex(Vec3::new(
                sin_phi * sin_theta,
                cos_phi,
                sin_phi * cos_theta,
            )));
        }
    }
    let bottom = vertices.len() as u32;
    vertices.push(sphere_vertex(Vec3::NEG_Y));

    let ring_start = |r: u32| 1 + r * segments;
    let next = |j: u32| (j + 1) % segments;

    let tri_count = segments * 2 + (rings - 1) * segments * 2;
    let mut indices = Vec::with_capacity((tri_count * 3) as usize);

    // Top fan.
    let first = ring_start(0);
    for j in 0..segments {
        indices.extend_from_slice(&[0, first + j, first + next(j)]);
    }

    // Quad cells between consecutive rings.
    for r in 0..rings - 1 {
        let upper = ring_start(r);
        let lower = ring_start(r + 1);
        for j in 0..segments {
            let (a, b) = (upper + j, upper + next(j));
            let (c, d) = (lower + j, lower + next(j));
            indices.extend_from_slice(&[a, c, d, a, d, b]);
        }
    }

    // Bottom fan, mirrored so it stays counter-clockwise from below.
    let last = ring_start(rings - 1);
    for j in 0..segments {
        indices.extend_from_slice(&[bottom, last + next(j), last + j]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sphere_counts() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        assert_eq!(mesh.vertex_count(), 242);
        assert_eq!(mesh.index_count(), 1440);
    }

    #[test]
    fn normals_are_unit_and_radial() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5, "{v:?}");
            assert!((n - p.normalize()).length() < 1e-5, "{v:?}");
        }
    }

    #[test]
    fn poles_sit_at_first_and_last_index() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        assert_eq!(mesh.vertices[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[241].position, [0.0, -1.0, 0.0]);
        assert_eq!(mesh.vertices[0].uv, [0.5, 1.0]);
        assert_eq!(mesh.vertices[241].uv, [0.5, 0.0]);
    }

    #[test]
    fn first_ring_sample_points_down_positive_z() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        let p = mesh.vertices[1].position;
        assert!(p[0].abs() < 1e-6);
        assert!(p[2] > 0.0);
        // θ = 90° lands on +X.
        let q = mesh.vertices[5].position;
        assert!(q[0] > 0.0 && q[2].abs() < 1e-6);
    }

    #[test]
    fn uv_seam_wraps_at_negative_z() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        // Sample 8 of the equator ring faces −Z where atan2 flips sign.
        let equator = 1 + 7 * SPHERE_SEGMENTS;
        let seam = mesh.vertices[(equator + 8) as usize].uv[0];
        assert!(seam < 0.01 || seam > 0.99, "u = {seam}");
        let front = mesh.vertices[equator as usize].uv[0];
        assert!((front - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bottom_fan_is_systematic() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        let fan = &mesh.indices[mesh.indices.len() - 48..];
        for (j, tri) in fan.chunks_exact(3).enumerate() {
            let j = j as u32;
            assert_eq!(tri[0], 241);
            assert_eq!(tri[1], 225 + (j + 1) % 16);
            assert_eq!(tri[2], 225 + j);
        }
    }

    #[test]
    fn top_fan_closes_the_ring() {
        let mesh = generate(SPHERE_RINGS, SPHERE_SEGMENTS);
        assert_eq!(&mesh.indices[..3], &[0, 1, 2]);
        assert_eq!(&mesh.indices[45..48], &[0, 16, 1]);
    }

    #[test]
    fn degenerate_parameters_are_clamped() {
        let mesh = generate(0, 1);
        assert_eq!(mesh.vertex_count(), 2 + 3);
        assert_eq!(mesh.index_count() % 3, 0);
    }
}
