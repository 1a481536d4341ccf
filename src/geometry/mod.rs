//! Procedural mesh construction.
//!
//! Every shape is produced on the CPU as a [`MeshData`]: an interleaved
//! position/normal/UV vertex array plus a `u32` triangle-list index array.
//! Nothing here touches the GPU; upload lives in [`crate::gpu::mesh`].
//!
//! All triangles are wound counter-clockwise when viewed from outside the
//! shape, matching the `Ccw` front face used by the render pipelines.

mod shapes;
mod sphere;

use serde::{Deserialize, Serialize};

pub use shapes::{CUBOID_VERTICES, PLANE_VERTICES, PYRAMID_VERTICES};
pub use sphere::{SPHERE_RINGS, SPHERE_SEGMENTS};

/// Interleaved vertex: position, normal, texture coordinate (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit-length surface normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Byte stride of one interleaved vertex.
    pub const STRIDE: usize = size_of::<Self>();
    /// Number of `f32` components per vertex.
    pub const FLOATS: usize = 8;

    /// Construct a vertex from its three attributes.
    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// The primitive shapes the factory can build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Four-faced pyramid (used for the light indicator).
    Pyramid,
    /// Unit plane in XZ facing +Y.
    Plane,
    /// Unit cube centred at the origin.
    Cuboid,
    /// Unit UV sphere.
    Sphere,
}

impl ShapeKind {
    /// Every shape, in registry order.
    pub const ALL: [Self; 4] =
        [Self::Pyramid, Self::Plane, Self::Cuboid, Self::Sphere];
}

/// CPU-side mesh: interleaved vertices and a triangle-list index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Interleaved vertex array.
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices into `vertices`.
    pub indices: Vec<u32>,
}

/// Build the mesh for `kind`.
#[must_use]
pub fn build(kind: ShapeKind) -> MeshData {
    match kind {
        ShapeKind::Pyramid => MeshData::pyramid(),
        ShapeKind::Plane => MeshData::plane(),
        ShapeKind::Cuboid => MeshData::cuboid(),
        ShapeKind::Sphere => MeshData::uv_sphere(SPHERE_RINGS, SPHERE_SEGMENTS),
    }
}

impl MeshData {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of indices (three per triangle).
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// The pyramid table: one triangle per face.
    #[must_use]
    pub fn pyramid() -> Self {
        Self {
            vertices: PYRAMID_VERTICES.to_vec(),
            indices: (0..PYRAMID_VERTICES.len() as u32).collect(),
        }
    }

    /// The plane table: a single quad.
    #[must_use]
    pub fn plane() -> Self {
        Self::from_quads(&PLANE_VERTICES)
    }

    /// The cube table: six quads.
    #[must_use]
    pub fn cuboid() -> Self {
        Self::from_quads(&CUBOID_VERTICES)
    }

    /// Unit UV sphere with `rings` latitude rings of `segments` samples each.
    #[must_use]
    pub fn uv_sphere(rings: u32, segments: u32) -> Self {
        sphere::generate(rings, segments)
    }

    /// Split consecutive groups of four vertices into two triangles each.
    ///
    /// Each quad must list its corners counter-clockwise seen from outside.
    fn from_quads(table: &[Vertex]) -> Self {
        let indices = (0..table.len() as u32 / 4)
            .flat_map(|quad| {
                let k = quad * 4;
                [k, k + 1, k + 2, k, k + 2, k + 3]
            })
            .collect();
        Self {
            vertices: table.to_vec(),
            indices,
        }
    }

    /// De-index into a plain position triangle list.
    ///
    /// Used for meshes drawn without an index buffer (the lamp).
    #[must_use]
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.indices
            .iter()
            .map(|&i| self.vertices[i as usize].position)
            .collect()
    }

    /// Flatten the vertex array into its raw `f32` components.
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn triangles(mesh: &MeshData) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        mesh.indices.chunks_exact(3).map(|t| {
            [
                mesh.vertices[t[0] as usize],
                mesh.vertices[t[1] as usize],
                mesh.vertices[t[2] as usize],
            ]
        })
    }

    // ── Index validity ──

    #[test]
    fn every_shape_has_whole_triangles_in_range() {
        for kind in ShapeKind::ALL {
            let mesh = build(kind);
            assert_eq!(mesh.indices.len() % 3, 0, "{kind:?}");
            assert!(
                mesh.indices.iter().all(|&i| i < mesh.vertex_count()),
                "{kind:?} has an out-of-range index"
            );
        }
    }

    #[test]
    fn literal_shape_counts() {
        let cuboid = MeshData::cuboid();
        assert_eq!((cuboid.vertex_count(), cuboid.index_count()), (24, 36));
        let plane = MeshData::plane();
        assert_eq!((plane.vertex_count(), plane.index_count()), (4, 6));
        let pyramid = MeshData::pyramid();
        assert_eq!((pyramid.vertex_count(), pyramid.index_count()), (12, 12));
    }

    #[test]
    fn cuboid_indices_follow_quad_pattern() {
        let mesh = MeshData::cuboid();
        assert_eq!(&mesh.indices[..12], &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(&mesh.indices[30..], &[20, 21, 22, 20, 22, 23]);
    }

    // ── Winding ──

    #[test]
    fn every_triangle_faces_its_vertex_normals() {
        for kind in ShapeKind::ALL {
            let mesh = build(kind);
            for tri in triangles(&mesh) {
                let [a, b, c] = tri.map(|v| Vec3::from(v.position));
                let face = (b - a).cross(c - a);
                let avg_normal: Vec3 =
                    tri.iter().map(|v| Vec3::from(v.normal)).sum();
                assert!(
                    face.dot(avg_normal) > 0.0,
                    "{kind:?} triangle {tri:?} is wound clockwise"
                );
            }
        }
    }

    #[test]
    fn literal_normals_are_unit_length() {
        for table in [&CUBOID_VERTICES[..], &PLANE_VERTICES, &PYRAMID_VERTICES]
        {
            for v in table {
                let len = Vec3::from(v.normal).length();
                assert!((len - 1.0).abs() < 1e-5, "{v:?}");
            }
        }
    }

    // ── Layout ──

    #[test]
    fn vertex_is_eight_packed_floats() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, uv), 24);
        assert_eq!(MeshData::cuboid().as_floats().len(), 24 * Vertex::FLOATS);
    }

    #[test]
    fn positions_deindexes_in_index_order() {
        let plane = MeshData::plane();
        let positions = plane.positions();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], PLANE_VERTICES[0].position);
        assert_eq!(positions[4], PLANE_VERTICES[2].position);
        assert_eq!(positions[5], PLANE_VERTICES[3].position);
    }

    #[test]
    fn shape_kind_uses_snake_case_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            shape: ShapeKind,
        }
        let parsed: Wrapper = toml::from_str("shape = \"cuboid\"").unwrap();
        assert_eq!(parsed.shape, ShapeKind::Cuboid);
    }
}
