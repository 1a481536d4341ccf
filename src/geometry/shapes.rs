//! Literal vertex tables for the fixed shapes.

use super::Vertex;

const fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex::new(position, normal, uv)
}

/// Unit cube centred at the origin, four vertices per face.
///
/// Face order: back (−Z), bottom (−Y), left (−X), right (+X), top (+Y),
/// front (+Z). Corners run top-left, bottom-left, bottom-right, top-right
/// as seen from outside.
pub const CUBOID_VERTICES: [Vertex; 24] = [
    // back
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
    v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
    v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
    // bottom
    v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
    v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
    // left
    v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    // right
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
    // top
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
    // front
    v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
];

/// Two-unit square in the XZ plane facing +Y.
pub const PLANE_VERTICES: [Vertex; 4] = [
    v([-1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
    v([1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([1.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
    v([-1.0, 0.0, -1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
];

// Face normals of the slanted pyramid sides.
const SIDE_X: f32 = 0.872_871_6;
const SIDE_Y: f32 = 0.218_217_9;
const SIDE_Z: f32 = 0.436_435_8;
const FRONT_Y: f32 = 0.447_213_6;
const FRONT_Z: f32 = 0.894_427_2;

const APEX: [f32; 3] = [0.0, 0.5, 0.0];
const BACK: [f32; 3] = [0.0, -0.5, -0.5];
const FRONT_LEFT: [f32; 3] = [-0.5, -0.5, 0.5];
const FRONT_RIGHT: [f32; 3] = [0.5, -0.5, 0.5];

/// Triangular-base pyramid, one triangle per face (left, right, front,
/// bottom).
pub const PYRAMID_VERTICES: [Vertex; 12] = [
    // left
    v(APEX, [-SIDE_X, SIDE_Y, -SIDE_Z], [0.5, 1.0]),
    v(BACK, [-SIDE_X, SIDE_Y, -SIDE_Z], [0.0, 0.0]),
    v(FRONT_LEFT, [-SIDE_X, SIDE_Y, -SIDE_Z], [1.0, 0.0]),
    // right
    v(APEX, [SIDE_X, SIDE_Y, -SIDE_Z], [0.5, 1.0]),
    v(FRONT_RIGHT, [SIDE_X, SIDE_Y, -SIDE_Z], [0.0, 0.0]),
    v(BACK, [SIDE_X, SIDE_Y, -SIDE_Z], [1.0, 0.0]),
    // front
    v(APEX, [0.0, FRONT_Y, FRONT_Z], [0.5, 1.0]),
    v(FRONT_LEFT, [0.0, FRONT_Y, FRONT_Z], [0.0, 0.0]),
    v(FRONT_RIGHT, [0.0, FRONT_Y, FRONT_Z], [1.0, 0.0]),
    // bottom
    v(FRONT_LEFT, [0.0, -1.0, 0.0], [0.0, 1.0]),
    v(BACK, [0.0, -1.0, 0.0], [0.5, 0.0]),
    v(FRONT_RIGHT, [0.0, -1.0, 0.0], [1.0, 1.0]),
];
