//! The fixed desk arrangement and the transforms that place it.

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::ShapeKind;

/// Textures the scene samples. Each is loaded once and shared by every
/// object that names it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    /// Dark plastic of the monitor, stand, and keyboard body.
    Monitor,
    /// The monitor's screen contents.
    InnerMonitor,
    /// Desk and mouse wood grain.
    Wood,
    /// Mousepad cloth.
    Fabric,
    /// Keyboard key caps. The only texture whose wrap mode can change.
    KeyboardKeys,
}

impl TextureKind {
    /// Every texture, in load order.
    pub const ALL: [Self; 5] = [
        Self::Monitor,
        Self::InnerMonitor,
        Self::Wood,
        Self::Fabric,
        Self::KeyboardKeys,
    ];

    /// Image file name inside the texture directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Monitor => "monitor.jpg",
            Self::InnerMonitor => "innermonitor.jpg",
            Self::Wood => "wood.jpg",
            Self::Fabric => "fabric.jpg",
            Self::KeyboardKeys => "keyboardt.jpg",
        }
    }
}

/// Scale, rotation and translation applied in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space offset.
    pub translation: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Per-axis scale. A zero component flattens the mesh.
    pub scale: Vec3,
}

impl Transform {
    /// Translation x rotation x scale.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Matrix carrying object-space normals to world space: the cofactor of
/// the model's upper 3x3. Equal to inverse-transpose up to a positive
/// factor, and still defined when an axis is scaled to zero. The shader
/// renormalizes.
#[must_use]
pub fn normal_matrix(model: Mat4) -> Mat4 {
    let m = Mat3::from_mat4(model);
    let (c0, c1, c2) = (m.x_axis, m.y_axis, m.z_axis);
    Mat4::from_mat3(Mat3::from_cols(c1.cross(c2), c2.cross(c0), c0.cross(c1)))
}

/// One drawable: which shared mesh and texture, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObjectDescriptor {
    /// Human-readable name for logs.
    pub name: &'static str,
    /// Mesh to draw.
    pub mesh: ShapeKind,
    /// Texture bound while drawing.
    pub texture: TextureKind,
    /// Placement.
    pub transform: Transform,
}

const fn object(
    name: &'static str,
    mesh: ShapeKind,
    texture: TextureKind,
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> SceneObjectDescriptor {
    SceneObjectDescriptor {
        name,
        mesh,
        texture,
        transform: Transform {
            translation,
            rotation,
            scale,
        },
    }
}

/// The desk scene, in draw order.
#[must_use]
pub fn desk_layout() -> Vec<SceneObjectDescriptor> {
    use ShapeKind::{Cuboid, Plane, Sphere};
    use TextureKind::{Fabric, InnerMonitor, KeyboardKeys, Monitor, Wood};

    let upright = Quat::from_rotation_x(90f32.to_radians());
    vec![
        object(
            "monitor",
            Cuboid,
            Monitor,
            Vec3::new(1.0, 0.8, 0.1),
            Quat::IDENTITY,
            Vec3::new(-0.8, 0.2, 0.0),
        ),
        object(
            "inner monitor",
            Plane,
            InnerMonitor,
            Vec3::new(0.475, 0.35, 0.35),
            upright,
            Vec3::new(-0.8, 0.2, 0.06),
        ),
        object(
            "keyboard body",
            Cuboid,
            Monitor,
            Vec3::new(0.7, 0.05, 0.25),
            Quat::IDENTITY,
            Vec3::new(-1.0, -0.45, 0.5),
        ),
        object(
            "keyboard keys",
            Plane,
            KeyboardKeys,
            Vec3::new(0.352, 0.0, 0.125),
            Quat::IDENTITY,
            Vec3::new(-1.0, -0.42, 0.5),
        ),
        object(
            "mousepad",
            Plane,
            Fabric,
            Vec3::new(1.4, 0.35, 0.30),
            Quat::IDENTITY,
            Vec3::new(0.0, -0.48, 0.45),
        ),
        object(
            "mouse",
            Sphere,
            Wood,
            Vec3::new(0.075, 0.05, 0.1),
            Quat::IDENTITY,
            Vec3::new(0.0, -0.45, 0.6),
        ),
        object(
            "desk",
            Cuboid,
            Wood,
            Vec3::new(3.0, 0.1, 1.0),
            Quat::IDENTITY,
            Vec3::new(0.0, -0.55, 0.3),
        ),
        object(
            "stand",
            Cuboid,
            Monitor,
            Vec3::new(0.1, 0.3, 0.1),
            Quat::IDENTITY,
            Vec3::new(-0.8, -0.35, 0.0),
        ),
    ]
}

/// Model matrix of the lamp marker: at the light, turned half a revolution
/// about +Y, uniformly scaled.
#[must_use]
pub fn lamp_transform(light_position: Vec3, light_scale: f32) -> Transform {
    Transform {
        translation: light_position,
        rotation: Quat::from_rotation_y(180f32.to_radians()),
        scale: Vec3::splat(light_scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_every_desk_object() {
        let layout = desk_layout();
        assert_eq!(layout.len(), 8);
        let keys = layout.iter().find(|o| o.name == "keyboard keys").unwrap();
        assert_eq!(keys.texture, TextureKind::KeyboardKeys);
        assert_eq!(keys.mesh, ShapeKind::Plane);
        assert_eq!(
            layout.iter().filter(|o| o.texture == TextureKind::KeyboardKeys).count(),
            1
        );
    }

    #[test]
    fn matrix_scales_then_rotates_then_translates() {
        let t = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(90f32.to_radians()),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        // +X scaled to 2, turned onto -Z, then offset.
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn inner_monitor_faces_the_viewer() {
        let screen = desk_layout()
            .into_iter()
            .find(|o| o.name == "inner monitor")
            .unwrap();
        let n = normal_matrix(screen.transform.matrix())
            .transform_vector3(Vec3::Y)
            .normalize();
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn normal_matrix_survives_flattened_axis() {
        let keys = desk_layout()
            .into_iter()
            .find(|o| o.name == "keyboard keys")
            .unwrap();
        let n = normal_matrix(keys.transform.matrix()).transform_vector3(Vec3::Y);
        assert!(n.is_finite());
        assert!((n.normalize() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn normal_matrix_matches_inverse_transpose_direction() {
        let model = Transform {
            translation: Vec3::ONE,
            rotation: Quat::from_rotation_z(0.3),
            scale: Vec3::new(3.0, 0.5, 2.0),
        }
        .matrix();
        let expected = Mat3::from_mat4(model).inverse().transpose();
        let ours = Mat3::from_mat4(normal_matrix(model));
        for v in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, -2.0, 0.5)] {
            let a = (expected * v).normalize();
            let b = (ours * v).normalize();
            assert!((a - b).length() < 1e-4);
        }
    }

    #[test]
    fn lamp_sits_at_the_light() {
        let light = Vec3::new(-1.0, 0.5, 1.0);
        let m = lamp_transform(light, 0.4).matrix();
        assert!((m.transform_point3(Vec3::ZERO) - light).length() < 1e-6);
        let apex = m.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((apex - (light + Vec3::new(0.0, 0.2, 0.0))).length() < 1e-5);
    }
}
