use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Lower bound of the zoom (vertical field of view, degrees).
pub const MIN_ZOOM: f32 = 1.0;
/// Upper bound and default of the zoom.
pub const MAX_ZOOM: f32 = 45.0;
/// Pitch limit in degrees when pitch constraining is on.
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera defined by a position and Euler angles.
///
/// `front`, `right` and `up` are derived from `yaw`/`pitch` and kept in
/// sync by [`Camera::update_vectors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
    /// Unit camera up.
    pub up: Vec3,
    /// Unit camera right.
    pub right: Vec3,
    /// World up used to derive `right`.
    pub world_up: Vec3,
    /// Heading in degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Elevation in degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Y, -90.0, 0.0)
    }
}

impl Camera {
    /// Camera at `position` with the given world up and angles, zoom at
    /// [`MAX_ZOOM`].
    #[must_use]
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            zoom: MAX_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Recompute `front`, `right` and `up` from `yaw` and `pitch`.
    pub fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Right-handed look-at from `position` towards `position + front`.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }
}

/// How the scene is projected onto the viewport.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Perspective with the camera zoom as vertical field of view.
    #[default]
    Perspective,
    /// Orthographic with half-extents aspect x 1.
    Orthographic,
}

impl ProjectionMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }

    /// Display name used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        }
    }

    /// Projection matrix with a [0,1] depth range.
    #[must_use]
    pub fn projection_matrix(
        self,
        zoom: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
    ) -> Mat4 {
        match self {
            // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
            // convention)
            Self::Perspective => {
                Mat4::perspective_rh(zoom.to_radians(), aspect, znear, zfar)
            }
            Self::Orthographic => {
                Mat4::orthographic_rh(-aspect, aspect, -1.0, 1.0, znear, zfar)
            }
        }
    }
}
