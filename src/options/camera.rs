use serde::{Deserialize, Serialize};

use crate::camera::core::ProjectionMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera placement, projection and control parameters.
pub struct CameraOptions {
    /// Initial eye position.
    pub position: [f32; 3],
    /// Initial heading in degrees.
    pub yaw: f32,
    /// Initial elevation in degrees.
    pub pitch: f32,
    /// Initial vertical field of view in degrees, clamped to [1, 45].
    pub zoom: f32,
    /// Fly speed in units per second.
    pub movement_speed: f32,
    /// Degrees of turn per pixel of cursor motion.
    pub mouse_sensitivity: f32,
    /// Keep pitch within ±89 degrees.
    pub constrain_pitch: bool,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Projection at startup.
    pub projection: ProjectionMode,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            constrain_pitch: true,
            znear: 0.1,
            zfar: 100.0,
            projection: ProjectionMode::Perspective,
        }
    }
}
