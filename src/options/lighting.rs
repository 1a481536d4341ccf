use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// The single point light and its lamp marker.
pub struct LightingOptions {
    /// World-space light position.
    pub position: [f32; 3],
    /// Light colour.
    pub color: [f32; 3],
    /// Uploaded as the `object_color` uniform. The Phong shading does not
    /// read it; lit colour comes from the light and the texture.
    pub object_color: [f32; 3],
    /// Uniform scale of the lamp marker.
    pub lamp_scale: f32,
    /// Whether the lamp orbits the scene at startup.
    pub orbit: bool,
    /// Orbit speed in degrees per second.
    pub orbit_speed: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            position: [-1.0, 0.5, 1.0],
            color: [1.0, 1.0, 1.0],
            object_color: [1.0, 1.0, 1.0],
            lamp_scale: 0.4,
            orbit: false,
            orbit_speed: 45.0,
        }
    }
}
