//! Per-frame scene state and the static desk arrangement.
//!
//! [`FrameContext`] is owned by the viewer, mutated by the
//! [`InputProcessor`](crate::input::InputProcessor), and read once per frame
//! by the [`SceneRenderer`](crate::renderer::SceneRenderer).

mod layout;

use glam::{Mat3, Mat4, Vec2, Vec3};
pub use layout::{
    desk_layout, lamp_transform, normal_matrix, SceneObjectDescriptor,
    TextureKind, Transform,
};

use crate::camera::controller::CameraController;
use crate::camera::core::ProjectionMode;
use crate::gpu::texture::WrapMode;
use crate::options::Options;

/// UV tiling change per bracket press.
pub const UV_SCALE_STEP: f32 = 0.1;

/// Everything input can change and the renderer reads.
pub struct FrameContext {
    /// Fly camera and its input state.
    pub controller: CameraController,
    /// Active projection.
    pub projection: ProjectionMode,
    /// Near clip distance.
    pub znear: f32,
    /// Far clip distance.
    pub zfar: f32,
    /// World-space light position.
    pub light_position: Vec3,
    /// Light colour.
    pub light_color: Vec3,
    /// Uploaded as the `object_color` uniform. The Phong shading does not
    /// read it; lit colour comes from the light and the texture.
    pub object_color: Vec3,
    /// Uniform scale of the lamp marker.
    pub light_scale: f32,
    /// Orbit speed of the lamp in degrees per second.
    pub orbit_speed: f32,
    /// Whether the lamp orbits about +Y.
    pub lamp_orbit: bool,
    /// Multiplier applied to texture coordinates before sampling.
    pub uv_scale: Vec2,
    /// Wrap mode requested for the keyboard-keys texture.
    pub wrap_mode: WrapMode,
    /// Set when the window should close.
    pub exit_requested: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl FrameContext {
    /// Initial state from the configured options.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let lighting = &options.lighting;
        Self {
            controller: CameraController::new(&options.camera),
            projection: options.camera.projection,
            znear: options.camera.znear,
            zfar: options.camera.zfar,
            light_position: Vec3::from_array(lighting.position),
            light_color: Vec3::from_array(lighting.color),
            object_color: Vec3::from_array(lighting.object_color),
            light_scale: lighting.lamp_scale,
            orbit_speed: lighting.orbit_speed,
            lamp_orbit: lighting.orbit,
            uv_scale: Vec2::ONE,
            wrap_mode: options.textures.keyboard_wrap_mode,
            exit_requested: false,
        }
    }

    /// Flip between perspective and orthographic.
    pub fn toggle_projection(&mut self) {
        self.projection = self.projection.toggled();
        log::info!("Projection: {}", self.projection.name());
    }

    /// Add `steps` tiling increments (negative shrinks). Unbounded.
    pub fn adjust_uv_scale(&mut self, steps: f32) {
        self.uv_scale += Vec2::splat(UV_SCALE_STEP * steps);
        log::info!(
            "Current scale ({}, {})",
            self.uv_scale.x,
            self.uv_scale.y
        );
    }

    /// Request a wrap mode for the keyboard-keys texture.
    pub fn select_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    /// Start or stop the lamp orbit.
    pub fn toggle_lamp_orbit(&mut self) {
        self.lamp_orbit = !self.lamp_orbit;
        log::info!(
            "Lamp orbit {}",
            if self.lamp_orbit { "on" } else { "off" }
        );
    }

    /// Advance time-driven state by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.lamp_orbit {
            let rotation = Mat3::from_rotation_y((self.orbit_speed * dt).to_radians());
            self.light_position = rotation * self.light_position;
        }
    }

    /// View matrix of the current camera.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.controller.camera.view_matrix()
    }

    /// Projection matrix for a viewport of the given aspect.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection.projection_matrix(
            self.controller.camera.zoom,
            aspect,
            self.znear,
            self.zfar,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desk_scene() {
        let frame = FrameContext::default();
        assert_eq!(frame.light_position, Vec3::new(-1.0, 0.5, 1.0));
        assert_eq!(frame.light_color, Vec3::ONE);
        assert_eq!(frame.object_color, Vec3::ONE);
        assert_eq!(frame.light_scale, 0.4);
        assert_eq!(frame.uv_scale, Vec2::ONE);
        assert_eq!(frame.projection, ProjectionMode::Perspective);
        assert_eq!(frame.wrap_mode, WrapMode::Repeat);
        assert!(!frame.lamp_orbit);
        assert!(!frame.exit_requested);
    }

    #[test]
    fn ten_small_steps_equal_one_large() {
        let mut stepped = FrameContext::default();
        for _ in 0..10 {
            stepped.adjust_uv_scale(1.0);
        }
        let mut jumped = FrameContext::default();
        jumped.adjust_uv_scale(10.0);
        assert!((stepped.uv_scale - jumped.uv_scale).abs().max_element() < 1e-5);
        assert!((stepped.uv_scale - Vec2::splat(2.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn uv_scale_can_go_negative() {
        let mut frame = FrameContext::default();
        frame.adjust_uv_scale(-15.0);
        assert!(frame.uv_scale.x < 0.0);
    }

    #[test]
    fn lamp_orbits_only_when_enabled() {
        let mut frame = FrameContext::default();
        let start = frame.light_position;
        frame.advance(1.0);
        assert_eq!(frame.light_position, start);

        frame.toggle_lamp_orbit();
        frame.advance(2.0);
        // 90 degrees about +Y: (x, y, z) -> (z, y, -x)
        let expected = Vec3::new(start.z, start.y, -start.x);
        assert!((frame.light_position - expected).length() < 1e-5);
        assert!((frame.light_position.length() - start.length()).abs() < 1e-5);
    }

    #[test]
    fn projection_toggle_changes_matrix() {
        let mut frame = FrameContext::default();
        let perspective = frame.projection_matrix(800.0 / 600.0);
        frame.toggle_projection();
        assert_eq!(frame.projection, ProjectionMode::Orthographic);
        assert_ne!(frame.projection_matrix(800.0 / 600.0), perspective);
    }
}
