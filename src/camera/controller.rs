use glam::{Vec2, Vec3};

use super::core::{Camera, MAX_ZOOM, MIN_ZOOM, PITCH_LIMIT};
use crate::options::CameraOptions;

/// Directions the fly camera can translate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along `front`.
    Forward,
    /// Against `front`.
    Backward,
    /// Against `right`.
    Left,
    /// Along `right`.
    Right,
    /// Along the camera `up`.
    Up,
    /// Against the camera `up`.
    Down,
}

/// First-person fly controller: turns key, cursor and scroll input into
/// camera motion.
pub struct CameraController {
    /// The controlled camera.
    pub camera: Camera,
    movement_speed: f32,
    mouse_sensitivity: f32,
    constrain_pitch: bool,
    /// Last cursor position; `None` until the first cursor event.
    last_cursor: Option<Vec2>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(&CameraOptions::default())
    }
}

impl CameraController {
    /// Controller for a camera placed per `options`.
    #[must_use]
    pub fn new(options: &CameraOptions) -> Self {
        let mut camera = Camera::new(
            Vec3::from_array(options.position),
            Vec3::Y,
            options.yaw,
            options.pitch,
        );
        camera.zoom = options.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Self {
            camera,
            movement_speed: options.movement_speed,
            mouse_sensitivity: options.mouse_sensitivity,
            constrain_pitch: options.constrain_pitch,
            last_cursor: None,
        }
    }

    /// Translate the camera for `dt` seconds of held movement.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        let camera = &mut self.camera;
        match direction {
            CameraMovement::Forward => camera.position += camera.front * velocity,
            CameraMovement::Backward => camera.position -= camera.front * velocity,
            CameraMovement::Left => camera.position -= camera.right * velocity,
            CameraMovement::Right => camera.position += camera.right * velocity,
            CameraMovement::Up => camera.position += camera.up * velocity,
            CameraMovement::Down => camera.position -= camera.up * velocity,
        }
    }

    /// Turn the camera by a cursor offset. Positive `dy` looks up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.camera.yaw += dx * self.mouse_sensitivity;
        self.camera.pitch += dy * self.mouse_sensitivity;
        if constrain_pitch {
            self.camera.pitch = self.camera.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.camera.update_vectors();
    }

    /// Narrow or widen the field of view by a scroll offset.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.camera.zoom = (self.camera.zoom - dy).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Feed an absolute cursor position. The first position only primes
    /// the tracker; later ones turn the camera by the delta, with y flipped
    /// since screen y grows downward. Returns the applied offset.
    pub fn handle_cursor(&mut self, x: f32, y: f32) -> Vec2 {
        let current = Vec2::new(x, y);
        let Some(last) = self.last_cursor.replace(current) else {
            return Vec2::ZERO;
        };
        let offset = Vec2::new(current.x - last.x, last.y - current.y);
        self.process_mouse_movement(offset.x, offset.y, self.constrain_pitch);
        offset
    }

    /// Turn the camera by raw relative motion (screen y down). Returns the
    /// applied offset.
    pub fn handle_motion(&mut self, dx: f32, dy: f32) -> Vec2 {
        let offset = Vec2::new(dx, -dy);
        self.process_mouse_movement(offset.x, offset.y, self.constrain_pitch);
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn keyboard_moves_along_camera_axes() {
        let mut controller = CameraController::default();
        controller.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(close(controller.camera.position, Vec3::new(0.0, 0.0, 0.5)));

        controller.process_keyboard(CameraMovement::Right, 0.4);
        assert!(close(controller.camera.position, Vec3::new(1.0, 0.0, 0.5)));

        controller.process_keyboard(CameraMovement::Up, 0.2);
        controller.process_keyboard(CameraMovement::Down, 0.2);
        controller.process_keyboard(CameraMovement::Left, 0.4);
        controller.process_keyboard(CameraMovement::Backward, 1.0);
        assert!(close(controller.camera.position, Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut controller = CameraController::default();
        controller.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(controller.camera.pitch, 89.0);
        controller.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(controller.camera.pitch, -89.0);

        controller.process_mouse_movement(0.0, -1_000.0, false);
        assert!(controller.camera.pitch < -89.0);
    }

    #[test]
    fn mouse_movement_scales_by_sensitivity() {
        let mut controller = CameraController::default();
        controller.process_mouse_movement(900.0, 0.0, true);
        assert!((controller.camera.yaw - 0.0).abs() < 1e-4);
        assert!(close(controller.camera.front, Vec3::X));
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut controller = CameraController::default();
        controller.process_mouse_scroll(10.0);
        assert_eq!(controller.camera.zoom, 35.0);
        controller.process_mouse_scroll(100.0);
        assert_eq!(controller.camera.zoom, 1.0);
        controller.process_mouse_scroll(-100.0);
        assert_eq!(controller.camera.zoom, 45.0);
    }

    #[test]
    fn first_cursor_event_only_primes() {
        let mut controller = CameraController::default();
        assert_eq!(controller.handle_cursor(400.0, 300.0), Vec2::ZERO);
        assert_eq!(controller.camera.yaw, -90.0);

        // Cursor moving down the screen looks down.
        let offset = controller.handle_cursor(410.0, 320.0);
        assert_eq!(offset, Vec2::new(10.0, -20.0));
        assert!((controller.camera.yaw - -89.0).abs() < 1e-5);
        assert!((controller.camera.pitch - -2.0).abs() < 1e-5);
    }
}
