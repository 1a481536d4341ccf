//! Applies raw platform events to the frame context.
//!
//! The `InputProcessor` owns the transient input state (which bound keys
//! are held) and the key-binding map. Movement keys act every frame while
//! held; every other action fires once on the press edge, so key repeat
//! and held keys never retrigger a toggle.

use rustc_hash::FxHashSet;

use super::event::{InputEvent, MouseButton};
use super::keyboard::KeyAction;
use crate::options::KeybindingOptions;
use crate::scene::FrameContext;

/// Converts raw window events into [`FrameContext`] changes.
///
/// # Usage
///
/// ```ignore
/// // In the event loop:
/// input.handle_event(InputEvent::Scroll { delta: 1.0 }, &mut frame);
/// let _ = input.handle_key("KeyP", true, &mut frame);
///
/// // Once per frame:
/// input.apply_held(&mut frame, dt);
/// ```
pub struct InputProcessor {
    /// Bound actions whose key is currently down.
    held: FxHashSet<KeyAction>,
    /// Key string → action mapping.
    key_bindings: KeybindingOptions,
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_bindings(KeybindingOptions::default())
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeybindingOptions) -> Self {
        Self {
            held: FxHashSet::default(),
            key_bindings,
        }
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeybindingOptions {
        &self.key_bindings
    }

    /// Whether the key bound to `action` is down.
    #[must_use]
    pub fn is_held(&self, action: KeyAction) -> bool {
        self.held.contains(&action)
    }

    /// Process a cursor, button, or scroll event.
    pub fn handle_event(&mut self, event: InputEvent, frame: &mut FrameContext) {
        match event {
            InputEvent::CursorMoved { x, y } => {
                let _ = frame.controller.handle_cursor(x, y);
            }
            InputEvent::MouseDelta { dx, dy } => {
                let _ = frame.controller.handle_motion(dx, dy);
            }
            InputEvent::MouseButton { button, pressed } => {
                log_mouse_button(button, pressed);
            }
            InputEvent::Scroll { delta } => {
                frame.controller.process_mouse_scroll(delta);
            }
        }
    }

    /// Process a key transition. `key` uses the `winit::keyboard::KeyCode`
    /// debug format (`"KeyW"`, `"Digit1"`, `"BracketRight"`).
    ///
    /// Returns the action that fired on this press edge, if any.
    pub fn handle_key(
        &mut self,
        key: &str,
        pressed: bool,
        frame: &mut FrameContext,
    ) -> Option<KeyAction> {
        let action = self.key_bindings.lookup(key)?;
        if !pressed {
            let _ = self.held.remove(&action);
            return None;
        }
        if !self.held.insert(action) || action.movement().is_some() {
            return None;
        }

        if let Some(mode) = action.wrap_mode() {
            frame.select_wrap_mode(mode);
            return Some(action);
        }
        match action {
            KeyAction::ToggleProjection => frame.toggle_projection(),
            KeyAction::Exit => frame.exit_requested = true,
            KeyAction::UvScaleUp => frame.adjust_uv_scale(1.0),
            KeyAction::UvScaleDown => frame.adjust_uv_scale(-1.0),
            KeyAction::ToggleLampOrbit => frame.toggle_lamp_orbit(),
            _ => {}
        }
        Some(action)
    }

    /// Move the camera for every held movement key over `dt` seconds.
    pub fn apply_held(&self, frame: &mut FrameContext, dt: f32) {
        for movement in self.held.iter().filter_map(|a| a.movement()) {
            frame.controller.process_keyboard(movement, dt);
        }
    }

    /// Forget held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

fn log_mouse_button(button: MouseButton, pressed: bool) {
    match button {
        MouseButton::Left | MouseButton::Middle | MouseButton::Right => {
            let state = if pressed { "pressed" } else { "released" };
            log::info!("{} mouse button {state}", button.name());
        }
        MouseButton::Other => log::info!("Unhandled mouse button event"),
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::camera::core::ProjectionMode;
    use crate::gpu::texture::WrapMode;

    #[test]
    fn projection_toggles_on_press_edge_only() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();

        assert_eq!(
            input.handle_key("KeyP", true, &mut frame),
            Some(KeyAction::ToggleProjection)
        );
        assert_eq!(frame.projection, ProjectionMode::Orthographic);

        // Held / repeated press does not toggle back.
        assert_eq!(input.handle_key("KeyP", true, &mut frame), None);
        assert_eq!(frame.projection, ProjectionMode::Orthographic);

        let _ = input.handle_key("KeyP", false, &mut frame);
        let _ = input.handle_key("KeyP", true, &mut frame);
        assert_eq!(frame.projection, ProjectionMode::Perspective);
    }

    #[test]
    fn brackets_step_uv_scale_once_per_press() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();

        let _ = input.handle_key("BracketRight", true, &mut frame);
        let _ = input.handle_key("BracketRight", true, &mut frame);
        let _ = input.handle_key("BracketRight", false, &mut frame);
        assert!((frame.uv_scale - Vec2::splat(1.1)).abs().max_element() < 1e-6);

        let _ = input.handle_key("BracketLeft", true, &mut frame);
        let _ = input.handle_key("BracketLeft", false, &mut frame);
        let _ = input.handle_key("BracketLeft", true, &mut frame);
        assert!((frame.uv_scale - Vec2::splat(0.9)).abs().max_element() < 1e-6);
    }

    #[test]
    fn digits_select_wrap_modes() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        for (key, mode) in [
            ("Digit2", WrapMode::MirroredRepeat),
            ("Digit3", WrapMode::ClampToEdge),
            ("Digit4", WrapMode::ClampToBorder),
            ("Digit1", WrapMode::Repeat),
        ] {
            let _ = input.handle_key(key, true, &mut frame);
            let _ = input.handle_key(key, false, &mut frame);
            assert_eq!(frame.wrap_mode, mode);
        }
    }

    #[test]
    fn escape_requests_exit() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        let _ = input.handle_key("Escape", true, &mut frame);
        assert!(frame.exit_requested);
    }

    #[test]
    fn held_movement_applies_each_frame() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        assert_eq!(input.handle_key("KeyW", true, &mut frame), None);
        assert!(input.is_held(KeyAction::MoveForward));

        input.apply_held(&mut frame, 0.2);
        input.apply_held(&mut frame, 0.2);
        let z = frame.controller.camera.position.z;
        assert!((z - 2.0).abs() < 1e-5);

        let _ = input.handle_key("KeyW", false, &mut frame);
        input.apply_held(&mut frame, 1.0);
        assert_eq!(frame.controller.camera.position.z, z);
    }

    #[test]
    fn q_and_e_move_along_camera_up() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        let _ = input.handle_key("KeyQ", true, &mut frame);
        input.apply_held(&mut frame, 0.4);
        assert!((frame.controller.camera.position - Vec3::new(0.0, 1.0, 3.0)).length() < 1e-5);
        input.release_all();
        let _ = input.handle_key("KeyE", true, &mut frame);
        input.apply_held(&mut frame, 0.4);
        assert!((frame.controller.camera.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn mouse_delta_turns_without_first_mouse_guard() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();

        // Same motion repeated, as when the cursor is pinned at an edge.
        for _ in 0..3 {
            input.handle_event(InputEvent::MouseDelta { dx: 10.0, dy: 0.0 }, &mut frame);
        }
        assert!((frame.controller.camera.yaw - -87.0).abs() < 1e-5);

        // Downward motion looks down.
        input.handle_event(InputEvent::MouseDelta { dx: 0.0, dy: 20.0 }, &mut frame);
        assert!((frame.controller.camera.pitch - -2.0).abs() < 1e-5);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        assert_eq!(input.handle_key("KeyZ", true, &mut frame), None);
    }

    #[test]
    fn scroll_and_cursor_drive_the_camera() {
        let mut input = InputProcessor::new();
        let mut frame = FrameContext::default();
        input.handle_event(InputEvent::Scroll { delta: 5.0 }, &mut frame);
        assert_eq!(frame.controller.camera.zoom, 40.0);

        input.handle_event(InputEvent::CursorMoved { x: 0.0, y: 0.0 }, &mut frame);
        input.handle_event(InputEvent::CursorMoved { x: 50.0, y: 0.0 }, &mut frame);
        assert!((frame.controller.camera.yaw - -85.0).abs() < 1e-5);

        input.handle_event(
            InputEvent::MouseButton {
                button: MouseButton::Other,
                pressed: true,
            },
            &mut frame,
        );
    }
}
