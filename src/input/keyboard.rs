use serde::{Deserialize, Serialize};

use crate::camera::controller::CameraMovement;
use crate::gpu::texture::WrapMode;

/// Scene actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// toggle_projection = "KeyP"
/// uv_scale_up = "BracketRight"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Fly forward while held.
    MoveForward,
    /// Fly backward while held.
    MoveBackward,
    /// Strafe left while held.
    MoveLeft,
    /// Strafe right while held.
    MoveRight,
    /// Rise along the camera up while held.
    MoveUp,
    /// Sink along the camera up while held.
    MoveDown,
    /// Switch between perspective and orthographic.
    ToggleProjection,
    /// Close the window.
    Exit,
    /// Repeat wrapping on the keyboard-keys texture.
    WrapRepeat,
    /// Mirrored-repeat wrapping on the keyboard-keys texture.
    WrapMirroredRepeat,
    /// Clamp-to-edge wrapping on the keyboard-keys texture.
    WrapClampToEdge,
    /// Clamp-to-border wrapping on the keyboard-keys texture.
    WrapClampToBorder,
    /// Grow the UV tiling scale by one step.
    UvScaleUp,
    /// Shrink the UV tiling scale by one step.
    UvScaleDown,
    /// Start or stop the lamp orbiting the scene.
    ToggleLampOrbit,
}

impl KeyAction {
    /// Camera motion for held movement keys.
    #[must_use]
    pub const fn movement(self) -> Option<CameraMovement> {
        match self {
            Self::MoveForward => Some(CameraMovement::Forward),
            Self::MoveBackward => Some(CameraMovement::Backward),
            Self::MoveLeft => Some(CameraMovement::Left),
            Self::MoveRight => Some(CameraMovement::Right),
            Self::MoveUp => Some(CameraMovement::Up),
            Self::MoveDown => Some(CameraMovement::Down),
            _ => None,
        }
    }

    /// Wrap mode selected by the wrap keys.
    #[must_use]
    pub const fn wrap_mode(self) -> Option<WrapMode> {
        match self {
            Self::WrapRepeat => Some(WrapMode::Repeat),
            Self::WrapMirroredRepeat => Some(WrapMode::MirroredRepeat),
            Self::WrapClampToEdge => Some(WrapMode::ClampToEdge),
            Self::WrapClampToBorder => Some(WrapMode::ClampToBorder),
            _ => None,
        }
    }
}
