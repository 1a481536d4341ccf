//! Scene options with TOML preset support.
//!
//! All tweakable settings (window, camera, lighting, textures,
//! keybindings) are consolidated here. Every section uses
//! `#[serde(default)]`, so a file that only overrides `[lighting]` works,
//! and the defaults reproduce the stock desk scene.

mod camera;
mod keybindings;
mod lighting;
mod textures;
mod window;

use std::path::Path;

pub use camera::CameraOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
use serde::{Deserialize, Serialize};
pub use textures::TextureOptions;
pub use window::WindowOptions;

use crate::error::DeskError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Window size and title.
    pub window: WindowOptions,
    /// Camera placement and control parameters.
    pub camera: CameraOptions,
    /// Light and lamp parameters.
    pub lighting: LightingOptions,
    /// Texture directory and wrap mode.
    pub textures: TextureOptions,
    /// Keyboard binding options.
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`DeskError::OptionsParse`] if the text is not valid options TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, DeskError> {
        let mut options: Self =
            toml::from_str(content).map_err(|e| DeskError::OptionsParse(e.to_string()))?;
        options.keybindings.fill_defaults();
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`DeskError::Io`] if the file cannot be read, or
    /// [`DeskError::OptionsParse`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, DeskError> {
        let content = std::fs::read_to_string(path).map_err(DeskError::Io)?;
        let options = Self::from_toml_str(&content)?;
        log::info!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`DeskError::OptionsParse`] if serialization fails, or
    /// [`DeskError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), DeskError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DeskError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DeskError::Io)?;
        }
        std::fs::write(path, content).map_err(DeskError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::core::ProjectionMode;
    use crate::gpu::texture::WrapMode;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[lighting]
position = [0.0, 2.0, 0.0]
orbit = true

[camera]
projection = "orthographic"

[textures]
keyboard_wrap_mode = "clamp_to_border"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.lighting.position, [0.0, 2.0, 0.0]);
        assert!(opts.lighting.orbit);
        assert_eq!(opts.camera.projection, ProjectionMode::Orthographic);
        assert_eq!(opts.textures.keyboard_wrap_mode, WrapMode::ClampToBorder);
        // Everything else should be default
        assert_eq!(opts.lighting.lamp_scale, 0.4);
        assert_eq!(opts.camera.movement_speed, 2.5);
        assert_eq!(opts.window.width, 800);
        assert_eq!(opts.window.height, 600);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyP"),
            Some(KeyAction::ToggleProjection)
        );
        assert_eq!(opts.keybindings.lookup("Digit4"), Some(KeyAction::WrapClampToBorder));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn rebinding_keeps_other_defaults() {
        let toml_str = r#"
[keybindings.bindings]
toggle_projection = "KeyO"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("KeyO"), Some(KeyAction::ToggleProjection));
        assert_eq!(opts.keybindings.lookup("KeyP"), None);
        assert_eq!(opts.keybindings.lookup("KeyW"), Some(KeyAction::MoveForward));
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml_str("[camera\nzoom = ").unwrap_err();
        assert!(matches!(err, DeskError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir().join(format!("desk-scene-opts-{}", std::process::id()));
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.window.title = "Test".to_owned();
        opts.camera.zoom = 30.0;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
