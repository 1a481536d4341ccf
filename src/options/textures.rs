use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gpu::texture::WrapMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Where textures come from and how the keyboard keys wrap.
pub struct TextureOptions {
    /// Directory holding the scene's JPEG textures.
    pub directory: PathBuf,
    /// Wrap mode of the keyboard-keys texture at startup.
    pub keyboard_wrap_mode: WrapMode,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("resources/textures"),
            keyboard_wrap_mode: WrapMode::Repeat,
        }
    }
}
