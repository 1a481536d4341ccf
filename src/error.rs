//! Crate-level error types.

use std::fmt;

use crate::gpu::{
    render_context::RenderContextError, shader::ShaderError, texture::TextureError,
};

/// Errors produced by the desk-scene crate. All of them abort startup.
#[derive(Debug)]
pub enum DeskError {
    /// The OS window could not be created.
    WindowCreationFailed(String),
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A shader stage failed to compile or the program failed to link.
    Shader(ShaderError),
    /// A texture image failed to load or upload.
    Texture(TextureError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowCreationFailed(msg) => {
                write!(f, "failed to create window: {msg}")
            }
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(e) => write!(f, "shader error: {e}"),
            Self::Texture(e) => write!(f, "texture error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Texture(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for DeskError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ShaderError> for DeskError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<TextureError> for DeskError {
    fn from(e: TextureError) -> Self {
        Self::Texture(e)
    }
}

impl From<std::io::Error> for DeskError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
