//! GPU resource management.
//!
//! Provides wgpu device/surface initialization, mesh and texture resources,
//! and the shader program abstraction built on naga-oil composition.

/// Vertex/index buffer upload, draw, and teardown.
pub mod mesh;
/// Shared wgpu boilerplate for bind group layouts and mesh pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Staged shader compile/link and the uniform location cache.
pub mod shader;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Sampled textures, wrap modes, and the depth attachment.
pub mod texture;
