// Lint policy lives in the `[lints]` tables of Cargo.toml.

//! Textured, Phong-lit 3D desk scene rendered with wgpu.
//!
//! A desk with a monitor, a keyboard and a small lamp, explored with a
//! fly-through camera. Every object shares one of four procedurally built
//! meshes and one of five textures; a single point light, optionally
//! orbiting the scene, lights it with ambient, diffuse and specular terms.
//!
//! # Key entry points
//!
//! - [`renderer::SceneRenderer`] - owns GPU meshes, textures and programs
//!   and draws one frame
//! - [`scene::FrameContext`] - per-frame state: camera, projection, light,
//!   UV scale and wrap mode
//! - [`input::InputProcessor`] - maps window events onto the frame context
//! - [`options::Options`] - TOML-backed runtime configuration
//! - `Viewer` - a ready-made winit window (requires the `viewer` feature)
//!
//! # Architecture
//!
//! Geometry is generated on the CPU ([`geometry`]), uploaded once into
//! [`gpu::mesh::GpuMesh`] buffers and shared between scene objects by
//! shape. Shader stages are WGSL composed with naga_oil, validated and
//! reflected with naga, and exposed through
//! [`gpu::shader::ShaderProgram`], which resolves uniforms by name and
//! stages per-object values into a dynamic-offset buffer.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::DeskError;
pub use input::{InputEvent, MouseButton};
pub use options::Options;
pub use renderer::SceneRenderer;
pub use scene::FrameContext;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
