//! Scene rendering: the shader programs and the per-frame draw loop.

pub mod programs;
mod scene_renderer;

pub use scene_renderer::{load_scene_images, SceneRenderer};
