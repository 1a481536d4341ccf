//! WGSL sources and constructors for the scene's two shader programs.

use crate::gpu::{
    mesh::VertexLayout,
    shader::{ProgramConfig, ShaderError, ShaderProgram, StageSource},
    shader_composer::ShaderComposer,
};

/// Textured Phong vertex stage.
pub const PHONG_VERTEX: StageSource<'static> = StageSource {
    source: include_str!("../../assets/shaders/phong.vert.wgsl"),
    file_path: "phong.vert.wgsl",
};

/// Textured Phong fragment stage.
pub const PHONG_FRAGMENT: StageSource<'static> = StageSource {
    source: include_str!("../../assets/shaders/phong.frag.wgsl"),
    file_path: "phong.frag.wgsl",
};

/// Lamp marker vertex stage (position only).
pub const LAMP_VERTEX: StageSource<'static> = StageSource {
    source: include_str!("../../assets/shaders/lamp.vert.wgsl"),
    file_path: "lamp.vert.wgsl",
};

/// Lamp marker fragment stage (flat white).
pub const LAMP_FRAGMENT: StageSource<'static> = StageSource {
    source: include_str!("../../assets/shaders/lamp.frag.wgsl"),
    file_path: "lamp.frag.wgsl",
};

/// Every stage source, for composition checks.
pub const ALL_STAGES: [StageSource<'static>; 4] =
    [PHONG_VERTEX, PHONG_FRAGMENT, LAMP_VERTEX, LAMP_FRAGMENT];

/// Build the lit, textured program used for every desk object.
///
/// # Errors
///
/// Any [`ShaderError`] from compiling or linking the Phong stages.
pub fn phong_program(
    device: &wgpu::Device,
    composer: &mut ShaderComposer,
    color_format: wgpu::TextureFormat,
    material_layout: &wgpu::BindGroupLayout,
    max_draws: u32,
) -> Result<ShaderProgram, ShaderError> {
    ShaderProgram::compile_and_link(
        device,
        composer,
        "Phong",
        PHONG_VERTEX,
        PHONG_FRAGMENT,
        ProgramConfig {
            vertex_layout: VertexLayout::PositionNormalUv,
            color_format,
            material_layout: Some(material_layout),
            max_draws,
        },
    )
}

/// Build the unlit program that draws the lamp marker.
///
/// # Errors
///
/// Any [`ShaderError`] from compiling or linking the lamp stages.
pub fn lamp_program(
    device: &wgpu::Device,
    composer: &mut ShaderComposer,
    color_format: wgpu::TextureFormat,
) -> Result<ShaderProgram, ShaderError> {
    ShaderProgram::compile_and_link(
        device,
        composer,
        "Lamp",
        LAMP_VERTEX,
        LAMP_FRAGMENT,
        ProgramConfig {
            vertex_layout: VertexLayout::Position,
            color_format,
            material_layout: None,
            max_draws: 1,
        },
    )
}
