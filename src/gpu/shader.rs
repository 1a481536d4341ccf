//! Shader programs: staged compile, link-time interface checks, and a
//! name-keyed uniform cache.
//!
//! A program is built in three steps. Each stage's WGSL is composed and
//! validated on its own ([`ProgramBuilder::compile_vertex`],
//! [`ProgramBuilder::compile_fragment`]), then the pair is linked
//! ([`ProgramBuilder::link`]): entry points are located, the fragment inputs
//! are matched against the vertex outputs, and every uniform block is
//! reflected into a [`UniformLocation`] per member. None of this touches the
//! GPU. [`ShaderProgram::new`] turns a [`LinkedProgram`] into a pipeline plus
//! the uniform buffers that back its cache.
//!
//! Groups 0 (per frame) and 1 (per draw, dynamic offset) belong to the
//! program. Group 2 is the material group and is owned by the texture.

use std::{borrow::Cow, collections::BTreeMap, fmt, num::NonZeroU64};

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use super::{mesh::VertexLayout, pipeline_helpers, shader_composer::ShaderComposer};

/// Bind group holding per-frame uniforms.
pub const FRAME_GROUP: u32 = 0;
/// Bind group holding per-draw uniforms (dynamic offset).
pub const OBJECT_GROUP: u32 = 1;
/// Bind group holding the texture, sampler and texture parameters.
pub const MATERIAL_GROUP: u32 = 2;

/// Diagnostic logs are cut to this many bytes.
pub const MAX_LOG_BYTES: usize = 512;

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

// ── Errors ───────────────────────────────────────────────────────────────

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl fmt::Display for ProgramStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Failures while building a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// One stage failed to parse, resolve imports, or validate.
    CompileFailed {
        /// Stage that failed.
        stage: ProgramStage,
        /// Diagnostic, at most [`MAX_LOG_BYTES`] bytes.
        log: String,
    },
    /// The stages compiled but do not form a valid program.
    LinkFailed {
        /// Diagnostic, at most [`MAX_LOG_BYTES`] bytes.
        log: String,
    },
    /// A shared `#import` module failed to register.
    ImportFailed {
        /// Module file path.
        module: String,
        /// Composer diagnostic.
        log: String,
    },
}

impl ShaderError {
    fn compile(stage: ProgramStage, log: impl Into<String>) -> Self {
        Self::CompileFailed {
            stage,
            log: truncate_log(log.into()),
        }
    }

    fn link(log: impl Into<String>) -> Self {
        Self::LinkFailed {
            log: truncate_log(log.into()),
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompileFailed { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            Self::LinkFailed { log } => {
                write!(f, "shader program failed to link: {log}")
            }
            Self::ImportFailed { module, log } => {
                write!(f, "shader module '{module}' failed to load: {log}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Cut a diagnostic to [`MAX_LOG_BYTES`] on a char boundary. Never returns
/// an empty string.
fn truncate_log(mut log: String) -> String {
    if log.len() > MAX_LOG_BYTES {
        let mut end = MAX_LOG_BYTES;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    if log.trim().is_empty() {
        log = "unknown error".to_owned();
    }
    log
}

// ── Reflection ───────────────────────────────────────────────────────────

/// Where a uniform member lives in CPU staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation {
    /// Index into [`LinkedProgram::blocks`].
    pub block: usize,
    /// Byte offset within the block.
    pub offset: u32,
    /// Byte size of the member.
    pub size: u32,
}

/// One uniform block owned by a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBlock {
    /// Bind group index.
    pub group: u32,
    /// Binding within the group.
    pub binding: u32,
    /// Byte size of the block, padding included.
    pub size: u32,
    /// Rewritten for every draw and bound with a dynamic offset.
    pub per_draw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockLayout {
    group: u32,
    binding: u32,
    size: u32,
    members: Vec<(String, u32, u32)>,
}

fn reflect_blocks(module: &naga::Module) -> Vec<BlockLayout> {
    let mut blocks = Vec::new();
    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let Some(binding) = &var.binding else {
            continue;
        };
        let inner = &module.types[var.ty].inner;
        let members = match inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| {
                    let name = m.name.clone()?;
                    let size = module.types[m.ty].inner.size(module.to_ctx());
                    Some((name, m.offset, size))
                })
                .collect(),
            _ => Vec::new(),
        };
        blocks.push(BlockLayout {
            group: binding.group,
            binding: binding.binding,
            size: inner.size(module.to_ctx()),
            members,
        });
    }
    blocks
}

fn find_entry<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Option<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeMap<u32, naga::TypeInner>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            let _ = out.insert(*location, module.types[ty].inner.clone());
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn stage_outputs(
    module: &naga::Module,
    entry: &naga::EntryPoint,
) -> BTreeMap<u32, naga::TypeInner> {
    let mut out = BTreeMap::new();
    if let Some(result) = &entry.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn stage_inputs(
    module: &naga::Module,
    entry: &naga::EntryPoint,
) -> BTreeMap<u32, naga::TypeInner> {
    let mut out = BTreeMap::new();
    for arg in &entry.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

// ── Building ─────────────────────────────────────────────────────────────

/// Progress of a [`ProgramBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing compiled yet.
    Uncompiled,
    /// The vertex stage compiled.
    VertexCompiled,
    /// Both stages compiled.
    FragmentCompiled,
    /// The program linked.
    Linked,
    /// A stage or the link failed; the builder is spent.
    Failed,
}

/// WGSL source of one stage plus the path used in diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct StageSource<'a> {
    /// WGSL text, may contain `#import` directives.
    pub source: &'a str,
    /// Path shown in diagnostics.
    pub file_path: &'a str,
}

/// Compiles two stages and links them into a [`LinkedProgram`].
pub struct ProgramBuilder {
    label: String,
    state: BuildState,
    vertex: Option<naga::Module>,
    fragment: Option<naga::Module>,
}

impl ProgramBuilder {
    /// Start an empty build.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            state: BuildState::Uncompiled,
            vertex: None,
            fragment: None,
        }
    }

    /// Current build state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Compile the vertex stage.
    ///
    /// # Errors
    ///
    /// [`ShaderError::CompileFailed`] with the composer or validator log.
    pub fn compile_vertex(
        &mut self,
        composer: &mut ShaderComposer,
        stage: StageSource<'_>,
    ) -> Result<(), ShaderError> {
        match compile_stage(composer, ProgramStage::Vertex, stage) {
            Ok(module) => {
                self.vertex = Some(module);
                self.state = BuildState::VertexCompiled;
                Ok(())
            }
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }

    /// Compile the fragment stage. The vertex stage must already be
    /// compiled.
    ///
    /// # Errors
    ///
    /// [`ShaderError::CompileFailed`] with the composer or validator log, or
    /// [`ShaderError::LinkFailed`] when called out of order.
    pub fn compile_fragment(
        &mut self,
        composer: &mut ShaderComposer,
        stage: StageSource<'_>,
    ) -> Result<(), ShaderError> {
        if self.state != BuildState::VertexCompiled {
            self.state = BuildState::Failed;
            return Err(ShaderError::link(format!(
                "'{}': fragment stage compiled before the vertex stage",
                self.label
            )));
        }
        match compile_stage(composer, ProgramStage::Fragment, stage) {
            Ok(module) => {
                self.fragment = Some(module);
                self.state = BuildState::FragmentCompiled;
                Ok(())
            }
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }

    /// Check the stage interface and reflect the uniform blocks.
    ///
    /// # Errors
    ///
    /// [`ShaderError::LinkFailed`] when a stage is missing, an entry point
    /// is absent, a fragment input is not fed by the vertex stage, a shared
    /// block disagrees between stages, or two blocks declare the same
    /// member name.
    pub fn link(&mut self) -> Result<LinkedProgram, ShaderError> {
        let (Some(vertex), Some(fragment)) = (self.vertex.take(), self.fragment.take())
        else {
            self.state = BuildState::Failed;
            return Err(ShaderError::link(format!(
                "'{}': both stages must compile before linking",
                self.label
            )));
        };
        match LinkedProgram::link(&self.label, vertex, fragment) {
            Ok(linked) => {
                self.state = BuildState::Linked;
                log::debug!(
                    "Linked shader program '{}' ({} uniforms)",
                    self.label,
                    linked.locations.len()
                );
                Ok(linked)
            }
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }
}

fn compile_stage(
    composer: &mut ShaderComposer,
    stage: ProgramStage,
    source: StageSource<'_>,
) -> Result<naga::Module, ShaderError> {
    let module = composer
        .compose_naga(source.source, source.file_path)
        .map_err(|e| ShaderError::compile(stage, composer.describe(&e)))?;
    let _ = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| {
        ShaderError::compile(stage, format!("{}: {}", source.file_path, e.as_inner()))
    })?;
    Ok(module)
}

/// Compile and link both stages in one call.
///
/// # Errors
///
/// See [`ProgramBuilder`].
pub fn compile_and_link(
    composer: &mut ShaderComposer,
    label: &str,
    vertex: StageSource<'_>,
    fragment: StageSource<'_>,
) -> Result<LinkedProgram, ShaderError> {
    let mut builder = ProgramBuilder::new(label);
    builder.compile_vertex(composer, vertex)?;
    builder.compile_fragment(composer, fragment)?;
    builder.link()
}

/// Two validated stages that agree on their interface, plus the uniform
/// cache resolved from them.
#[derive(Debug)]
pub struct LinkedProgram {
    label: String,
    vertex: naga::Module,
    fragment: naga::Module,
    blocks: Vec<UniformBlock>,
    locations: FxHashMap<String, UniformLocation>,
    uses_material: bool,
}

impl LinkedProgram {
    fn link(
        label: &str,
        vertex: naga::Module,
        fragment: naga::Module,
    ) -> Result<Self, ShaderError> {
        let vs = find_entry(&vertex, naga::ShaderStage::Vertex, VERTEX_ENTRY)
            .ok_or_else(|| {
                ShaderError::link(format!(
                    "'{label}': no vertex entry point named `{VERTEX_ENTRY}`"
                ))
            })?;
        let fs = find_entry(&fragment, naga::ShaderStage::Fragment, FRAGMENT_ENTRY)
            .ok_or_else(|| {
                ShaderError::link(format!(
                    "'{label}': no fragment entry point named `{FRAGMENT_ENTRY}`"
                ))
            })?;

        let outputs = stage_outputs(&vertex, vs);
        for (location, ty) in stage_inputs(&fragment, fs) {
            match outputs.get(&location) {
                None => {
                    return Err(ShaderError::link(format!(
                        "'{label}': fragment input @location({location}) is not \
                         written by the vertex stage"
                    )));
                }
                Some(written) if *written != ty => {
                    return Err(ShaderError::link(format!(
                        "'{label}': @location({location}) is {written:?} in the \
                         vertex stage but {ty:?} in the fragment stage"
                    )));
                }
                Some(_) => {}
            }
        }

        let mut merged: BTreeMap<(u32, u32), BlockLayout> = BTreeMap::new();
        for block in reflect_blocks(&vertex).into_iter().chain(reflect_blocks(&fragment)) {
            let key = (block.group, block.binding);
            match merged.get(&key) {
                Some(existing) if *existing != block => {
                    return Err(ShaderError::link(format!(
                        "'{label}': uniform block at group {} binding {} differs \
                         between stages",
                        key.0, key.1
                    )));
                }
                Some(_) => {}
                None => {
                    let _ = merged.insert(key, block);
                }
            }
        }

        let uses_material = merged.keys().any(|&(group, _)| group == MATERIAL_GROUP);
        let mut blocks = Vec::new();
        let mut locations = FxHashMap::default();
        for layout in merged.into_values().filter(|b| b.group < MATERIAL_GROUP) {
            let block = blocks.len();
            for (name, offset, size) in layout.members {
                if locations.contains_key(&name) {
                    return Err(ShaderError::link(format!(
                        "'{label}': uniform `{name}` is declared in more than one block"
                    )));
                }
                let _ = locations.insert(name, UniformLocation { block, offset, size });
            }
            blocks.push(UniformBlock {
                group: layout.group,
                binding: layout.binding,
                size: layout.size,
                per_draw: layout.group == OBJECT_GROUP,
            });
        }

        Ok(Self {
            label: label.to_owned(),
            vertex,
            fragment,
            blocks,
            locations,
            uses_material,
        })
    }

    /// Program-owned uniform blocks, ordered by (group, binding).
    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    /// Resolved location of a uniform member.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    /// Whether the fragment stage samples the material group.
    pub fn uses_material(&self) -> bool {
        self.uses_material
    }
}

// ── Uniform staging ──────────────────────────────────────────────────────

/// A value that can be written to a uniform member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `f32`
    Float(f32),
    /// `vec2<f32>`
    Vec2(Vec2),
    /// `vec3<f32>`
    Vec3(Vec3),
    /// `vec4<f32>`
    Vec4(Vec4),
    /// `mat4x4<f32>`, column major.
    Mat4(Mat4),
    /// `i32`
    Int(i32),
    /// `u32`
    UInt(u32),
}

impl UniformValue {
    fn to_bytes(self) -> Vec<u8> {
        match self {
            Self::Float(v) => bytemuck::bytes_of(&v).to_vec(),
            Self::Vec2(v) => bytemuck::bytes_of(&v.to_array()).to_vec(),
            Self::Vec3(v) => bytemuck::bytes_of(&v.to_array()).to_vec(),
            Self::Vec4(v) => bytemuck::bytes_of(&v.to_array()).to_vec(),
            Self::Mat4(m) => bytemuck::bytes_of(&m.to_cols_array()).to_vec(),
            Self::Int(v) => bytemuck::bytes_of(&v).to_vec(),
            Self::UInt(v) => bytemuck::bytes_of(&v).to_vec(),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        Self::UInt(v)
    }
}

struct StagedBlock {
    layout: UniformBlock,
    /// Aligned distance between per-draw slots.
    stride: u32,
    current: Vec<u8>,
    /// Committed per-draw snapshots, `stride` bytes apart.
    slots: Vec<u8>,
}

/// CPU copy of a program's uniform blocks.
///
/// `set_uniform` edits the current contents; `commit_object` appends a
/// snapshot of the per-draw blocks and returns its slot.
pub struct UniformStaging {
    blocks: Vec<StagedBlock>,
    locations: FxHashMap<String, UniformLocation>,
    max_draws: u32,
    committed: u32,
}

fn align_up(value: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

impl UniformStaging {
    /// Staging for `linked`, with room for `max_draws` per-draw snapshots
    /// spaced by `offset_alignment` bytes.
    #[must_use]
    pub fn new(linked: &LinkedProgram, max_draws: u32, offset_alignment: u32) -> Self {
        let blocks = linked
            .blocks
            .iter()
            .map(|&layout| {
                let stride = align_up(layout.size, offset_alignment);
                let slots = if layout.per_draw {
                    vec![0; (stride * max_draws) as usize]
                } else {
                    Vec::new()
                };
                StagedBlock {
                    layout,
                    stride,
                    current: vec![0; layout.size as usize],
                    slots,
                }
            })
            .collect();
        Self {
            blocks,
            locations: linked.locations.clone(),
            max_draws,
            committed: 0,
        }
    }

    /// Write `value` into the member called `name`. Unknown names and size
    /// mismatches leave staging untouched.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        let Some(loc) = self.locations.get(name).copied() else {
            log::trace!("set_uniform: no uniform named `{name}`");
            return;
        };
        let bytes = value.into().to_bytes();
        if bytes.len() != loc.size as usize {
            log::warn!(
                "set_uniform: `{name}` is {} bytes, got {}",
                loc.size,
                bytes.len()
            );
            return;
        }
        let start = loc.offset as usize;
        if let Some(dst) = self.blocks.get_mut(loc.block).and_then(|b| {
            b.current.get_mut(start..start + bytes.len())
        }) {
            dst.copy_from_slice(&bytes);
        }
    }

    /// Current staged bytes of `name`.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        let loc = self.locations.get(name)?;
        let start = loc.offset as usize;
        self.blocks
            .get(loc.block)?
            .current
            .get(start..start + loc.size as usize)
    }

    /// Snapshot the per-draw blocks into the next slot. Returns `None` when
    /// every slot of this frame is taken.
    pub fn commit_object(&mut self) -> Option<u32> {
        if self.committed >= self.max_draws {
            log::warn!(
                "commit_object: more than {} draws this frame, draw skipped",
                self.max_draws
            );
            return None;
        }
        let slot = self.committed;
        for block in self.blocks.iter_mut().filter(|b| b.layout.per_draw) {
            let start = (slot * block.stride) as usize;
            let end = start + block.current.len();
            if let Some(dst) = block.slots.get_mut(start..end) {
                dst.copy_from_slice(&block.current);
            }
        }
        self.committed += 1;
        Some(slot)
    }

    /// Forget this frame's per-draw snapshots.
    pub fn begin_frame(&mut self) {
        self.committed = 0;
    }

    /// Number of snapshots committed this frame.
    pub fn committed(&self) -> u32 {
        self.committed
    }

    /// Dynamic offsets for `group` at `slot`, one per per-draw block in
    /// binding order.
    fn dynamic_offsets(&self, group: u32, slot: u32) -> Vec<wgpu::DynamicOffset> {
        self.blocks
            .iter()
            .filter(|b| b.layout.group == group && b.layout.per_draw)
            .map(|b| slot * b.stride)
            .collect()
    }

    /// Bytes that must reach the GPU for block `index` this frame.
    fn upload_bytes(&self, index: usize) -> &[u8] {
        let Some(block) = self.blocks.get(index) else {
            return &[];
        };
        if block.layout.per_draw {
            let used = (self.committed * block.stride) as usize;
            &block.slots[..used.min(block.slots.len())]
        } else {
            &block.current
        }
    }
}

// ── GPU program ──────────────────────────────────────────────────────────

/// Pipeline parameters that do not come from the shader source.
#[derive(Clone, Copy)]
pub struct ProgramConfig<'a> {
    /// Vertex buffer layout fed to `vs_main`.
    pub vertex_layout: VertexLayout,
    /// Colour target format.
    pub color_format: wgpu::TextureFormat,
    /// Layout of group 2, required when the fragment stage samples it.
    pub material_layout: Option<&'a wgpu::BindGroupLayout>,
    /// Per-draw snapshots available each frame.
    pub max_draws: u32,
}

struct GroupBinding {
    group: u32,
    bind_group: wgpu::BindGroup,
    dynamic: bool,
}

/// A linked program on the GPU: render pipeline, uniform buffers, and the
/// staging they are filled from.
///
/// There is no implicit current program. Call [`bind`](Self::bind) on the
/// pass, then [`bind_draw`](Self::bind_draw) with a slot from
/// [`commit_object`](Self::commit_object) before each draw.
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    staging: UniformStaging,
    buffers: Vec<wgpu::Buffer>,
    groups: Vec<GroupBinding>,
}

impl ShaderProgram {
    /// Compile, link, and create the pipeline in one step.
    ///
    /// # Errors
    ///
    /// See [`compile_and_link`] and [`ShaderProgram::new`].
    pub fn compile_and_link(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        label: &str,
        vertex: StageSource<'_>,
        fragment: StageSource<'_>,
        config: ProgramConfig<'_>,
    ) -> Result<Self, ShaderError> {
        let linked = compile_and_link(composer, label, vertex, fragment)?;
        Self::new(device, linked, config)
    }

    /// Create the pipeline and uniform buffers for a linked program.
    ///
    /// # Errors
    ///
    /// [`ShaderError::LinkFailed`] if the program samples the material
    /// group but `config.material_layout` is `None`.
    pub fn new(
        device: &wgpu::Device,
        linked: LinkedProgram,
        config: ProgramConfig<'_>,
    ) -> Result<Self, ShaderError> {
        let label = linked.label.clone();
        if linked.uses_material && config.material_layout.is_none() {
            return Err(ShaderError::link(format!(
                "'{label}': fragment stage samples group {MATERIAL_GROUP} but no \
                 material layout was supplied"
            )));
        }

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let staging = UniformStaging::new(&linked, config.max_draws.max(1), alignment);

        let buffers: Vec<wgpu::Buffer> = staging
            .blocks
            .iter()
            .map(|b| {
                let size = if b.layout.per_draw {
                    b.slots.len()
                } else {
                    b.current.len()
                };
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!(
                        "{label} Uniforms g{} b{}",
                        b.layout.group, b.layout.binding
                    )),
                    size: size as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let owned_groups = linked
            .blocks
            .iter()
            .map(|b| b.group + 1)
            .max()
            .unwrap_or(0);
        let group_count = if linked.uses_material {
            MATERIAL_GROUP + 1
        } else {
            owned_groups
        };

        let mut layouts = Vec::new();
        let mut groups = Vec::new();
        for group in 0..owned_groups {
            let members: Vec<(usize, &UniformBlock)> = linked
                .blocks
                .iter()
                .enumerate()
                .filter(|(_, b)| b.group == group)
                .collect();
            let entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|(_, b)| {
                    pipeline_helpers::uniform_block(
                        b.binding,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                        b.per_draw,
                        u64::from(b.size),
                    )
                })
                .collect();
            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} Group {group} Layout")),
                entries: &entries,
            });
            if !members.is_empty() {
                let bind_entries: Vec<wgpu::BindGroupEntry> = members
                    .iter()
                    .map(|&(index, b)| wgpu::BindGroupEntry {
                        binding: b.binding,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &buffers[index],
                            offset: 0,
                            size: NonZeroU64::new(u64::from(b.size)),
                        }),
                    })
                    .collect();
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{label} Group {group}")),
                    layout: &layout,
                    entries: &bind_entries,
                });
                groups.push(GroupBinding {
                    group,
                    bind_group,
                    dynamic: members.iter().any(|(_, b)| b.per_draw),
                });
            }
            layouts.push(layout);
        }
        // Unused groups below the material group still need a layout.
        while (layouts.len() as u32) < group_count.min(MATERIAL_GROUP) {
            layouts.push(device.create_bind_group_layout(
                &wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} Empty Layout")),
                    entries: &[],
                },
            ));
        }

        let mut layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
        if let Some(material) = config.material_layout.filter(|_| linked.uses_material) {
            layout_refs.truncate(MATERIAL_GROUP as usize);
            layout_refs.push(material);
        }

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} Vertex")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(linked.vertex)),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} Fragment")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(linked.fragment)),
        });
        let pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            &label,
            &vertex_module,
            &fragment_module,
            config.vertex_layout.buffer_layout(),
            config.color_format,
            &layout_refs,
        );

        log::debug!(
            "Created shader program '{label}' ({} uniform blocks, {} draws per frame)",
            staging.blocks.len(),
            staging.max_draws
        );

        Ok(Self {
            label,
            pipeline,
            staging,
            buffers,
            groups,
        })
    }

    /// Program label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolved location of a uniform member.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.staging.locations.get(name).copied()
    }

    /// See [`UniformStaging::set_uniform`].
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.staging.set_uniform(name, value);
    }

    /// See [`UniformStaging::commit_object`].
    pub fn commit_object(&mut self) -> Option<u32> {
        self.staging.commit_object()
    }

    /// See [`UniformStaging::begin_frame`].
    pub fn begin_frame(&mut self) {
        self.staging.begin_frame();
    }

    /// Upload staged uniforms. Call once per frame after the last commit and
    /// before submitting the encoder that draws with them.
    pub fn flush(&self, queue: &wgpu::Queue) {
        for (index, buffer) in self.buffers.iter().enumerate() {
            let bytes = self.staging.upload_bytes(index);
            if !bytes.is_empty() {
                queue.write_buffer(buffer, 0, bytes);
            }
        }
    }

    /// Set the pipeline and the per-frame bind groups.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        for g in self.groups.iter().filter(|g| !g.dynamic) {
            render_pass.set_bind_group(g.group, &g.bind_group, &[]);
        }
    }

    /// Point the per-draw bind groups at `slot`.
    pub fn bind_draw(&self, render_pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        for g in self.groups.iter().filter(|g| g.dynamic) {
            let offsets = self.staging.dynamic_offsets(g.group, slot);
            render_pass.set_bind_group(g.group, &g.bind_group, &offsets);
        }
    }
}
