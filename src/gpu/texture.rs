//! Sampled textures and the depth attachment.
//!
//! Decoded images are flipped so the first row in memory is the bottom row
//! (UV origin bottom-left), widened to RGBA, given a full mip chain on the
//! CPU, and uploaded once. Only the wrap mode changes after creation.

use std::{fmt, path::Path};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

use super::pipeline_helpers;

/// Border colour shown outside [0,1] in [`WrapMode::ClampToBorder`].
pub const BORDER_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Format of every sampled colour texture.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ── Errors ───────────────────────────────────────────────────────────────

/// Failures while turning an image into a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// The image file could not be opened or decoded.
    DecodeFailed {
        /// Path that failed.
        path: String,
        /// Decoder message.
        reason: String,
    },
    /// Only 3 (RGB) and 4 (RGBA) channel images are supported.
    UnsupportedChannelLayout {
        /// Channel count of the rejected image.
        count: u8,
    },
    /// Pixel buffer length disagrees with `width * height * channels`.
    SizeMismatch {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailed { path, reason } => {
                write!(f, "failed to load texture '{path}': {reason}")
            }
            Self::UnsupportedChannelLayout { count } => {
                write!(f, "unsupported channel layout: {count} channels")
            }
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "pixel buffer holds {actual} bytes, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for TextureError {}

// ── Wrap modes ───────────────────────────────────────────────────────────

/// Texture coordinate wrapping, selectable at runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Tile, mirroring every other copy.
    MirroredRepeat,
    /// Smear the edge texels.
    ClampToEdge,
    /// Paint [`BORDER_COLOR`] outside [0,1].
    ClampToBorder,
}

impl WrapMode {
    /// Human-readable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Repeat => "REPEAT",
            Self::MirroredRepeat => "MIRRORED REPEAT",
            Self::ClampToEdge => "CLAMP TO EDGE",
            Self::ClampToBorder => "CLAMP TO BORDER",
        }
    }

    /// Sampler address mode. The border colour is applied in the shader, so
    /// border mode samples as clamp-to-edge.
    #[must_use]
    pub const fn address_mode(self) -> wgpu::AddressMode {
        match self {
            Self::Repeat => wgpu::AddressMode::Repeat,
            Self::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            Self::ClampToEdge | Self::ClampToBorder => {
                wgpu::AddressMode::ClampToEdge
            }
        }
    }

    fn params(self) -> TextureParams {
        TextureParams {
            border_color: BORDER_COLOR,
            use_border: u32::from(self == Self::ClampToBorder),
            _pad: [0; 3],
        }
    }
}

/// Per-texture parameters read by the fragment shader (group 2, binding 2).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextureParams {
    /// Colour used outside [0,1] when `use_border` is set.
    pub border_color: [f32; 4],
    /// Non-zero in clamp-to-border mode.
    pub use_border: u32,
    pub(crate) _pad: [u32; 3],
}

// ── CPU-side preparation ─────────────────────────────────────────────────

/// Raw pixels as produced by the image decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Row-major, top row first.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per pixel.
    pub channels: u8,
}

/// Decode an image file, keeping its native channel count.
///
/// # Errors
///
/// [`TextureError::DecodeFailed`] if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let img = image::open(path).map_err(|e| TextureError::DecodeFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let (width, height) = (img.width(), img.height());
    let channels = img.color().channel_count();
    let pixels = match channels {
        3 => img.into_rgb8().into_raw(),
        4 => img.into_rgba8().into_raw(),
        _ => img.into_bytes(),
    };
    Ok(DecodedImage {
        pixels,
        width,
        height,
        channels,
    })
}

/// Swap row `i` with row `height - 1 - i` for every `i < height / 2`.
pub fn flip_rows(pixels: &mut [u8], width: u32, height: u32, channels: u8) {
    let row = width as usize * channels as usize;
    let height = height as usize;
    if row == 0 || pixels.len() < row * height {
        return;
    }
    for i in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - 1 - i) * row);
        top[i * row..(i + 1) * row].swap_with_slice(&mut bottom[..row]);
    }
}

/// Widen RGB to RGBA with opaque alpha; RGBA passes through.
///
/// # Errors
///
/// [`TextureError::UnsupportedChannelLayout`] for anything but 3 or 4
/// channels.
pub fn expand_to_rgba(
    pixels: &[u8],
    channels: u8,
) -> Result<Vec<u8>, TextureError> {
    match channels {
        4 => Ok(pixels.to_vec()),
        3 => Ok(pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect()),
        count => Err(TextureError::UnsupportedChannelLayout { count }),
    }
}

/// One RGBA mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    /// Level width.
    pub width: u32,
    /// Level height.
    pub height: u32,
    /// Tightly packed RGBA8 texels.
    pub data: Vec<u8>,
}

/// Number of levels in a full mip chain down to 1×1.
#[must_use]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Validate, flip, widen and mip-map a decoded image.
///
/// # Errors
///
/// [`TextureError::UnsupportedChannelLayout`] or
/// [`TextureError::SizeMismatch`].
pub fn prepare_levels(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: u8,
) -> Result<Vec<MipLevel>, TextureError> {
    if channels != 3 && channels != 4 {
        return Err(TextureError::UnsupportedChannelLayout { count: channels });
    }
    let expected = width as usize * height as usize * channels as usize;
    if pixels.len() != expected || expected == 0 {
        return Err(TextureError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let mut flipped = pixels.to_vec();
    flip_rows(&mut flipped, width, height, channels);
    let rgba = expand_to_rgba(&flipped, channels)?;

    let base = image::RgbaImage::from_raw(width, height, rgba).ok_or(
        TextureError::SizeMismatch {
            expected: width as usize * height as usize * 4,
            actual: expected / channels as usize * 4,
        },
    )?;

    let count = mip_level_count(width, height);
    let mut levels = Vec::with_capacity(count as usize);
    for level in 1..count {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        let scaled = image::imageops::resize(&base, w, h, FilterType::Triangle);
        levels.push(MipLevel {
            width: w,
            height: h,
            data: scaled.into_raw(),
        });
    }
    levels.insert(
        0,
        MipLevel {
            width,
            height,
            data: base.into_raw(),
        },
    );
    Ok(levels)
}

// ── GPU texture ──────────────────────────────────────────────────────────

/// Bind group layout shared by every textured draw (group 2): texture,
/// filtering sampler, [`TextureParams`].
#[must_use]
pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Material Bind Group Layout"),
        entries: &[
            pipeline_helpers::texture_2d(0),
            pipeline_helpers::filtering_sampler(1),
            pipeline_helpers::uniform_buffer(2),
        ],
    })
}

fn create_sampler(device: &wgpu::Device, label: &str, mode: WrapMode) -> wgpu::Sampler {
    let address = mode.address_mode();
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{label} Sampler")),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

struct TextureGpu {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    params: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// An uploaded, mip-mapped RGBA texture with a runtime-switchable wrap
/// mode.
pub struct TextureResource {
    label: String,
    gpu: Option<TextureGpu>,
    width: u32,
    height: u32,
    channels: u8,
    wrap_mode: WrapMode,
}

impl TextureResource {
    /// Upload decoded pixels. Wrap starts as [`WrapMode::Repeat`].
    ///
    /// # Errors
    ///
    /// See [`prepare_levels`].
    pub fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        image: &DecodedImage,
    ) -> Result<Self, TextureError> {
        let levels =
            prepare_levels(&image.pixels, image.width, image.height, image.channels)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.width * 4),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let wrap_mode = WrapMode::default();
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Params")),
            contents: bytemuck::bytes_of(&wrap_mode.params()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = create_sampler(device, label, wrap_mode);
        let bind_group = create_bind_group(device, layout, label, &view, &sampler, &params);

        log::debug!(
            "Created texture '{label}' ({}x{}, {} channels, {} mips)",
            image.width,
            image.height,
            image.channels,
            levels.len()
        );

        Ok(Self {
            label: label.to_owned(),
            gpu: Some(TextureGpu {
                texture,
                view,
                params,
                bind_group,
            }),
            width: image.width,
            height: image.height,
            channels: image.channels,
            wrap_mode,
        })
    }

    /// Width of the base level.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the base level.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the source image.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Current wrap mode.
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    /// Bind group for group 2, if not destroyed.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|g| &g.bind_group)
    }

    /// Switch the wrap mode. Returns `false` (and touches nothing) when
    /// `mode` is already active or the texture has been destroyed.
    pub fn set_wrap_mode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        mode: WrapMode,
    ) -> bool {
        if mode == self.wrap_mode {
            return false;
        }
        let Some(gpu) = self.gpu.as_mut() else {
            log::warn!("set_wrap_mode on destroyed texture '{}'", self.label);
            return false;
        };
        // Border colour must be in place before the mode takes effect.
        queue.write_buffer(&gpu.params, 0, bytemuck::bytes_of(&mode.params()));
        let sampler = create_sampler(device, &self.label, mode);
        gpu.bind_group =
            create_bind_group(device, layout, &self.label, &gpu.view, &sampler, &gpu.params);
        self.wrap_mode = mode;
        log::info!("Current texture wrapping mode: {}", mode.name());
        true
    }

    /// Release the GPU texture. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.texture.destroy();
            gpu.params.destroy();
            log::debug!("Destroyed texture '{}'", self.label);
        }
    }

    /// Whether the GPU texture is still alive.
    pub fn is_live(&self) -> bool {
        self.gpu.is_some()
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

// ── Depth attachment ─────────────────────────────────────────────────────

/// Depth buffer matching the framebuffer size.
pub struct DepthTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    /// Depth format used by every pipeline.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture with the given dimensions.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
