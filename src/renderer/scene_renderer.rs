//! Per-frame draw loop over the desk scene.
//!
//! Owns every GPU resource the scene uses: one mesh per [`ShapeKind`], one
//! texture per [`TextureKind`], the Phong and lamp programs, and the depth
//! target. Objects reference meshes and textures by kind.

use std::path::Path;

use rustc_hash::FxHashMap;

use super::programs;
use crate::{
    error::DeskError,
    geometry::{self, MeshData, ShapeKind},
    gpu::{
        mesh::GpuMesh,
        render_context::RenderContext,
        shader::{ShaderProgram, MATERIAL_GROUP},
        shader_composer::ShaderComposer,
        texture::{
            self, load_image, DecodedImage, DepthTexture, TextureError,
            TextureResource, WrapMode,
        },
    },
    scene::{
        desk_layout, lamp_transform, normal_matrix, FrameContext,
        SceneObjectDescriptor, TextureKind,
    },
};

/// Decode every scene texture from `directory`.
///
/// # Errors
///
/// [`TextureError::DecodeFailed`] for the first file that fails.
pub fn load_scene_images(
    directory: &Path,
) -> Result<Vec<(TextureKind, DecodedImage)>, TextureError> {
    TextureKind::ALL
        .iter()
        .map(|&kind| Ok((kind, load_image(&directory.join(kind.file_name()))?)))
        .collect()
}

/// Draws the desk scene and the lamp marker.
pub struct SceneRenderer {
    phong: ShaderProgram,
    lamp: ShaderProgram,
    material_layout: wgpu::BindGroupLayout,
    meshes: FxHashMap<ShapeKind, GpuMesh>,
    lamp_mesh: GpuMesh,
    textures: FxHashMap<TextureKind, TextureResource>,
    objects: Vec<SceneObjectDescriptor>,
    depth: DepthTexture,
    destroyed: bool,
}

impl SceneRenderer {
    /// Load textures from `texture_dir` and build the renderer.
    ///
    /// # Errors
    ///
    /// [`DeskError::Texture`] if an image fails to load or upload,
    /// [`DeskError::Shader`] if a program fails to build.
    pub fn new(context: &RenderContext, texture_dir: &Path) -> Result<Self, DeskError> {
        let images = load_scene_images(texture_dir)?;
        Self::from_images(context, &images)
    }

    /// Build the renderer for the desk layout from already decoded images.
    ///
    /// # Errors
    ///
    /// [`DeskError::Texture`] if an image is missing or fails to upload,
    /// [`DeskError::Shader`] if a program fails to build.
    pub fn from_images(
        context: &RenderContext,
        images: &[(TextureKind, DecodedImage)],
    ) -> Result<Self, DeskError> {
        Self::with_objects(context, images, desk_layout())
    }

    /// Build the renderer for an arbitrary object list. `images` must hold
    /// one image for every [`TextureKind`].
    ///
    /// # Errors
    ///
    /// [`DeskError::Texture`] if an image is missing or fails to upload,
    /// [`DeskError::Shader`] if a program fails to build.
    pub fn with_objects(
        context: &RenderContext,
        images: &[(TextureKind, DecodedImage)],
        objects: Vec<SceneObjectDescriptor>,
    ) -> Result<Self, DeskError> {
        if let Some(kind) = TextureKind::ALL
            .into_iter()
            .find(|kind| !images.iter().any(|(k, _)| k == kind))
        {
            return Err(TextureError::DecodeFailed {
                path: kind.file_name().to_owned(),
                reason: "no image supplied".to_owned(),
            }
            .into());
        }
        let device = &context.device;

        let mut composer = ShaderComposer::new()?;
        let material_layout = texture::material_bind_group_layout(device);
        let phong = programs::phong_program(
            device,
            &mut composer,
            context.format(),
            &material_layout,
            objects.len() as u32,
        )?;
        let lamp = programs::lamp_program(device, &mut composer, context.format())?;

        let meshes = ShapeKind::ALL
            .iter()
            .map(|&kind| {
                let label = format!("{kind:?}");
                (kind, GpuMesh::upload(device, &label, &geometry::build(kind)))
            })
            .collect();
        let lamp_mesh =
            GpuMesh::upload_positions(device, "Lamp", &MeshData::pyramid().positions());

        let mut textures = FxHashMap::default();
        for (kind, image) in images {
            let resource = TextureResource::create(
                device,
                &context.queue,
                &material_layout,
                kind.file_name(),
                image,
            )?;
            let _ = textures.insert(*kind, resource);
        }

        let depth = DepthTexture::new(device, context.config.width, context.config.height);

        log::info!(
            "Scene renderer ready: {} objects, {} textures",
            objects.len(),
            textures.len()
        );

        Ok(Self {
            phong,
            lamp,
            material_layout,
            meshes,
            lamp_mesh,
            textures,
            objects,
            depth,
            destroyed: false,
        })
    }

    /// Recreate the depth target for a new framebuffer size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.depth = DepthTexture::new(device, width, height);
        }
    }

    /// Objects drawn each frame.
    pub fn objects(&self) -> &[SceneObjectDescriptor] {
        &self.objects
    }

    /// Current wrap mode of a texture.
    pub fn wrap_mode(&self, kind: TextureKind) -> Option<WrapMode> {
        self.textures.get(&kind).map(TextureResource::wrap_mode)
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Bring the keyboard-keys texture in line with the requested mode.
    fn sync_wrap_mode(&mut self, context: &RenderContext, mode: WrapMode) {
        if let Some(keys) = self.textures.get_mut(&TextureKind::KeyboardKeys) {
            let _ = keys.set_wrap_mode(
                &context.device,
                &context.queue,
                &self.material_layout,
                mode,
            );
        }
    }

    /// Stage and upload this frame's uniforms. Returns the per-draw slot of
    /// every object that got one, and the lamp's slot.
    fn stage_uniforms(
        &mut self,
        context: &RenderContext,
        frame: &FrameContext,
    ) -> (Vec<(usize, u32)>, Option<u32>) {
        let view = frame.view_matrix();
        let projection = frame.projection_matrix(context.aspect());

        let phong = &mut self.phong;
        phong.begin_frame();
        phong.set_uniform("view", view);
        phong.set_uniform("projection", projection);
        phong.set_uniform("view_position", frame.controller.camera.position);
        phong.set_uniform("light_position", frame.light_position);
        phong.set_uniform("light_color", frame.light_color);
        phong.set_uniform("object_color", frame.object_color);
        phong.set_uniform("uv_scale", frame.uv_scale);

        let mut draws = Vec::with_capacity(self.objects.len());
        for (index, object) in self.objects.iter().enumerate() {
            let model = object.transform.matrix();
            phong.set_uniform("model", model);
            phong.set_uniform("normal_matrix", normal_matrix(model));
            if let Some(slot) = phong.commit_object() {
                draws.push((index, slot));
            }
        }

        let lamp = &mut self.lamp;
        lamp.begin_frame();
        lamp.set_uniform("view", view);
        lamp.set_uniform("projection", projection);
        lamp.set_uniform(
            "model",
            lamp_transform(frame.light_position, frame.light_scale).matrix(),
        );
        let lamp_slot = lamp.commit_object();

        self.phong.flush(&context.queue);
        self.lamp.flush(&context.queue);
        (draws, lamp_slot)
    }

    /// Clear, draw every object and the lamp into `target`, and submit.
    /// The caller presents.
    pub fn render(
        &mut self,
        context: &RenderContext,
        frame: &FrameContext,
        target: &wgpu::TextureView,
    ) {
        if self.destroyed {
            return;
        }
        self.sync_wrap_mode(context, frame.wrap_mode);
        let (draws, lamp_slot) = self.stage_uniforms(context, frame);

        let mut encoder = context.create_encoder();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            self.phong.bind(&mut render_pass);
            for &(index, slot) in &draws {
                let object = &self.objects[index];
                let Some(mesh) = self.meshes.get(&object.mesh) else {
                    continue;
                };
                let Some(material) = self
                    .textures
                    .get(&object.texture)
                    .and_then(TextureResource::bind_group)
                else {
                    continue;
                };
                render_pass.set_bind_group(MATERIAL_GROUP, material, &[]);
                self.phong.bind_draw(&mut render_pass, slot);
                mesh.draw(&mut render_pass);
            }

            if let Some(slot) = lamp_slot {
                self.lamp.bind(&mut render_pass);
                self.lamp.bind_draw(&mut render_pass, slot);
                self.lamp_mesh.draw(&mut render_pass);
            }
        }
        context.submit(encoder);
    }

    /// Release every mesh and texture. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for mesh in self.meshes.values_mut() {
            mesh.destroy();
        }
        self.lamp_mesh.destroy();
        for texture in self.textures.values_mut() {
            texture.destroy();
        }
        self.destroyed = true;
        log::info!("Scene renderer resources released");
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::{Quat, Vec2, Vec3};

    use super::*;
    use crate::scene::Transform;

    const SIZE: u32 = 64;
    const GREY: u8 = 100;

    fn solid_image(rgb: [u8; 3]) -> DecodedImage {
        DecodedImage {
            pixels: rgb.repeat(4),
            width: 2,
            height: 2,
            channels: 3,
        }
    }

    fn scene_images() -> Vec<(TextureKind, DecodedImage)> {
        TextureKind::ALL
            .iter()
            .map(|&kind| (kind, solid_image([GREY; 3])))
            .collect()
    }

    /// A 2x2 plane at the origin turned to face +Z, toward the default
    /// camera at (0, 0, 3).
    fn facing_plane(texture: TextureKind) -> SceneObjectDescriptor {
        SceneObjectDescriptor {
            name: "facing plane",
            mesh: ShapeKind::Plane,
            texture,
            transform: Transform {
                translation: Vec3::ZERO,
                rotation: Quat::from_rotation_x(FRAC_PI_2),
                scale: Vec3::ONE,
            },
        }
    }

    /// Default camera with the light at the eye and the lamp marker
    /// collapsed so it covers no pixels.
    fn headlight_frame() -> FrameContext {
        let mut frame = FrameContext::default();
        frame.light_position = frame.controller.camera.position;
        frame.light_scale = 0.0;
        frame
    }

    fn offscreen_target(context: &RenderContext) -> (wgpu::Texture, wgpu::TextureView) {
        let target = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: context.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        (target, view)
    }

    fn read_target(context: &RenderContext, target: &wgpu::Texture) -> Vec<u8> {
        let bytes_per_row = SIZE * 4;
        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Target Readback"),
            size: u64::from(bytes_per_row * SIZE),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = context.create_encoder();
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
        );
        context.submit(encoder);

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let mapped = loop {
            let _ = context.device.poll(wgpu::PollType::Poll);
            if let Ok(result) = receiver.try_recv() {
                break result;
            }
        };
        mapped.unwrap();
        let bytes = slice.get_mapped_range().to_vec();
        staging.unmap();
        bytes
    }

    fn render_once(
        context: &RenderContext,
        renderer: &mut SceneRenderer,
        frame: &FrameContext,
    ) -> Vec<u8> {
        let (target, view) = offscreen_target(context);
        renderer.render(context, frame, &view);
        read_target(context, &target)
    }

    /// Phong with ambient 0.1, specular 0.8 and exponent 16, evaluated on
    /// the CPU for a white light.
    fn phong_reference(point: Vec3, normal: Vec3, light: Vec3, eye: Vec3, texel: Vec3) -> Vec3 {
        let n = normal.normalize();
        let l = (light - point).normalize();
        let v = (eye - point).normalize();
        let r = 2.0 * n.dot(l) * n - l;
        let diffuse = n.dot(l).max(0.0);
        let specular = 0.8 * v.dot(r).max(0.0).powf(16.0);
        ((0.1 + diffuse + specular) * texel).min(Vec3::ONE)
    }

    fn is_magenta(p: &[u8]) -> bool {
        p[0] > 200 && p[2] > 200 && p[1] < 30
    }

    #[test]
    fn renders_lit_scene_offscreen() {
        let Ok(context) = pollster::block_on(RenderContext::headless(SIZE, SIZE))
        else {
            return;
        };
        let mut renderer = SceneRenderer::from_images(&context, &scene_images()).unwrap();
        assert_eq!(renderer.objects().len(), 8);

        let (target, view) = offscreen_target(&context);
        let mut frame = FrameContext::default();
        frame.select_wrap_mode(WrapMode::ClampToBorder);
        renderer.render(&context, &frame, &view);
        assert_eq!(
            renderer.wrap_mode(TextureKind::KeyboardKeys),
            Some(WrapMode::ClampToBorder)
        );
        assert_eq!(renderer.wrap_mode(TextureKind::Wood), Some(WrapMode::Repeat));

        let pixels = read_target(&context, &target);
        assert!(pixels.chunks_exact(4).any(|p| p[0] > 0 || p[1] > 0 || p[2] > 0));

        renderer.destroy();
        renderer.destroy();
        assert!(renderer.is_destroyed());
        // Drawing after teardown does nothing.
        renderer.render(&context, &frame, &view);
    }

    #[test]
    fn centre_pixel_matches_phong_reference() {
        let Ok(context) = pollster::block_on(RenderContext::headless(SIZE, SIZE))
        else {
            return;
        };
        let mut renderer = SceneRenderer::with_objects(
            &context,
            &scene_images(),
            vec![facing_plane(TextureKind::Wood)],
        )
        .unwrap();
        let frame = headlight_frame();
        let pixels = render_once(&context, &mut renderer, &frame);

        let eye = frame.controller.camera.position;
        let expected = phong_reference(
            Vec3::ZERO,
            Vec3::Z,
            frame.light_position,
            eye,
            Vec3::splat(f32::from(GREY) / 255.0),
        ) * 255.0;

        let centre = ((SIZE / 2 * SIZE + SIZE / 2) * 4) as usize;
        let got = &pixels[centre..centre + 3];
        for (channel, &value) in got.iter().enumerate() {
            assert!(
                (f32::from(value) - expected[channel]).abs() <= 3.0,
                "channel {channel}: got {value}, expected {}",
                expected[channel]
            );
        }
        // The head-on highlight pushes the lit grey well above the texel.
        assert!(got[0] > GREY + 50);
    }

    #[test]
    fn clamp_to_border_paints_magenta_outside_unit_uvs() {
        let Ok(context) = pollster::block_on(RenderContext::headless(SIZE, SIZE))
        else {
            return;
        };
        let mut renderer = SceneRenderer::with_objects(
            &context,
            &scene_images(),
            vec![facing_plane(TextureKind::KeyboardKeys)],
        )
        .unwrap();
        let mut frame = headlight_frame();
        let count = |pixels: &[u8]| pixels.chunks_exact(4).filter(|p| is_magenta(p)).count();

        frame.select_wrap_mode(WrapMode::ClampToBorder);
        let unit = count(&render_once(&context, &mut renderer, &frame));
        assert_eq!(unit, 0);

        frame.uv_scale = Vec2::splat(2.0);
        let doubled = count(&render_once(&context, &mut renderer, &frame));
        // Three quarters of the plane now samples outside [0, 1].
        assert!(doubled > 1000, "only {doubled} magenta pixels");

        frame.select_wrap_mode(WrapMode::Repeat);
        let repeated = count(&render_once(&context, &mut renderer, &frame));
        assert_eq!(repeated, 0);
    }

    #[test]
    fn object_color_does_not_tint_lit_pixels() {
        let Ok(context) = pollster::block_on(RenderContext::headless(SIZE, SIZE))
        else {
            return;
        };
        let mut renderer = SceneRenderer::with_objects(
            &context,
            &scene_images(),
            vec![facing_plane(TextureKind::Wood)],
        )
        .unwrap();
        let mut frame = headlight_frame();
        frame.object_color = Vec3::ONE;
        let white = render_once(&context, &mut renderer, &frame);
        frame.object_color = Vec3::ZERO;
        let black = render_once(&context, &mut renderer, &frame);
        assert_eq!(white, black);
    }

    #[test]
    fn missing_scene_texture_is_fatal() {
        let Ok(context) = pollster::block_on(RenderContext::headless(SIZE, SIZE))
        else {
            return;
        };
        let images: Vec<_> = scene_images()
            .into_iter()
            .filter(|(kind, _)| *kind != TextureKind::KeyboardKeys)
            .collect();
        let err = SceneRenderer::from_images(&context, &images).err();
        assert!(matches!(
            err,
            Some(DeskError::Texture(TextureError::DecodeFailed { ref path, .. }))
                if path == "keyboardt.jpg"
        ));
    }

    #[test]
    fn missing_texture_directory_is_a_decode_error() {
        let err = load_scene_images(Path::new("/nonexistent/desk-scene")).unwrap_err();
        assert!(matches!(err, TextureError::DecodeFailed { .. }));
    }
}
