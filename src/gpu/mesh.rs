//! GPU-side mesh buffers: one-shot upload, draw, and teardown.

use wgpu::util::DeviceExt;

use crate::geometry::{MeshData, Vertex};

/// Vertex attribute layouts understood by the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// Interleaved position (loc 0), normal (loc 1), UV (loc 2): stride 32.
    PositionNormalUv,
    /// Bare position (loc 0): stride 12.
    Position,
}

const POSITION_NORMAL_UV_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

impl VertexLayout {
    /// Bytes between consecutive vertices.
    #[must_use]
    pub const fn stride(self) -> u64 {
        match self {
            Self::PositionNormalUv => Vertex::STRIDE as u64,
            Self::Position => size_of::<[f32; 3]>() as u64,
        }
    }

    /// The wgpu vertex buffer layout for pipeline creation.
    #[must_use]
    pub fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            Self::PositionNormalUv => &POSITION_NORMAL_UV_ATTRIBUTES,
            Self::Position => &POSITION_ATTRIBUTES,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: Option<wgpu::Buffer>,
}

/// Vertex (and optional index) buffers for one uploaded mesh.
///
/// Immutable after upload. [`destroy`](Self::destroy) releases the buffers;
/// calling it again, or drawing afterwards, does nothing.
pub struct GpuMesh {
    label: String,
    buffers: Option<MeshBuffers>,
    layout: VertexLayout,
    vertex_count: u32,
    index_count: u32,
}

impl GpuMesh {
    /// Upload an interleaved mesh with its index buffer.
    #[must_use]
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_SRC,
        });
        log::debug!(
            "Uploaded mesh '{label}': {} vertices, {} indices",
            mesh.vertex_count(),
            mesh.index_count()
        );
        Self {
            label: label.to_owned(),
            buffers: Some(MeshBuffers {
                vertex,
                index: Some(index),
            }),
            layout: VertexLayout::PositionNormalUv,
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
        }
    }

    /// Upload a bare position triangle list with no index buffer.
    #[must_use]
    pub fn upload_positions(
        device: &wgpu::Device,
        label: &str,
        positions: &[[f32; 3]],
    ) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });
        log::debug!("Uploaded mesh '{label}': {} positions", positions.len());
        Self {
            label: label.to_owned(),
            buffers: Some(MeshBuffers {
                vertex,
                index: None,
            }),
            layout: VertexLayout::Position,
            vertex_count: positions.len() as u32,
            index_count: 0,
        }
    }

    /// Vertex layout this mesh was uploaded with.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Number of vertices in the vertex buffer.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices (0 for non-indexed meshes).
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Whether the buffers are still alive.
    pub fn is_live(&self) -> bool {
        self.buffers.is_some()
    }

    /// The vertex buffer, if not destroyed.
    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffers.as_ref().map(|b| &b.vertex)
    }

    /// Bind the buffers and issue the draw. Indexed meshes use
    /// `draw_indexed`, the rest draw straight from the vertex buffer.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        render_pass.set_vertex_buffer(0, buffers.vertex.slice(..));
        match &buffers.index {
            Some(index) => {
                render_pass
                    .set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
            None => render_pass.draw(0..self.vertex_count, 0..1),
        }
    }

    /// Release the GPU buffers. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            buffers.vertex.destroy();
            if let Some(index) = buffers.index {
                index.destroy();
            }
            log::debug!("Destroyed mesh '{}'", self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::CUBOID_VERTICES, gpu::render_context::RenderContext};

    #[test]
    fn layouts_match_interleaved_offsets() {
        let layout = VertexLayout::PositionNormalUv.buffer_layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> =
            layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);

        let lamp = VertexLayout::Position.buffer_layout();
        assert_eq!(lamp.array_stride, 12);
        assert_eq!(lamp.attributes.len(), 1);
    }

    fn read_buffer(context: &RenderContext, buffer: &wgpu::Buffer) -> Vec<u8> {
        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging"),
            size: buffer.size(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = context.create_encoder();
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer.size());
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

    #[test]
    fn cuboid_readback_reproduces_literal_table() {
        let Ok(context) = pollster::block_on(RenderContext::headless(4, 4))
        else {
            return;
        };
        let mut mesh =
            GpuMesh::upload(&context.device, "Cuboid", &MeshData::cuboid());
        assert_eq!((mesh.vertex_count(), mesh.index_count()), (24, 36));

        let bytes = read_buffer(&context, mesh.vertex_buffer().unwrap());
        let floats: &[f32] = bytemuck::cast_slice(&bytes);
        let expected: &[f32] = bytemuck::cast_slice(&CUBOID_VERTICES);
        assert_eq!(floats.len(), 24 * 8);
        assert_eq!(floats, expected);

        mesh.destroy();
        mesh.destroy();
        assert!(!mesh.is_live());
        assert!(mesh.vertex_buffer().is_none());
    }

    #[test]
    fn lamp_upload_has_no_index_buffer() {
        let Ok(context) = pollster::block_on(RenderContext::headless(4, 4))
        else {
            return;
        };
        let positions = MeshData::pyramid().positions();
        let mesh = GpuMesh::upload_positions(&context.device, "Lamp", &positions);
        assert_eq!(mesh.layout(), VertexLayout::Position);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.index_count(), 0);
    }
}
