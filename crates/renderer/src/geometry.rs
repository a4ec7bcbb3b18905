//! The triangle's vertex data and the layout that feeds it to the vertex stage.

use std::sync::mpsc;

use anyhow::{anyhow, Context, Result};
use wgpu::util::DeviceExt;

/// Three xyz points in clip space, top vertex first.
pub const TRIANGLE_POINTS: [f32; 9] = [
    0.0, 0.5, 0.0, //
    0.5, -0.5, 0.0, //
    -0.5, -0.5, 0.0,
];

/// Number of vertices drawn each frame.
pub const VERTEX_COUNT: u32 = 3;

/// Shader input slot the position attribute is bound to.
pub const POSITION_LOCATION: u32 = 3;

const FLOATS_PER_VERTEX: usize = 3;

/// Describes how raw vertex buffer bytes map onto vertex shader inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: wgpu::BufferAddress,
    pub stride: wgpu::BufferAddress,
}

impl VertexLayout {
    /// One tightly packed `vec3<f32>` per vertex at [`POSITION_LOCATION`].
    pub const POSITION: Self = Self {
        location: POSITION_LOCATION,
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        stride: (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
    };

    pub(crate) fn attributes(&self) -> [wgpu::VertexAttribute; 1] {
        [wgpu::VertexAttribute {
            format: self.format,
            offset: self.offset,
            shader_location: self.location,
        }]
    }
}

/// Vertex buffer plus its layout, created once and never modified.
pub(crate) struct GeometryBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub layout: VertexLayout,
    attributes: [wgpu::VertexAttribute; 1],
}

impl GeometryBuffers {
    pub fn upload(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("triangle vertices"),
            contents: bytemuck::cast_slice(&TRIANGLE_POINTS),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });
        let layout = VertexLayout::POSITION;
        tracing::debug!(
            bytes = std::mem::size_of_val(&TRIANGLE_POINTS),
            location = layout.location,
            format = ?layout.format,
            "uploaded triangle vertices"
        );

        Self {
            vertex_buffer,
            layout,
            attributes: layout.attributes(),
        }
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.layout.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }

    /// Copies the vertex buffer back to the host and decodes it as floats.
    pub fn read_back(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<f32>> {
        let size = self.vertex_buffer.size();
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vertex readback encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.vertex_buffer, 0, &staging, 0, size);
        queue.submit(std::iter::once(encoder.finish()));

        let bytes = map_read(device, &staging)?;
        Ok(bytes
            .chunks_exact(std::mem::size_of::<f32>())
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}

/// Maps a `MAP_READ` buffer, blocks until the copy lands, and returns its bytes.
pub(crate) fn map_read(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>> {
    let slice = buffer.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::Wait)
        .context("failed to wait for the device")?;
    receiver
        .recv()
        .map_err(|err| anyhow!("buffer mapping callback dropped: {err}"))?
        .context("failed to map readback buffer")?;

    let bytes = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(bytes)
}
