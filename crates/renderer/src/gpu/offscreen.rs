use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::frame::FramePlan;
use crate::geometry::{map_read, GeometryBuffers};
use crate::types::{AdapterProfile, RendererConfig};

use super::context::{create_instance, ensure_fits, request_device, DepthTarget, DeviceBundle};
use super::pipeline::TrianglePipeline;

const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_PIXEL: u32 = 4;

/// One rendered frame read back as tightly packed RGBA8 rows, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCapture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FrameCapture {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * BYTES_PER_PIXEL) as usize;
        let texel = self.pixels.get(offset..offset + BYTES_PER_PIXEL as usize)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }
}

/// Renders the same triangle as the window path into an off-screen texture.
pub struct OffscreenRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_profile: AdapterProfile,
    size: PhysicalSize<u32>,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    depth: DepthTarget,
    geometry: GeometryBuffers,
    pipeline: TrianglePipeline,
    plan: FramePlan,
}

impl OffscreenRenderer {
    /// Builds a surfaceless context honouring `config.context`.
    ///
    /// Adapter and device failures surface as [`crate::ContextError`] so callers
    /// can tell a missing GPU apart from a broken pipeline.
    pub fn new(config: &RendererConfig, size: (u32, u32)) -> Result<Self> {
        let instance = create_instance(&config.context);
        let DeviceBundle {
            device,
            queue,
            adapter_profile,
            ..
        } = request_device(&instance, &config.context, None)?;

        let size = PhysicalSize::new(size.0.max(1), size.1.max(1));
        ensure_fits(&device, size)?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthTarget::new(&device, size);

        let plan = FramePlan::new(config.clear_color);
        let geometry = GeometryBuffers::upload(&device);
        let pipeline = TrianglePipeline::new(&device, CAPTURE_FORMAT, &geometry, &plan)
            .context("failed to build shader program")?;

        Ok(Self {
            device,
            queue,
            adapter_profile,
            size,
            target,
            target_view,
            depth,
            geometry,
            pipeline,
            plan,
        })
    }

    pub fn adapter_profile(&self) -> &AdapterProfile {
        &self.adapter_profile
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    /// Reads the vertex buffer back from device memory.
    pub fn vertex_data(&self) -> Result<Vec<f32>> {
        self.geometry.read_back(&self.device, &self.queue)
    }

    /// Draws one frame and copies it back to the host.
    pub fn render_frame(&self) -> Result<FrameCapture> {
        let unpadded_row = self.size.width * BYTES_PER_PIXEL;
        let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen readback"),
            size: u64::from(padded_row) * u64::from(self.size.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("offscreen encoder"),
            });
        self.pipeline.encode(
            &mut encoder,
            &self.target_view,
            &self.depth.view,
            &self.geometry,
            &self.plan,
        );
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.size.height),
                },
            },
            wgpu::Extent3d {
                width: self.size.width,
                height: self.size.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let padded = map_read(&self.device, &readback)?;
        let mut pixels = Vec::with_capacity((unpadded_row * self.size.height) as usize);
        for row in padded.chunks_exact(padded_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_row as usize]);
        }

        Ok(FrameCapture {
            width: self.size.width,
            height: self.size.height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_pixel_indexes_rows_top_down() {
        let capture = FrameCapture {
            width: 2,
            height: 2,
            pixels: vec![
                1, 1, 1, 1, 2, 2, 2, 2, //
                3, 3, 3, 3, 4, 4, 4, 4,
            ],
        };
        assert_eq!(capture.pixel(0, 0), Some([1, 1, 1, 1]));
        assert_eq!(capture.pixel(1, 0), Some([2, 2, 2, 2]));
        assert_eq!(capture.pixel(0, 1), Some([3, 3, 3, 3]));
        assert_eq!(capture.pixel(2, 0), None);
        assert_eq!(capture.pixel(0, 2), None);
    }
}
