use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::frame::FramePlan;
use crate::geometry::GeometryBuffers;
use crate::types::{AdapterProfile, RendererConfig};

use super::context::GpuContext;
use super::pipeline::TrianglePipeline;

/// Every GPU object the windowed renderer owns, created once in bootstrap order.
pub(crate) struct GpuState {
    context: GpuContext,
    geometry: GeometryBuffers,
    pipeline: TrianglePipeline,
}

impl GpuState {
    pub(crate) fn new(
        window: Arc<Window>,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
        plan: &FramePlan,
    ) -> Result<Self> {
        let context = GpuContext::new(window, initial_size, &config.context)?;
        let geometry = GeometryBuffers::upload(&context.device);
        let pipeline =
            TrianglePipeline::new(&context.device, context.config.format, &geometry, plan)
                .context("failed to build shader program")?;

        Ok(Self {
            context,
            geometry,
            pipeline,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size()
    }

    pub(crate) fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        self.context.reconfigure(size);
    }

    /// Acquires the next surface texture and records the frame plan into it.
    ///
    /// The returned texture has been submitted but not yet presented.
    pub(crate) fn render(
        &self,
        plan: &FramePlan,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        self.pipeline.encode(
            &mut encoder,
            &view,
            &self.context.depth.view,
            &self.geometry,
            plan,
        );
        self.context.queue.submit(std::iter::once(encoder.finish()));
        Ok(frame)
    }
}
