use crate::compile::{
    compile_stage, link, StageKind, FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL,
};
use crate::error::ShaderError;
use crate::frame::FramePlan;
use crate::geometry::GeometryBuffers;

use super::context::DEPTH_FORMAT;

/// The linked vertex + fragment program, with depth testing baked in.
pub(crate) struct TrianglePipeline {
    pub pipeline: wgpu::RenderPipeline,
    _vertex_module: wgpu::ShaderModule,
    _fragment_module: wgpu::ShaderModule,
}

impl TrianglePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        geometry: &GeometryBuffers,
        plan: &FramePlan,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(StageKind::Vertex, VERTEX_SHADER_GLSL)?;
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER_GLSL)?;
        link(&vertex, &fragment, &geometry.layout)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module = vertex.create_module(device);
        let fragment_module = fragment.create_module(device);
        pop_error_scope(device, "shader modules")?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("triangle pipeline layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("triangle pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[geometry.buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: plan.draw.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        pop_error_scope(device, "render pipeline")?;
        tracing::debug!(?color_format, "linked triangle pipeline");

        Ok(Self {
            pipeline,
            _vertex_module: vertex_module,
            _fragment_module: fragment_module,
        })
    }

    /// Records one frame: clear, bind program and vertex buffer, draw.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        geometry: &GeometryBuffers,
        plan: &FramePlan,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(plan.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(plan.clear_depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        render_pass.draw(plan.draw.vertices.clone(), plan.draw.instances.clone());
    }
}

fn pop_error_scope(device: &wgpu::Device, what: &'static str) -> Result<(), ShaderError> {
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Device {
            what,
            message: err.to_string(),
        }),
        None => Ok(()),
    }
}
