use std::sync::Arc;

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::ContextError;
use crate::types::{AdapterProfile, ContextRequest};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Adapter, device, and queue resolved for a [`ContextRequest`].
pub(crate) struct DeviceBundle {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_profile: AdapterProfile,
}

pub(crate) fn create_instance(request: &ContextRequest) -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: request.backends,
        ..Default::default()
    })
}

/// Picks an adapter and opens a device on it. No fallback adapter is tried.
pub(crate) fn request_device(
    instance: &wgpu::Instance,
    request: &ContextRequest,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> Result<DeviceBundle, ContextError> {
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: request.power_preference,
        compatible_surface,
        force_fallback_adapter: false,
    }))
    .map_err(ContextError::NoAdapter)?;

    let adapter_profile = AdapterProfile::from_wgpu(&adapter.get_info());
    let is_software = adapter_profile.is_software();
    tracing::debug!(
        name = %adapter_profile.name,
        backend = ?adapter_profile.backend,
        device_type = ?adapter_profile.device_type,
        is_software,
        "selected GPU adapter"
    );
    if is_software {
        tracing::warn!(adapter = %adapter_profile.name, "software rasterizer detected");
    }

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("hello-triangle device"),
        required_features: wgpu::Features::empty(),
        required_limits: request.required_limits.clone(),
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::default(),
    }))
    .map_err(ContextError::Device)?;

    Ok(DeviceBundle {
        adapter,
        device,
        queue,
        adapter_profile,
    })
}

pub(crate) fn ensure_fits(device: &wgpu::Device, size: PhysicalSize<u32>) -> Result<(), ContextError> {
    let max = device.limits().max_texture_dimension_2d;
    if size.width > max || size.height > max {
        return Err(ContextError::SurfaceTooLarge {
            width: size.width,
            height: size.height,
            max,
        });
    }
    Ok(())
}

/// Depth attachment matching the color target's size.
pub(crate) struct DepthTarget {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// The window's surface plus the device that presents to it.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth: DepthTarget,
    pub adapter_profile: AdapterProfile,
}

impl GpuContext {
    pub(crate) fn new(
        window: Arc<Window>,
        initial_size: PhysicalSize<u32>,
        request: &ContextRequest,
    ) -> Result<Self> {
        let instance = create_instance(request);
        let surface = instance
            .create_surface(window)
            .map_err(ContextError::Surface)?;

        let DeviceBundle {
            adapter,
            device,
            queue,
            adapter_profile,
        } = request_device(&instance, request, Some(&surface))?;

        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        ensure_fits(&device, size)?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Fragment outputs should land in the framebuffer as written, so skip sRGB formats.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                let fallback = surface_caps.formats[0];
                tracing::warn!(
                    ?fallback,
                    "no linear (non-sRGB) surface format available; falling back to {:?}",
                    fallback
                );
                fallback
            });

        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or_else(|| surface_caps.present_modes[0]);
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::CompositeAlphaMode::Opaque)
            .unwrap_or_else(|| surface_caps.alpha_modes[0]);
        tracing::debug!(?surface_format, ?present_mode, ?alpha_mode, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth = DepthTarget::new(&device, size);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            depth,
            adapter_profile,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Reconfigures the surface after the presentation engine lost or outdated it.
    pub(crate) fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        if size != self.size() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.depth = DepthTarget::new(&self.device, size);
        }
        self.surface.configure(&self.device, &self.config);
    }
}
