/// What the renderer asks of the graphics stack before anything is drawn.
///
/// There is no negotiation: if no adapter or device satisfies the request the
/// bootstrap fails instead of retrying with weaker settings.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    /// Backends the instance may pick an adapter from.
    pub backends: wgpu::Backends,
    /// Preferred class of adapter.
    pub power_preference: wgpu::PowerPreference,
    /// Limits the device must honour.
    pub required_limits: wgpu::Limits,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Window title.
    pub title: String,
    /// Whether the window manager may resize the window.
    pub resizable: bool,
    /// Adapter and device requirements.
    pub context: ContextRequest,
    /// Background color written by every frame's clear.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    /// A fixed 640x480 "Hello Triangle" window over an opaque black background.
    fn default() -> Self {
        Self {
            surface_size: (640, 480),
            title: "Hello Triangle".to_string(),
            resizable: false,
            context: ContextRequest::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

/// Identity of the adapter the device was created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub driver: String,
    pub driver_info: String,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            driver: info.driver.clone(),
            driver_info: info.driver_info.clone(),
        }
    }

    /// CPU rasterizers render correctly but slowly; worth a warning.
    pub fn is_software(&self) -> bool {
        if self.device_type == wgpu::DeviceType::Cpu {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "lavapipe", "swiftshader", "softpipe"]
            .iter()
            .any(|marker| name.contains(marker))
    }

    /// Human readable API/driver version, e.g. `Vulkan NVIDIA 550.54`.
    pub fn api_version(&self) -> String {
        let mut parts = vec![format!("{:?}", self.backend)];
        for part in [&self.driver, &self.driver_info] {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }
        parts.join(" ")
    }

    /// The two lines printed on start-up: renderer name, then API version.
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Renderer: {}", self.name),
            format!("Graphics API version supported: {}", self.api_version()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            driver: "NVIDIA".to_string(),
            driver_info: " 550.54 ".to_string(),
        }
    }

    #[test]
    fn default_config_is_a_fixed_hello_triangle_window() {
        let config = RendererConfig::default();
        assert_eq!(config.surface_size, (640, 480));
        assert_eq!(config.title, "Hello Triangle");
        assert!(!config.resizable);
        assert_eq!(config.clear_color, wgpu::Color::BLACK);
    }

    #[test]
    fn summary_lines_name_adapter_then_version() {
        let lines = profile("GeForce RTX", wgpu::DeviceType::DiscreteGpu).summary_lines();
        assert_eq!(lines[0], "Renderer: GeForce RTX");
        assert_eq!(lines[1], "Graphics API version supported: Vulkan NVIDIA 550.54");
    }

    #[test]
    fn api_version_skips_empty_driver_fields() {
        let mut profile = profile("Adapter", wgpu::DeviceType::IntegratedGpu);
        profile.driver.clear();
        profile.driver_info = "   ".to_string();
        assert_eq!(profile.api_version(), "Vulkan");
    }

    #[test]
    fn detects_software_rasterizers() {
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Other).is_software());
        assert!(profile("Generic", wgpu::DeviceType::Cpu).is_software());
        assert!(!profile("Radeon RX 7800", wgpu::DeviceType::DiscreteGpu).is_software());
    }
}
