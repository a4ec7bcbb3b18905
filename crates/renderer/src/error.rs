use thiserror::Error;

use crate::compile::StageKind;

/// Failures while bringing up the windowing system and the window itself.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not start the windowing system")]
    WindowingInit(#[source] winit::error::EventLoopError),
    #[error("could not open window")]
    WindowCreation(#[source] winit::error::OsError),
}

/// Failures while acquiring the surface, adapter, and device.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to create rendering surface")]
    Surface(#[source] wgpu::CreateSurfaceError),
    #[error("no graphics adapter satisfies the requested context")]
    NoAdapter(#[source] wgpu::RequestAdapterError),
    #[error("graphics device rejected the requested context")]
    Device(#[source] wgpu::RequestDeviceError),
    #[error("surface {width}x{height} exceeds the device texture limit of {max}")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
}

/// Failures while compiling, linking, or uploading the shader program.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to compile {stage} shader: {message}")]
    Compile { stage: StageKind, message: String },
    #[error("failed to validate {stage} shader: {message}")]
    Validate { stage: StageKind, message: String },
    #[error("{stage} shader has no `main` entry point")]
    MissingEntryPoint { stage: StageKind },
    #[error("failed to link shader program: {0}")]
    Link(String),
    #[error("device rejected {what}: {message}")]
    Device { what: &'static str, message: String },
}

/// Failures that end the frame loop early.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("surface ran out of memory")]
    OutOfMemory,
    #[error("window event loop error")]
    EventLoop(#[source] winit::error::EventLoopError),
}
