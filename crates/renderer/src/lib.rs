//! Renderer crate for the Hello Triangle example.
//!
//! The crate opens a window, resolves a `wgpu` device for it, uploads one
//! triangle and draws it every frame until the window closes:
//!
//! ```text
//!   hello-triangle
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ event loop + window ──▶ GpuContext (surface, device)
//!                                                 │
//!                       GeometryBuffers ◀─────────┤
//!                       TrianglePipeline ◀────────┘
//!          ▲
//!          └── FrameLoop: clear ─▶ draw 3 vertices ─▶ present, until close
//! ```
//!
//! Both shader stages are embedded GLSL. They are parsed and validated on the
//! CPU first so compile and link problems are reported with the stage that
//! caused them, then handed to `wgpu` inside a validation error scope.
//! [`OffscreenRenderer`] draws the identical frame into a texture for
//! verification without a window.

mod compile;
mod error;
mod frame;
mod geometry;
mod gpu;
mod types;
mod window;

pub use compile::{
    compile_stage, link, CompiledStage, InterfaceSlot, InterfaceType, StageInterface, StageKind,
    FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL,
};
pub use error::{BootstrapError, ContextError, FrameError, ShaderError};
pub use frame::{DrawCall, FrameLoop, FramePlan, LoopAction, LoopEvent, LoopState, CLEAR_DEPTH};
pub use geometry::{VertexLayout, POSITION_LOCATION, TRIANGLE_POINTS, VERTEX_COUNT};
pub use gpu::{FrameCapture, OffscreenRenderer};
pub use types::{AdapterProfile, ContextRequest, RendererConfig};

use anyhow::Result;

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and renders until it is closed.
    ///
    /// Returns an error if the window system, the graphics context, or the
    /// shader program cannot be brought up, or if the surface runs out of memory
    /// mid-loop.
    pub fn run(&mut self) -> Result<()> {
        window::run_window(&self.config)
    }
}
