use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::error::{BootstrapError, FrameError};
use crate::frame::{FrameLoop, FramePlan, LoopAction, LoopEvent};
use crate::gpu::GpuState;
use crate::types::RendererConfig;

/// Window, GPU resources, and loop state for the on-screen path.
///
/// `gpu` is declared first so the surface is dropped before the window it
/// was created from.
pub(crate) struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    frame_loop: FrameLoop,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let plan = FramePlan::new(config.clear_color);
        let size = window.inner_size();
        let gpu = GpuState::new(window.clone(), size, config, &plan)?;

        Ok(Self {
            gpu,
            window,
            frame_loop: FrameLoop::new(plan),
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    /// Renders and presents the frame plan once.
    ///
    /// Transient surface errors skip the frame; only running out of memory is fatal.
    pub(crate) fn render_frame(&mut self) -> Result<(), FrameError> {
        match self.gpu.render(self.frame_loop.plan()) {
            Ok(frame) => {
                self.window.pre_present_notify();
                frame.present();
                self.frame_loop.mark_presented();
                Ok(())
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                warn!(
                    width = size.width,
                    height = size.height,
                    "surface lost or outdated; reconfiguring"
                );
                self.gpu.reconfigure(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(FrameError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
                Ok(())
            }
            Err(other) => {
                warn!("surface error: {other:?}; retrying next frame");
                Ok(())
            }
        }
    }
}

/// Opens the window and drives the `winit` event loop until the window closes.
///
/// Bootstrap order is fixed: event loop, window, surface and device, vertex
/// buffer, shader program. Any failure returns before the loop starts.
pub(crate) fn run_window(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(BootstrapError::WindowingInit)?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .with_resizable(config.resizable)
        .build(&event_loop)
        .map_err(BootstrapError::WindowCreation)?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config)?;
    let profile = state.gpu.adapter_profile();
    for line in profile.summary_lines() {
        println!("{line}");
    }
    info!(
        adapter = %profile.name,
        backend = ?profile.backend,
        width = state.gpu.size().width,
        height = state.gpu.size().height,
        "entering frame loop"
    );
    state.window().request_redraw();

    let mut fatal = None;
    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            let loop_event = match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            LoopEvent::CloseRequested
                        }
                        WindowEvent::RedrawRequested => LoopEvent::RedrawRequested,
                        _ => return,
                    }
                }
                Event::AboutToWait => LoopEvent::AboutToWait,
                _ => return,
            };

            match state.frame_loop.on_event(loop_event) {
                LoopAction::Render => {
                    if let Err(err) = state.render_frame() {
                        error!(error = %err, "frame loop aborted");
                        fatal = Some(err);
                        elwt.exit();
                    }
                }
                LoopAction::RequestRedraw => state.window().request_redraw(),
                LoopAction::Exit => elwt.exit(),
                LoopAction::Idle => {}
            }
        })
        .map_err(FrameError::EventLoop)?;

    if let Some(err) = fatal {
        return Err(err.into());
    }
    info!(frames = state.frame_loop.frames_presented(), "window closed");
    Ok(())
}
