//! Per-frame command plan and the RUNNING/CLOSED loop state machine.
//!
//! Nothing here touches the GPU or the window system; `window` translates
//! `winit` events into [`LoopEvent`]s and carries out the returned
//! [`LoopAction`]s.

use std::ops::Range;

use crate::geometry::VERTEX_COUNT;

/// Depth value every frame starts from; anything in clip space is closer.
pub const CLEAR_DEPTH: f32 = 1.0;

/// A single non-indexed draw over the bound vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
    pub topology: wgpu::PrimitiveTopology,
}

impl DrawCall {
    /// The one triangle-list draw issued every frame.
    pub fn triangle() -> Self {
        Self {
            vertices: 0..VERTEX_COUNT,
            instances: 0..1,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// Everything a frame does, fixed before the loop starts.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: wgpu::Color,
    pub clear_depth: f32,
    pub draw: DrawCall,
}

impl FramePlan {
    pub fn new(clear_color: wgpu::Color) -> Self {
        Self {
            clear_color,
            clear_depth: CLEAR_DEPTH,
            draw: DrawCall::triangle(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closed,
}

/// Window-system happenings the loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// The window system asked for a new frame.
    RedrawRequested,
    /// Pending events were drained; the loop is about to block.
    AboutToWait,
    /// The user or the OS asked the window to close.
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Encode and present the frame plan.
    Render,
    /// Ask the window system for another redraw.
    RequestRedraw,
    /// Leave the event loop.
    Exit,
    Idle,
}

#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    plan: FramePlan,
    frames_presented: u64,
}

impl FrameLoop {
    pub fn new(plan: FramePlan) -> Self {
        Self {
            state: LoopState::Running,
            plan,
            frames_presented: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn on_event(&mut self, event: LoopEvent) -> LoopAction {
        match (self.state, event) {
            (LoopState::Closed, _) => LoopAction::Idle,
            (LoopState::Running, LoopEvent::CloseRequested) => {
                self.state = LoopState::Closed;
                tracing::debug!(frames = self.frames_presented, "close requested");
                LoopAction::Exit
            }
            (LoopState::Running, LoopEvent::RedrawRequested) => LoopAction::Render,
            (LoopState::Running, LoopEvent::AboutToWait) => LoopAction::RequestRedraw,
        }
    }

    pub fn mark_presented(&mut self) {
        self.frames_presented = self.frames_presented.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_loop() -> FrameLoop {
        FrameLoop::new(FramePlan::new(wgpu::Color::BLACK))
    }

    #[test]
    fn frame_plan_draws_three_vertices_as_a_triangle_list() {
        let plan = FramePlan::new(wgpu::Color::BLACK);
        assert_eq!(plan.draw.vertices, 0..3);
        assert_eq!(plan.draw.instances, 0..1);
        assert_eq!(plan.draw.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(plan.clear_depth, 1.0);
    }

    #[test]
    fn keeps_running_until_close_is_requested() {
        let mut frame_loop = running_loop();
        for _ in 0..1_000 {
            assert_eq!(frame_loop.on_event(LoopEvent::AboutToWait), LoopAction::RequestRedraw);
            assert_eq!(frame_loop.on_event(LoopEvent::RedrawRequested), LoopAction::Render);
            frame_loop.mark_presented();
            assert_eq!(frame_loop.state(), LoopState::Running);
        }
        assert_eq!(frame_loop.frames_presented(), 1_000);

        assert_eq!(frame_loop.on_event(LoopEvent::CloseRequested), LoopAction::Exit);
        assert_eq!(frame_loop.state(), LoopState::Closed);
    }

    #[test]
    fn closed_loop_ignores_everything() {
        let mut frame_loop = running_loop();
        frame_loop.on_event(LoopEvent::CloseRequested);
        assert_eq!(frame_loop.on_event(LoopEvent::RedrawRequested), LoopAction::Idle);
        assert_eq!(frame_loop.on_event(LoopEvent::AboutToWait), LoopAction::Idle);
        assert_eq!(frame_loop.on_event(LoopEvent::CloseRequested), LoopAction::Idle);
    }

    #[test]
    fn plan_is_identical_for_every_frame() {
        let mut frame_loop = running_loop();
        let first = frame_loop.plan().clone();
        for _ in 0..10 {
            frame_loop.on_event(LoopEvent::RedrawRequested);
            frame_loop.mark_presented();
            assert_eq!(frame_loop.plan(), &first);
        }
    }
}
