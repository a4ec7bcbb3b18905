//! GPU side of the renderer.
//!
//! - `context` resolves instance, adapter, device and (for the window path)
//!   the surface plus its depth target.
//! - `pipeline` compiles and links the shader pair into a render pipeline and
//!   records the per-frame pass.
//! - `state` owns the windowed resources in bootstrap order.
//! - `offscreen` renders the same frame into a texture and reads it back.

mod context;
mod offscreen;
mod pipeline;
mod state;

pub use offscreen::{FrameCapture, OffscreenRenderer};
pub(crate) use state::GpuState;
