mod frame_view;
mod gpu_surface;
mod headless;

pub use frame_view::{FrameView, MeshDraw, PointsDraw};
pub use gpu_surface::GpuSurface;
pub use headless::{FrameStats, HeadlessSurface};

use crate::core::Viewport;
use crate::error::FrameError;

/// Something the engine can present frames on
pub trait RenderSurface {
    /// Current viewport in logical pixels
    fn viewport(&self) -> Viewport;

    /// Apply a new viewport; called synchronously on resize
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), FrameError>;

    /// Drop GPU bindings. Returns true only for the call that released them.
    fn release(&mut self) -> bool;
}
