use super::{FrameView, RenderSurface};
use crate::core::Viewport;
use crate::error::FrameError;

/// Summary of the last frame a [`HeadlessSurface`] accepted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub number: u64,
    pub time: f32,
    pub meshes: usize,
    pub points: usize,
    pub lights: usize,
}

/// Off-screen surface that records frames instead of drawing them
///
/// Used for tests and the `--headless` mode of the binary.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    viewport: Viewport,
    frames_rendered: u64,
    last_frame: Option<FrameStats>,
    released: bool,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frames_rendered: 0,
            last_frame: None,
            released: false,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_frame(&self) -> Option<FrameStats> {
        self.last_frame
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl RenderSurface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), FrameError> {
        if self.released {
            return Err(FrameError::Released);
        }

        self.frames_rendered += 1;
        self.last_frame = Some(FrameStats {
            number: frame.frame.number,
            time: frame.frame.time,
            meshes: frame.meshes.len(),
            points: frame.points.as_ref().map_or(0, |p| p.cloud.len()),
            lights: frame.lights.len(),
        });
        Ok(())
    }

    fn release(&mut self) -> bool {
        !std::mem::replace(&mut self.released, true)
    }
}
