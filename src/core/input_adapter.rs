use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Scroll progress gained per wheel "line"
pub const SCROLL_STEP_PER_LINE: f32 = 0.05;
/// Pixel-precise wheel distance that corresponds to a full page of progress
pub const SCROLL_PIXELS_PER_PAGE: f32 = 2000.0;

/// Host-level action derived from a window event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostAction {
    /// Pointer moved to logical pixel position (origin top-left)
    Pointer { x: f32, y: f32 },
    /// Scroll progress changed
    Scroll(f32),
    /// Window resized to logical size
    Resize { width: u32, height: u32 },
    /// Device pixel ratio changed
    PixelRatio(f32),
    /// User asked to quit
    Quit,
}

/// Adapter that bridges Winit events to scene engine inputs
///
/// Stands in for the page-level scroll tracker and pointer capture of a
/// browser host: mouse-wheel motion accumulates into a clamped progress value.
#[derive(Debug, Clone)]
pub struct WinitInput {
    scale_factor: f64,
    scroll: f32,
}

impl WinitInput {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            scroll: 0.0,
        }
    }

    /// Current accumulated scroll progress in [0, 1]
    pub fn scroll_progress(&self) -> f32 {
        self.scroll
    }

    /// Process a Winit WindowEvent and translate it into a host action
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<HostAction> {
        match event {
            WindowEvent::CloseRequested => Some(HostAction::Quit),
            WindowEvent::KeyboardInput { event, .. } => Self::key_action(event),
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.scale_factor);
                Some(HostAction::Pointer {
                    x: logical.x as f32,
                    y: logical.y as f32,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let step = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => -lines * SCROLL_STEP_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / SCROLL_PIXELS_PER_PAGE,
                };
                Some(HostAction::Scroll(self.scroll_by(step)))
            }
            WindowEvent::Resized(size) => {
                let logical = size.to_logical::<f64>(self.scale_factor);
                Some(HostAction::Resize {
                    width: logical.width.round() as u32,
                    height: logical.height.round() as u32,
                })
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                Some(HostAction::PixelRatio(*scale_factor as f32))
            }
            _ => None,
        }
    }

    /// Advance scroll progress by `step`, clamped to [0, 1]
    pub fn scroll_by(&mut self, step: f32) -> f32 {
        if step.is_finite() {
            self.scroll = (self.scroll + step).clamp(0.0, 1.0);
        }
        self.scroll
    }

    fn key_action(event: &KeyEvent) -> Option<HostAction> {
        match (event.state, event.physical_key) {
            (ElementState::Pressed, PhysicalKey::Code(KeyCode::Escape)) => Some(HostAction::Quit),
            _ => None,
        }
    }
}

impl Default for WinitInput {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit events carry private device ids, so the accumulation logic is
    // exercised directly.

    #[test]
    fn test_new_input_starts_at_top() {
        assert_eq!(WinitInput::default().scroll_progress(), 0.0);
    }

    #[test]
    fn test_scroll_accumulates_and_clamps() {
        let mut input = WinitInput::default();
        assert!((input.scroll_by(0.25) - 0.25).abs() < 1e-6);
        assert!((input.scroll_by(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(input.scroll_by(10.0), 1.0);
        assert_eq!(input.scroll_by(-3.0), 0.0);
    }

    #[test]
    fn test_non_finite_step_ignored() {
        let mut input = WinitInput::default();
        input.scroll_by(0.3);
        assert!((input.scroll_by(f32::NAN) - 0.3).abs() < 1e-6);
    }
}
