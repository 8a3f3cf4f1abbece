use glam::Vec2;

/// Render target dimensions in CSS-style logical pixels plus device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels
    pub width: u32,
    /// Height in logical pixels
    pub height: u32,
    /// Device pixels per logical pixel, already capped
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Create new viewport, rejecting zero-sized dimensions
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            width,
            height,
            pixel_ratio: 1.0,
        })
    }

    /// Same viewport with a device pixel ratio capped at `max_ratio`
    pub fn with_pixel_ratio(mut self, ratio: f32, max_ratio: f32) -> Self {
        self.pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio.min(max_ratio)
        } else {
            1.0
        };
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Backing-store size in device pixels
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    /// Map a pixel position (origin top-left) to normalized device coordinates
    ///
    /// Returns `None` for non-finite input or a zero-sized viewport. Positions
    /// outside the viewport are clamped to [-1, 1].
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.width == 0 || self.height == 0 || !x.is_finite() || !y.is_finite() {
            return None;
        }

        let nx = (x / self.width as f32) * 2.0 - 1.0;
        let ny = -(y / self.height as f32) * 2.0 + 1.0;
        Some(Vec2::new(nx, ny).clamp(Vec2::NEG_ONE, Vec2::ONE))
    }
}
