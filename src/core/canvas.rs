/// Color stop for gradient fills - offset in [0, 1], straight RGBA in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub rgba: [f32; 4],
}

impl ColorStop {
    pub const fn new(offset: f32, rgba: [f32; 4]) -> Self {
        Self { offset, rgba }
    }

    /// Opaque stop from a packed 0xRRGGBB value
    pub fn hex(offset: f32, hex: u32) -> Self {
        let c = crate::math::Color::from_hex(hex);
        Self::new(offset, [c.r, c.g, c.b, 1.0])
    }
}

/// 2D drawing operations for canvas
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Replace every pixel with color (r, g, b, a)
    Clear([u8; 4]),

    /// Fill the whole canvas with a gradient along (x0, y0) -> (x1, y1)
    LinearGradient { x0: f32, y0: f32, x1: f32, y1: f32, stops: Vec<ColorStop> },

    /// Fill the whole canvas with a gradient between two concentric radii
    RadialGradient { cx: f32, cy: f32, r0: f32, r1: f32, stops: Vec<ColorStop> },

    /// Stroke a circle outline, anti-aliased, composited source-over
    StrokeCircle { cx: f32, cy: f32, radius: f32, line_width: f32, rgba: [f32; 4] },
}

/// Canvas state - straight-alpha RGBA8 pixel buffer with pending draw operations
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Vec<u8>,
    operations: Vec<DrawOp>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Create new transparent canvas with dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            operations: Vec::new(),
            width,
            height,
        }
    }

    /// Add draw operation - functional style
    pub fn draw(mut self, op: DrawOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Execute all pending operations and return new canvas
    pub fn execute_ops(&self) -> Self {
        let mut canvas = Self {
            pixels: self.pixels.clone(),
            operations: Vec::new(),
            width: self.width,
            height: self.height,
        };

        for op in &self.operations {
            canvas.execute_op(op);
        }

        canvas
    }

    fn execute_op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Clear(rgba) => self.clear(*rgba),
            DrawOp::LinearGradient { x0, y0, x1, y1, stops } => {
                let (dx, dy) = (x1 - x0, y1 - y0);
                let len_sq = dx * dx + dy * dy;
                self.fill_with(|x, y| {
                    let t = if len_sq > 0.0 {
                        ((x - x0) * dx + (y - y0) * dy) / len_sq
                    } else {
                        0.0
                    };
                    sample_stops(stops, t)
                });
            }
            DrawOp::RadialGradient { cx, cy, r0, r1, stops } => {
                let span = r1 - r0;
                self.fill_with(|x, y| {
                    let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                    let t = if span > 0.0 { (dist - r0) / span } else { 1.0 };
                    sample_stops(stops, t)
                });
            }
            DrawOp::StrokeCircle { cx, cy, radius, line_width, rgba } => {
                self.stroke_circle(*cx, *cy, *radius, *line_width, *rgba)
            }
        }
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Composite a per-pixel source color over the whole canvas, sampling at pixel centres
    fn fill_with(&mut self, shade: impl Fn(f32, f32) -> [f32; 4]) {
        for y in 0..self.height {
            for x in 0..self.width {
                let src = shade(x as f32 + 0.5, y as f32 + 0.5);
                self.blend_pixel(x, y, src);
            }
        }
    }

    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, line_width: f32, rgba: [f32; 4]) {
        let half = line_width * 0.5;
        let reach = radius + half + 1.0;

        let x_min = (cx - reach).floor().max(0.0) as u32;
        let y_min = (cy - reach).floor().max(0.0) as u32;
        let x_max = ((cx + reach).ceil().max(0.0) as u32).min(self.width);
        let y_max = ((cy + reach).ceil().max(0.0) as u32).min(self.height);

        for y in y_min..y_max {
            for x in x_min..x_max {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let ring_dist = ((dx * dx + dy * dy).sqrt() - radius).abs();
                let coverage = (half + 0.5 - ring_dist).clamp(0.0, 1.0);

                if coverage > 0.0 {
                    let [r, g, b, a] = rgba;
                    self.blend_pixel(x, y, [r, g, b, a * coverage]);
                }
            }
        }
    }

    /// Source-over composite in straight alpha
    fn blend_pixel(&mut self, x: u32, y: u32, src: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = ((y * self.width + x) * 4) as usize;
        let dst = &mut self.pixels[idx..idx + 4];
        let da = dst[3] as f32 / 255.0;
        let sa = src[3].clamp(0.0, 1.0);
        let out_a = sa + da * (1.0 - sa);

        for c in 0..3 {
            let d = dst[c] as f32 / 255.0;
            let out = if out_a > 0.0 {
                (src[c] * sa + d * da * (1.0 - sa)) / out_a
            } else {
                0.0
            };
            dst[c] = to_u8(out);
        }
        dst[3] = to_u8(out_a);
    }

    /// RGBA value at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    /// Get pixel buffer
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the canvas, keeping only its pixels
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Get canvas dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Interpolate gradient stops at `t`, clamping outside the first/last stop
fn sample_stops(stops: &[ColorStop], t: f32) -> [f32; 4] {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [0.0; 4],
    };

    if t <= first.offset {
        return first.rgba;
    }
    if t >= last.offset {
        return last.rgba;
    }

    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 { (t - a.offset) / span } else { 0.0 };
            let mut out = [0.0; 4];
            for (i, o) in out.iter_mut().enumerate() {
                *o = a.rgba[i] + (b.rgba[i] - a.rgba[i]) * f;
            }
            return out;
        }
    }

    last.rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_creation() {
        let canvas = Canvas::new(100, 100);
        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.pixels().len(), 100 * 100 * 4);
    }

    #[test]
    fn canvas_clear() {
        let canvas = Canvas::new(10, 10).draw(DrawOp::Clear([255, 0, 0, 255])).execute_ops();

        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(9, 9), Some([255, 0, 0, 255]));
    }

    #[test]
    fn pending_ops_do_not_touch_pixels() {
        let canvas = Canvas::new(4, 4).draw(DrawOp::Clear([1, 2, 3, 4]));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn sample_stops_clamps_and_interpolates() {
        let stops = [
            ColorStop::new(0.0, [0.0, 0.0, 0.0, 1.0]),
            ColorStop::new(1.0, [1.0, 1.0, 1.0, 1.0]),
        ];
        assert_eq!(sample_stops(&stops, -1.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(sample_stops(&stops, 2.0), [1.0, 1.0, 1.0, 1.0]);
        let mid = sample_stops(&stops, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sample_stops_empty_is_transparent() {
        assert_eq!(sample_stops(&[], 0.5), [0.0; 4]);
    }

    #[test]
    fn stroke_outside_canvas_is_clipped() {
        let canvas = Canvas::new(8, 8)
            .draw(DrawOp::StrokeCircle { cx: -50.0, cy: -50.0, radius: 5.0, line_width: 2.0, rgba: [1.0; 4] })
            .execute_ops();
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }
}
