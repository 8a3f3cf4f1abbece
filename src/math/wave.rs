use std::f32::consts::FRAC_PI_2;

/// Sinusoid `amplitude * sin(frequency * t + phase)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl Wave {
    pub const fn sine(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    pub const fn cosine(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: FRAC_PI_2,
        }
    }

    pub fn sample(&self, time: f32) -> f32 {
        self.amplitude * (self.frequency * time + self.phase).sin()
    }
}
