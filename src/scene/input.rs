use glam::Vec2;

/// Scroll progress, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress(f32);

impl ScrollProgress {
    /// Clamp `value` into [0, 1]; NaN maps to 0
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Pointer position in normalized device coordinates, within [-1, 1]²
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPosition(Vec2);

impl CursorPosition {
    pub fn new(ndc: Vec2) -> Self {
        Self(ndc.clamp(Vec2::NEG_ONE, Vec2::ONE))
    }

    pub fn get(self) -> Vec2 {
        self.0
    }
}

/// Input values as seen by one tick
///
/// Setters write into a pending snapshot; the engine latches it at the start
/// of the next tick, so a tick never observes a half-applied update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    pub cursor: CursorPosition,
    pub scroll: ScrollProgress,
}
