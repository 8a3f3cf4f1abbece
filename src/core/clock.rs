use std::time::Instant;

/// Monotonic scene clock - seconds elapsed since the engine started
#[derive(Debug)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Seconds since the clock started
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_never_goes_backwards() {
        let clock = Clock::new();
        let first = clock.elapsed();
        let second = clock.elapsed();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
