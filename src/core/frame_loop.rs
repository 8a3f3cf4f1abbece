use std::cell::Cell;
use std::rc::Rc;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Host-side view of a frame loop
///
/// The host scheduler checks `is_active` before requesting each redraw and
/// stops rescheduling once the owning loop has been cancelled.
#[derive(Debug, Clone)]
pub struct FrameHandle {
    active: Rc<Cell<bool>>,
}

impl FrameHandle {
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Explicit tick driver with a cancellation flag
#[derive(Debug)]
pub struct FrameLoop {
    active: Rc<Cell<bool>>,
    frame_number: u64,
    last_time: Option<f32>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            active: Rc::new(Cell::new(true)),
            frame_number: 0,
            last_time: None,
        }
    }

    pub fn handle(&self) -> FrameHandle {
        FrameHandle {
            active: Rc::clone(&self.active),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.get()
    }

    /// Stop the loop. Returns true only for the call that actually cancelled it.
    pub fn cancel(&mut self) -> bool {
        self.active.replace(false)
    }

    /// Start a frame at `time` seconds, or `None` once cancelled
    pub fn begin_frame(&mut self, time: f32) -> Option<FrameInfo> {
        if !self.is_running() {
            return None;
        }

        let delta = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last_time = Some(time);

        Some(info)
    }

    /// Total number of frames started
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
