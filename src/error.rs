use thiserror::Error;

/// Failure to bring up the engine or its render surface
///
/// Every variant is fatal at construction time: no partially built engine is
/// handed back to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("render surface could not be created: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("graphics device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the selected adapter")]
    IncompatibleSurface,
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },
    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Per-frame presentation failure; the frame is skipped, the engine keeps running
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("render surface already released")]
    Released,
}

impl FrameError {
    /// Whether the surface must be reconfigured before the next frame
    pub fn needs_reconfigure(&self) -> bool {
        matches!(
            self,
            FrameError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_surface_needs_reconfigure() {
        assert!(FrameError::Surface(wgpu::SurfaceError::Lost).needs_reconfigure());
        assert!(FrameError::Surface(wgpu::SurfaceError::Outdated).needs_reconfigure());
        assert!(!FrameError::Surface(wgpu::SurfaceError::Timeout).needs_reconfigure());
        assert!(!FrameError::Released.needs_reconfigure());
    }

    #[test]
    fn invalid_viewport_message() {
        let err = EngineError::InvalidViewport { width: 0, height: 600 };
        assert_eq!(err.to_string(), "invalid viewport 0x600");
    }
}
