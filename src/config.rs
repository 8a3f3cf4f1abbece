use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine and renderer settings
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the origin along +Z
    pub camera_distance: f32,
    /// Upper bound for the device pixel ratio
    pub max_pixel_ratio: f32,
    /// Exposure for ACES filmic tone mapping
    pub exposure: f32,
    /// MSAA sample count (1 disables anti-aliasing)
    pub msaa_samples: u32,
    /// Clear to transparent instead of opaque black
    pub transparent: bool,
    /// Move the camera towards the scene as scroll progress increases
    pub scroll_dolly: bool,
    /// Seed for procedural content; `None` draws a seed from the OS
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 5.0,
            max_pixel_ratio: 2.0,
            exposure: 1.2,
            msaa_samples: 4,
            transparent: true,
            scroll_dolly: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
