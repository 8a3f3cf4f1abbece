// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::EngineConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "scroll-scene")]
#[command(about = "Scroll- and pointer-reactive procedural 3D scene", long_about = None)]
pub struct Cli {
    /// JSON file with engine settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for procedural textures and motion
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render off-screen for a fixed number of frames, then exit
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 120)]
    pub frames: u64,

    /// Initial width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Pull the camera in as the page scrolls
    #[arg(long, default_value = "false")]
    pub dolly: bool,
}

impl Cli {
    /// Overlay command-line overrides onto a loaded configuration
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.dolly {
            config.scroll_dolly = true;
        }
        config
    }
}
