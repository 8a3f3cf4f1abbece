pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod math;
pub mod render;
pub mod scene;

pub use config::EngineConfig;
pub use engine::SceneEngine;
pub use error::{EngineError, FrameError};
