pub mod arena;
pub mod canvas;
pub mod clock;
pub mod frame_loop;
pub mod gpu_context;
pub mod input_adapter;
pub mod viewport;

pub use arena::{Arena, Handle};
pub use canvas::{Canvas, ColorStop, DrawOp};
pub use clock::Clock;
pub use frame_loop::{FrameHandle, FrameInfo, FrameLoop};
pub use gpu_context::GpuContext;
pub use input_adapter::{HostAction, WinitInput};
pub use viewport::Viewport;
