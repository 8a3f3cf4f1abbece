mod color;
mod transform;
mod wave;

pub use color::{hsl_to_rgb, Color};
pub use transform::Transform;
pub use wave::Wave;
