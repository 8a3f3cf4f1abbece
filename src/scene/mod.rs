mod animator;
mod camera;
mod graph;
mod input;
mod lighting;
mod materials;
pub mod primitives;

pub use animator::{
    FloatingSolid, GeometryAnimator, ImagePlane, MotionParams, ParticleCloud, SolidKind,
    PARTICLE_COUNT, SOLID_COUNT,
};
pub use camera::PerspectiveCamera;
pub use graph::{NodeKey, SceneGraph};
pub use input::{CursorPosition, InputSnapshot, ScrollProgress};
pub use lighting::{Light, LightKind, LightingRig, Orbit, Pulse, KEY_SHADOW_MAP_SIZE};
pub use materials::{
    Blending, Material, MaterialFactory, MaterialHandle, PointsMaterial, StandardMaterial,
    Texture, TextureHandle, Wrap, IMAGE_TEXTURE_SIZE, SHAPE_PALETTE, SPRITE_TEXTURE_SIZE,
};
pub use primitives::Mesh;
