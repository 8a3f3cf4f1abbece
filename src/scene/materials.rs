use rand::Rng;

use crate::core::{Arena, Canvas, ColorStop, DrawOp, Handle};
use crate::math::Color;

pub const IMAGE_TEXTURE_SIZE: u32 = 512;
pub const IMAGE_CIRCLE_COUNT: usize = 10;
pub const SPRITE_TEXTURE_SIZE: u32 = 32;

/// Red, orange, green, blue, purple, pink
pub const SHAPE_PALETTE: [u32; 6] = [0xe94560, 0xf27121, 0x00ff88, 0x0088ff, 0x8844ff, 0xff4488];

pub type TextureHandle = Handle<Texture>;
pub type MaterialHandle = Handle<Material>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Clamp,
    Repeat,
}

/// CPU-side RGBA8 texture, straight alpha
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub wrap: Wrap,
}

impl Texture {
    fn from_canvas(canvas: Canvas, wrap: Wrap) -> Self {
        let (width, height) = canvas.dimensions();
        Self {
            width,
            height,
            pixels: canvas.into_pixels(),
            wrap,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

/// Metallic-roughness surface material
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub map: Option<TextureHandle>,
    pub transparent: bool,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Color,
}

/// Point-sprite material
#[derive(Debug, Clone, PartialEq)]
pub struct PointsMaterial {
    pub map: Option<TextureHandle>,
    pub vertex_colors: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub size: f32,
    pub size_attenuation: bool,
    pub blending: Blending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Points(PointsMaterial),
}

impl Material {
    pub fn map(&self) -> Option<TextureHandle> {
        match self {
            Material::Standard(m) => m.map,
            Material::Points(m) => m.map,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            Material::Standard(m) => m.opacity,
            Material::Points(m) => m.opacity,
        }
    }

    pub fn is_transparent(&self) -> bool {
        match self {
            Material::Standard(m) => m.transparent,
            Material::Points(m) => m.transparent,
        }
    }

    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            Material::Points(_) => None,
        }
    }

    pub fn as_points(&self) -> Option<&PointsMaterial> {
        match self {
            Material::Points(m) => Some(m),
            Material::Standard(_) => None,
        }
    }
}

/// Builds and owns every procedural texture and material in the scene
///
/// Other components hold [`MaterialHandle`]s only. After [`dispose`] all
/// lookups return `None`.
///
/// [`dispose`]: MaterialFactory::dispose
#[derive(Debug)]
pub struct MaterialFactory {
    textures: Arena<Texture>,
    materials: Arena<Material>,
    image: MaterialHandle,
    shapes: [MaterialHandle; 6],
    particles: MaterialHandle,
}

impl MaterialFactory {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut textures = Arena::new();
        let mut materials = Arena::new();

        let image = Self::create_image_material(&mut textures, &mut materials, rng);
        let shapes = SHAPE_PALETTE.map(|hex| Self::create_shape_material(&mut materials, hex));
        let particles = Self::create_particle_material(&mut textures, &mut materials);

        log::debug!(
            "Created {} textures and {} materials",
            textures.live(),
            materials.live()
        );

        Self {
            textures,
            materials,
            image,
            shapes,
            particles,
        }
    }

    fn create_image_material<R: Rng + ?Sized>(
        textures: &mut Arena<Texture>,
        materials: &mut Arena<Material>,
        rng: &mut R,
    ) -> MaterialHandle {
        let size = IMAGE_TEXTURE_SIZE as f32;
        let mut canvas = Canvas::new(IMAGE_TEXTURE_SIZE, IMAGE_TEXTURE_SIZE).draw(DrawOp::LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: size,
            y1: size,
            stops: vec![
                ColorStop::hex(0.0, 0xe94560),
                ColorStop::hex(0.5, 0xf27121),
                ColorStop::hex(1.0, 0x00ff88),
            ],
        });

        for _ in 0..IMAGE_CIRCLE_COUNT {
            canvas = canvas.draw(DrawOp::StrokeCircle {
                cx: rng.random_range(0.0..size),
                cy: rng.random_range(0.0..size),
                radius: rng.random_range(20.0..70.0),
                line_width: 2.0,
                rgba: [1.0, 1.0, 1.0, 0.3],
            });
        }

        let texture = textures.insert(Texture::from_canvas(canvas.execute_ops(), Wrap::Repeat));

        materials.insert(Material::Standard(StandardMaterial {
            color: Color::WHITE,
            map: Some(texture),
            transparent: true,
            opacity: 0.9,
            roughness: 0.3,
            metalness: 0.7,
            emissive: Color::from_hex(0x111111),
        }))
    }

    fn create_shape_material(materials: &mut Arena<Material>, hex: u32) -> MaterialHandle {
        let color = Color::from_hex(hex);
        materials.insert(Material::Standard(StandardMaterial {
            color,
            map: None,
            transparent: true,
            opacity: 0.8,
            roughness: 0.2,
            metalness: 0.8,
            emissive: color.scale(0.1),
        }))
    }

    fn create_particle_material(
        textures: &mut Arena<Texture>,
        materials: &mut Arena<Material>,
    ) -> MaterialHandle {
        let half = SPRITE_TEXTURE_SIZE as f32 * 0.5;
        let canvas = Canvas::new(SPRITE_TEXTURE_SIZE, SPRITE_TEXTURE_SIZE)
            .draw(DrawOp::RadialGradient {
                cx: half,
                cy: half,
                r0: 0.0,
                r1: half,
                stops: vec![
                    ColorStop::new(0.0, [1.0, 1.0, 1.0, 1.0]),
                    ColorStop::new(0.5, [1.0, 1.0, 1.0, 0.5]),
                    ColorStop::new(1.0, [1.0, 1.0, 1.0, 0.0]),
                ],
            })
            .execute_ops();

        let texture = textures.insert(Texture::from_canvas(canvas, Wrap::Clamp));

        materials.insert(Material::Points(PointsMaterial {
            map: Some(texture),
            vertex_colors: true,
            transparent: true,
            opacity: 0.6,
            size: 2.0,
            size_attenuation: true,
            blending: Blending::Additive,
        }))
    }

    pub fn image_material(&self) -> MaterialHandle {
        self.image
    }

    /// Palette material for `index`, cycling every six
    pub fn shape_material(&self, index: usize) -> MaterialHandle {
        self.shapes[index % self.shapes.len()]
    }

    pub fn particle_material(&self) -> MaterialHandle {
        self.particles
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    pub fn live_materials(&self) -> usize {
        self.materials.live()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.live()
    }

    pub fn is_disposed(&self) -> bool {
        self.live_materials() == 0 && self.live_textures() == 0
    }

    /// Release every texture and material exactly once
    ///
    /// Returns the number of resources released by this call; repeated calls
    /// release nothing and return 0.
    pub fn dispose(&mut self) -> usize {
        let textures = self.textures.release_all();
        let materials = self.materials.release_all();

        if textures + materials > 0 {
            log::debug!("Released {} textures and {} materials", textures, materials);
        }

        textures + materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factory() -> MaterialFactory {
        MaterialFactory::new(&mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn creates_expected_resource_counts() {
        let factory = factory();
        assert_eq!(factory.live_textures(), 2);
        assert_eq!(factory.live_materials(), 8);
    }

    #[test]
    fn shape_materials_cycle_every_six() {
        let factory = factory();
        for i in 0..18 {
            assert_eq!(factory.shape_material(i), factory.shape_material(i + 6));
        }
        assert_ne!(factory.shape_material(0), factory.shape_material(1));
    }

    #[test]
    fn image_texture_has_gradient_corners() {
        let factory = factory();
        let map = factory.material(factory.image_material()).and_then(Material::map).unwrap();
        let texture = factory.texture(map).unwrap();

        assert_eq!((texture.width, texture.height), (512, 512));
        assert_eq!(texture.wrap, Wrap::Repeat);
        assert_eq!(texture.pixels.len(), 512 * 512 * 4);
        for [x, y] in [[0, 0], [511, 511], [256, 256]] {
            assert_eq!(texture.pixel(x, y).unwrap()[3], 255);
        }
    }

    #[test]
    fn dispose_releases_once() {
        let mut factory = factory();
        let handle = factory.shape_material(2);

        assert_eq!(factory.dispose(), 10);
        assert_eq!(factory.dispose(), 0);
        assert!(factory.is_disposed());
        assert!(factory.material(handle).is_none());
    }
}
