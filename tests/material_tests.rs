use rand::rngs::StdRng;
use rand::SeedableRng;
use scroll_scene::math::Color;
use scroll_scene::scene::{
    Blending, Material, MaterialFactory, Wrap, SHAPE_PALETTE, SPRITE_TEXTURE_SIZE,
};

fn factory(seed: u64) -> MaterialFactory {
    MaterialFactory::new(&mut StdRng::seed_from_u64(seed))
}

#[cfg(test)]
mod material_tests {
    use super::*;

    #[test]
    fn test_shape_palette_and_emissive() {
        let factory = factory(1);
        for (index, hex) in SHAPE_PALETTE.iter().enumerate() {
            let material = factory
                .material(factory.shape_material(index))
                .and_then(Material::as_standard)
                .unwrap();
            let base = Color::from_hex(*hex);

            assert_eq!(material.color, base);
            assert_eq!(material.emissive, base.scale(0.1));
            assert_eq!(material.opacity, 0.8);
            assert_eq!(material.roughness, 0.2);
            assert_eq!(material.metalness, 0.8);
            assert!(material.transparent);
            assert!(material.map.is_none());
        }
    }

    #[test]
    fn test_shape_material_cycles_every_six() {
        let factory = factory(2);
        for i in 0..60 {
            assert_eq!(factory.shape_material(i), factory.shape_material(i + 6));
        }
    }

    #[test]
    fn test_image_material_properties() {
        let factory = factory(3);
        let material = factory
            .material(factory.image_material())
            .and_then(Material::as_standard)
            .unwrap();

        assert_eq!(material.opacity, 0.9);
        assert_eq!(material.roughness, 0.3);
        assert_eq!(material.metalness, 0.7);
        assert_eq!(material.emissive, Color::from_hex(0x111111));
        assert!(material.map.is_some());
    }

    #[test]
    fn test_particle_sprite_fades_out() {
        let factory = factory(4);
        let material = factory
            .material(factory.particle_material())
            .and_then(Material::as_points)
            .unwrap();

        assert_eq!(material.blending, Blending::Additive);
        assert_eq!(material.opacity, 0.6);
        assert_eq!(material.size, 2.0);
        assert!(material.vertex_colors && material.size_attenuation && material.transparent);

        let sprite = factory.texture(material.map.unwrap()).unwrap();
        assert_eq!((sprite.width, sprite.height), (SPRITE_TEXTURE_SIZE, SPRITE_TEXTURE_SIZE));
        assert_eq!(sprite.wrap, Wrap::Clamp);

        let centre = sprite.pixel(16, 16).unwrap();
        assert_eq!(&centre[..3], &[255, 255, 255]);
        assert!(centre[3] > 230);

        for [x, y] in [[0, 0], [31, 0], [0, 31], [31, 31]] {
            assert_eq!(sprite.pixel(x, y).unwrap()[3], 0);
        }
    }

    #[test]
    fn test_same_seed_same_image_texture() {
        let (a, b, c) = (factory(77), factory(77), factory(78));
        let texture = |f: &MaterialFactory| {
            let map = f.material(f.image_material()).and_then(Material::map).unwrap();
            f.texture(map).unwrap().pixels.clone()
        };

        assert_eq!(texture(&a), texture(&b));
        assert_ne!(texture(&a), texture(&c));
    }

    #[test]
    fn test_dispose_releases_everything_once() {
        let mut factory = factory(5);
        let image = factory.image_material();
        let map = factory.material(image).and_then(Material::map).unwrap();

        assert_eq!(factory.live_textures(), 2);
        assert_eq!(factory.live_materials(), 8);
        assert_eq!(factory.dispose(), 10);
        assert_eq!(factory.dispose(), 0);

        assert!(factory.material(image).is_none());
        assert!(factory.texture(map).is_none());
        assert_eq!(factory.live_textures(), 0);
    }
}
