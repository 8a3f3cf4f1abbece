use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use scroll_scene::core::Viewport;
use scroll_scene::render::{HeadlessSurface, RenderSurface};
use scroll_scene::scene::{FloatingSolid, LightingRig, NodeKey, PARTICLE_COUNT, SOLID_COUNT};
use scroll_scene::{EngineConfig, SceneEngine};

fn viewport() -> Viewport {
    Viewport::new(800, 600).unwrap()
}

fn engine_with(config: EngineConfig) -> SceneEngine<HeadlessSurface> {
    SceneEngine::new(HeadlessSurface::new(viewport()), config).unwrap()
}

fn engine() -> SceneEngine<HeadlessSurface> {
    engine_with(EngineConfig {
        seed: Some(2024),
        ..EngineConfig::default()
    })
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[cfg(test)]
mod engine_tests {
    use super::*;

    #[test]
    fn test_first_tick_at_rest() {
        let mut engine = engine();
        engine.set_cursor_position(400.0, 300.0, viewport());
        engine.set_scroll_progress(0.0);
        engine.tick_at(0.0).unwrap();

        let plane = engine.animator().image_plane().unwrap();
        assert_eq!(plane.transform.scale, Vec3::ONE);
        assert_eq!(plane.transform.rotation.z, 0.0);
        assert_eq!(engine.lighting().cursor().position, LightingRig::cursor_anchor());
        assert!(close(engine.lighting().ambient().intensity, 0.3));
        assert_eq!(engine.surface().frames_rendered(), 1);
    }

    #[test]
    fn test_scroll_scales_and_tilts_plane() {
        for step in 0..=10 {
            let p = step as f32 / 10.0;
            let mut engine = engine();
            engine.set_scroll_progress(p);
            engine.tick_at(1.0);

            let plane = engine.animator().image_plane().unwrap();
            assert_eq!(plane.transform.scale, Vec3::splat(1.0 + p * 0.5));
            assert!(close(plane.transform.rotation.z, p * PI * 0.1));
        }
    }

    #[test]
    fn test_scroll_out_of_range_is_clamped() {
        for (raw, clamped) in [(1.4, 1.0), (-0.3, 0.0)] {
            let mut a = engine();
            let mut b = engine();
            a.set_scroll_progress(raw);
            b.set_scroll_progress(clamped);
            a.tick_at(2.0);
            b.tick_at(2.0);

            let (pa, pb) = (a.animator().image_plane().unwrap(), b.animator().image_plane().unwrap());
            assert_eq!(pa.transform, pb.transform);
            assert_eq!(a.input().scroll.get(), clamped);
            assert_eq!(a.lighting().key().intensity, b.lighting().key().intensity);
            for (sa, sb) in a.animator().solids().iter().zip(b.animator().solids()) {
                assert_eq!(sa.transform.position, sb.transform.position);
            }
        }
    }

    #[test]
    fn test_nan_scroll_is_ignored() {
        let mut engine = engine();
        engine.set_scroll_progress(0.6);
        engine.tick_at(0.0);
        engine.set_scroll_progress(f32::NAN);
        engine.tick_at(0.1);
        assert!(close(engine.input().scroll.get(), 0.6));
    }

    #[test]
    fn test_solids_created_at_fixed_positions() {
        let engine = engine();
        let expected = [
            Vec3::new(-3.0, 2.0, -1.0),
            Vec3::new(3.0, -1.0, -2.0),
            Vec3::new(-2.0, -2.0, 1.0),
            Vec3::new(2.5, 1.5, -0.5),
            Vec3::new(-3.5, -1.0, 0.5),
            Vec3::new(3.2, 2.2, -1.5),
        ];

        let solids = engine.animator().solids();
        assert_eq!(solids.len(), SOLID_COUNT);
        for (solid, position) in solids.iter().zip(expected) {
            assert_eq!(solid.transform.position, position);
            assert_eq!(solid.motion.original_position, position);
        }
    }

    #[test]
    fn test_scroll_offset_sign_alternates() {
        let mut engine = engine();
        engine.set_scroll_progress(0.5);
        engine.tick_at(3.0);

        for (index, solid) in engine.animator().solids().iter().enumerate() {
            let offset = solid.transform.position.x - solid.motion.original_position.x;
            let expected = if index % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(offset.signum(), expected);
            assert_eq!(FloatingSolid::scroll_direction(index), expected);
            assert!(close(offset.abs(), 1.0));
        }
    }

    #[test]
    fn test_particle_count_stable_across_ticks() {
        let mut engine = engine();
        assert_eq!(engine.animator().particles().unwrap().len(), PARTICLE_COUNT);

        for frame in 0..240 {
            engine.tick_at(frame as f32 / 60.0);
        }

        let cloud = engine.animator().particles().unwrap();
        assert_eq!(cloud.len(), PARTICLE_COUNT);
        assert_eq!(cloud.colors.len(), PARTICLE_COUNT);
        assert_eq!(cloud.sizes.len(), PARTICLE_COUNT);
        assert!(close(cloud.transform.rotation.y, 240.0 * 0.001));
    }

    #[test]
    fn test_input_waits_for_next_tick() {
        let mut engine = engine();
        engine.tick_at(0.0);

        engine.set_scroll_progress(1.0);
        engine.set_cursor_position(800.0, 0.0, viewport());
        assert_eq!(engine.animator().image_plane().unwrap().transform.scale, Vec3::ONE);
        assert_eq!(engine.lighting().cursor().position, LightingRig::cursor_anchor());

        engine.tick_at(0.016);
        assert_eq!(engine.animator().image_plane().unwrap().transform.scale, Vec3::splat(1.5));
        assert_eq!(engine.lighting().cursor().position, Vec3::new(5.0, 5.0, 3.0));
        assert_eq!(engine.input().cursor.get(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_pointer_on_zero_viewport_is_ignored() {
        let mut engine = engine();
        let empty = Viewport {
            width: 0,
            height: 0,
            pixel_ratio: 1.0,
        };
        engine.set_cursor_position(10.0, 10.0, empty);
        engine.tick_at(3.0);

        assert_eq!(engine.lighting().cursor().position, LightingRig::cursor_anchor());
        assert_eq!(engine.input().cursor.get(), Vec2::ZERO);
    }

    #[test]
    fn test_resize_applies_immediately() {
        let mut engine = engine();
        engine.on_resize(1000, 500);

        assert!(close(engine.camera().aspect, 2.0));
        assert_eq!(engine.surface().viewport().width, 1000);
        assert_eq!(engine.surface().viewport().height, 500);

        engine.on_resize(0, 500);
        assert_eq!(engine.surface().viewport().width, 1000);
    }

    #[test]
    fn test_dispose_twice_is_harmless() {
        let mut engine = engine();
        engine.tick_at(0.0);

        assert!(engine.dispose());
        assert!(!engine.dispose());

        assert!(engine.is_disposed());
        assert!(engine.graph().is_empty());
        assert!(engine.materials().is_disposed());
        assert!(engine.animator().is_disposed());
        assert!(!engine.lighting().is_attached());
        assert!(engine.surface().is_released());
    }

    #[test]
    fn test_ticks_after_dispose_render_nothing() {
        let mut engine = engine();
        let handle = engine.frame_handle();
        engine.tick_at(0.0);
        engine.dispose();

        assert!(!handle.is_active());
        assert!(engine.tick_at(1.0).is_none());
        assert!(engine.tick().is_none());
        assert_eq!(engine.surface().frames_rendered(), 1);
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn test_frame_collects_every_attached_node() {
        let mut engine = engine();
        engine.tick_at(0.5);

        let stats = engine.surface().last_frame().unwrap();
        assert_eq!(stats.meshes, SOLID_COUNT + 1);
        assert_eq!(stats.points, PARTICLE_COUNT);
        assert_eq!(stats.lights, 6);
        assert!(engine.graph().contains(NodeKey::ImagePlane));
        assert!(engine.graph().contains(NodeKey::Particles));
    }

    #[test]
    fn test_same_seed_same_scene() {
        let mut a = engine();
        let mut b = engine();
        for frame in 0..10 {
            let t = frame as f32 * 0.1;
            a.tick_at(t);
            b.tick_at(t);
        }

        for (sa, sb) in a.animator().solids().iter().zip(b.animator().solids()) {
            assert_eq!(sa.motion, sb.motion);
            assert_eq!(sa.transform, sb.transform);
        }
        assert_eq!(
            a.animator().particles().unwrap().positions,
            b.animator().particles().unwrap().positions
        );
    }

    #[test]
    fn test_scroll_dolly_moves_camera() {
        let mut engine = engine_with(EngineConfig {
            seed: Some(1),
            scroll_dolly: true,
            ..EngineConfig::default()
        });
        engine.set_scroll_progress(0.25);
        engine.tick_at(0.0);
        assert!(close(engine.camera().position.z, 4.5));
    }

    #[test]
    fn test_camera_stays_without_dolly() {
        let mut engine = engine();
        engine.set_scroll_progress(1.0);
        engine.tick_at(0.0);
        assert_eq!(engine.camera().position.z, 5.0);
    }
}
