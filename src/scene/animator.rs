use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use super::graph::{NodeKey, SceneGraph};
use super::input::ScrollProgress;
use super::materials::{MaterialFactory, MaterialHandle};
use super::primitives::{self, Mesh};
use crate::math::{Color, Transform};

pub const SOLID_COUNT: usize = 6;
pub const PARTICLE_COUNT: usize = 100;

const WAVE_AMPLITUDE: f32 = 0.02;
const PARTICLE_SPIN: f32 = 0.001;
const PARTICLE_DRIFT: f32 = 0.001;
const SCROLL_SHIFT: f32 = 2.0;
const DOLLY_TRAVEL: f32 = 2.0;

/// Which primitive a floating solid was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidKind {
    Icosahedron,
    Octahedron,
    Tetrahedron,
    Dodecahedron,
    Torus,
    Cone,
}

impl SolidKind {
    /// Kind and resting position of each floating solid, in creation order
    pub const LAYOUT: [(SolidKind, Vec3); SOLID_COUNT] = [
        (SolidKind::Icosahedron, Vec3::new(-3.0, 2.0, -1.0)),
        (SolidKind::Octahedron, Vec3::new(3.0, -1.0, -2.0)),
        (SolidKind::Tetrahedron, Vec3::new(-2.0, -2.0, 1.0)),
        (SolidKind::Dodecahedron, Vec3::new(2.5, 1.5, -0.5)),
        (SolidKind::Torus, Vec3::new(-3.5, -1.0, 0.5)),
        (SolidKind::Cone, Vec3::new(3.2, 2.2, -1.5)),
    ];

    fn build(self) -> Mesh {
        match self {
            SolidKind::Icosahedron => primitives::icosahedron(0.3),
            SolidKind::Octahedron => primitives::octahedron(0.4),
            SolidKind::Tetrahedron => primitives::tetrahedron(0.35),
            SolidKind::Dodecahedron => primitives::dodecahedron(0.25),
            SolidKind::Torus => primitives::torus(0.3, 0.1, 8, 16),
            SolidKind::Cone => primitives::cone(0.2, 0.6, 8),
        }
    }
}

/// Per-solid motion, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub original_position: Vec3,
    /// Radians added to rotation.x each tick
    pub rotation_speed: f32,
    pub float_speed: f32,
    pub float_amplitude: f32,
}

impl MotionParams {
    fn random<R: Rng + ?Sized>(original_position: Vec3, rng: &mut R) -> Self {
        Self {
            original_position,
            rotation_speed: 0.01 + rng.random::<f32>() * 0.02,
            float_speed: 0.5 + rng.random::<f32>() * 0.5,
            float_amplitude: 0.1 + rng.random::<f32>() * 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImagePlane {
    pub mesh: Mesh,
    pub transform: Transform,
    pub material: MaterialHandle,
    base_positions: Vec<Vec3>,
}

impl ImagePlane {
    fn new(material: MaterialHandle) -> Self {
        let mesh = primitives::plane(3.0, 2.0, 32, 32);
        let base_positions = mesh.positions.iter().map(|&p| Vec3::from_array(p)).collect();
        Self {
            mesh,
            transform: Transform::default(),
            material,
            base_positions,
        }
    }

    /// Vertex positions captured at creation
    pub fn base_positions(&self) -> &[Vec3] {
        &self.base_positions
    }

    fn update(&mut self, time: f32) {
        for (vertex, base) in self.mesh.positions.iter_mut().zip(&self.base_positions) {
            let wave = (base.x * 2.0 + time * 0.5).sin() * (base.y * 2.0 + time * 0.3).sin();
            vertex[2] = base.z + wave * WAVE_AMPLITUDE;
        }
        self.mesh.mark_dirty();

        self.transform.rotation.y = (time * 0.2).sin() * 0.1;
        self.transform.rotation.x = (time * 0.3).cos() * 0.05;
    }
}

#[derive(Debug, Clone)]
pub struct FloatingSolid {
    pub kind: SolidKind,
    pub mesh: Mesh,
    pub transform: Transform,
    pub material: MaterialHandle,
    pub motion: MotionParams,
}

impl FloatingSolid {
    /// Even solids drift right as the page scrolls, odd ones left
    pub fn scroll_direction(index: usize) -> f32 {
        if index % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    fn update(&mut self, index: usize, time: f32, scroll: f32) {
        let speed = self.motion.rotation_speed;
        self.transform.rotation += Vec3::new(speed, speed * 0.7, speed * 0.5);

        let origin = self.motion.original_position;
        let float = (time * self.motion.float_speed + index as f32).sin() * self.motion.float_amplitude;
        self.transform.position.y = origin.y + float;
        self.transform.position.x = origin.x + scroll * SCROLL_SHIFT * Self::scroll_direction(index);
    }
}

/// Additive point sprites scattered around the scene
#[derive(Debug, Clone)]
pub struct ParticleCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub sizes: Vec<f32>,
    pub transform: Transform,
    pub material: MaterialHandle,
    revision: u64,
}

impl ParticleCloud {
    fn random<R: Rng + ?Sized>(material: MaterialHandle, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(PARTICLE_COUNT);
        let mut colors = Vec::with_capacity(PARTICLE_COUNT);
        let mut sizes = Vec::with_capacity(PARTICLE_COUNT);

        for _ in 0..PARTICLE_COUNT {
            positions.push(Vec3::new(
                (rng.random::<f32>() - 0.5) * 20.0,
                (rng.random::<f32>() - 0.5) * 20.0,
                (rng.random::<f32>() - 0.5) * 10.0,
            ));

            let hue = 0.1 + rng.random::<f32>() * 0.2;
            let lightness = 0.5 + rng.random::<f32>() * 0.5;
            colors.push(Color::from_hsl(hue, 0.8, lightness));

            sizes.push(rng.random::<f32>() * 3.0 + 1.0);
        }

        Self {
            positions,
            colors,
            sizes,
            transform: Transform::default(),
            material,
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn update(&mut self, time: f32) {
        self.transform.rotation.y += PARTICLE_SPIN;
        for position in &mut self.positions {
            position.y += (time + position.x).sin() * PARTICLE_DRIFT;
        }
        self.revision += 1;
    }
}

#[derive(Debug)]
struct Parts {
    plane: ImagePlane,
    solids: Vec<FloatingSolid>,
    particles: ParticleCloud,
}

/// Owns the image plane, floating solids and particle cloud
///
/// Materials are referenced by handle and stay owned by the
/// [`MaterialFactory`].
#[derive(Debug)]
pub struct GeometryAnimator {
    parts: Option<Parts>,
    scroll: ScrollProgress,
    dolly_origin: Option<f32>,
}

impl GeometryAnimator {
    pub fn new<R: Rng + ?Sized>(
        factory: &MaterialFactory,
        graph: &mut SceneGraph,
        rng: &mut R,
    ) -> Self {
        let plane = ImagePlane::new(factory.image_material());
        graph.add(NodeKey::ImagePlane);

        let solids = SolidKind::LAYOUT
            .iter()
            .enumerate()
            .map(|(index, &(kind, position))| {
                graph.add(NodeKey::Solid(index));
                FloatingSolid {
                    kind,
                    mesh: kind.build(),
                    transform: Transform::at(position),
                    material: factory.shape_material(index),
                    motion: MotionParams::random(position, rng),
                }
            })
            .collect::<Vec<_>>();

        let particles = ParticleCloud::random(factory.particle_material(), rng);
        graph.add(NodeKey::Particles);

        log::debug!(
            "Built image plane ({} vertices), {} solids, {} particles",
            plane.mesh.vertex_count(),
            solids.len(),
            particles.len()
        );

        Self {
            parts: Some(Parts {
                plane,
                solids,
                particles,
            }),
            scroll: ScrollProgress::default(),
            dolly_origin: None,
        }
    }

    /// Let scroll progress pull a camera in from `origin_z`
    pub fn enable_camera_dolly(&mut self, origin_z: f32) {
        self.dolly_origin = Some(origin_z);
    }

    /// Advance every object to `time` seconds
    pub fn update(&mut self, time: f32) {
        let scroll = self.scroll.get();
        let Some(parts) = self.parts.as_mut() else {
            return;
        };

        parts.plane.update(time);
        for (index, solid) in parts.solids.iter_mut().enumerate() {
            solid.update(index, time, scroll);
        }
        parts.particles.update(time);
    }

    pub fn update_scroll_progress(&mut self, progress: f32) {
        if progress.is_nan() {
            log::debug!("Ignoring NaN scroll progress");
            return;
        }
        self.scroll = ScrollProgress::clamped(progress);
        let p = self.scroll.get();

        if let Some(parts) = self.parts.as_mut() {
            parts.plane.transform.set_uniform_scale(1.0 + p * 0.5);
            parts.plane.transform.rotation.z = p * PI * 0.1;
        }
    }

    pub fn scroll_progress(&self) -> f32 {
        self.scroll.get()
    }

    /// Camera z requested by the scroll dolly, if one is enabled
    pub fn camera_z(&self) -> Option<f32> {
        self.dolly_origin
            .map(|origin| origin - self.scroll.get() * DOLLY_TRAVEL)
    }

    pub fn image_plane(&self) -> Option<&ImagePlane> {
        self.parts.as_ref().map(|parts| &parts.plane)
    }

    pub fn solids(&self) -> &[FloatingSolid] {
        self.parts
            .as_ref()
            .map(|parts| parts.solids.as_slice())
            .unwrap_or_default()
    }

    pub fn particles(&self) -> Option<&ParticleCloud> {
        self.parts.as_ref().map(|parts| &parts.particles)
    }

    pub fn is_disposed(&self) -> bool {
        self.parts.is_none()
    }

    /// Detach and drop all geometry, then release materials
    ///
    /// Returns false if already disposed.
    pub fn dispose(&mut self, graph: &mut SceneGraph, factory: &mut MaterialFactory) -> bool {
        let Some(parts) = self.parts.take() else {
            return false;
        };

        graph.remove(NodeKey::ImagePlane);
        for index in 0..parts.solids.len() {
            graph.remove(NodeKey::Solid(index));
        }
        graph.remove(NodeKey::Particles);

        factory.dispose();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(seed: u64) -> (MaterialFactory, SceneGraph, GeometryAnimator) {
        let mut rng = StdRng::seed_from_u64(seed);
        let factory = MaterialFactory::new(&mut rng);
        let mut graph = SceneGraph::new();
        let animator = GeometryAnimator::new(&factory, &mut graph, &mut rng);
        (factory, graph, animator)
    }

    #[test]
    fn motion_params_within_ranges() {
        let (_, _, animator) = build(3);
        for solid in animator.solids() {
            let m = solid.motion;
            assert!((0.01..0.03).contains(&m.rotation_speed));
            assert!((0.5..1.0).contains(&m.float_speed));
            assert!((0.1..0.3).contains(&m.float_amplitude));
        }
    }

    #[test]
    fn wave_keeps_plane_near_baseline() {
        let (_, _, mut animator) = build(4);
        animator.update(12.5);

        let plane = animator.image_plane().unwrap();
        for (vertex, base) in plane.mesh.positions.iter().zip(plane.base_positions()) {
            assert_eq!(vertex[0], base.x);
            assert_eq!(vertex[1], base.y);
            assert!((vertex[2] - base.z).abs() <= WAVE_AMPLITUDE + 1e-6);
        }
    }

    fn near(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn plane_wave_matches_closed_form() {
        let (_, _, mut animator) = build(11);
        for t in [1.0f32, 2.0] {
            animator.update(t);
            let plane = animator.image_plane().unwrap();
            for (vertex, base) in plane.mesh.positions.iter().zip(plane.base_positions()) {
                let wave = (base.x * 2.0 + t * 0.5).sin() * (base.y * 2.0 + t * 0.3).sin();
                assert!(near(vertex[2], base.z + wave * 0.02));
            }
        }
    }

    #[test]
    fn plane_sway_matches_closed_form() {
        let (_, _, mut animator) = build(12);
        for t in [1.0f32, 2.0, 7.5] {
            animator.update(t);
            let rotation = animator.image_plane().unwrap().transform.rotation;
            assert!(near(rotation.y, (t * 0.2).sin() * 0.1));
            assert!(near(rotation.x, (t * 0.3).cos() * 0.05));
        }
    }

    #[test]
    fn solid_float_matches_closed_form() {
        let (_, _, mut animator) = build(13);
        for t in [1.0f32, 2.0] {
            animator.update(t);
            for (index, solid) in animator.solids().iter().enumerate() {
                let m = solid.motion;
                let expected = m.original_position.y
                    + (t * m.float_speed + index as f32).sin() * m.float_amplitude;
                assert!(near(solid.transform.position.y, expected));
                assert_eq!(solid.transform.position.x, m.original_position.x);
            }
        }
    }

    #[test]
    fn particle_drift_accumulates_over_ticks() {
        let (_, _, mut animator) = build(14);
        let start = animator.particles().unwrap().positions.clone();

        animator.update(1.0);
        animator.update(2.0);

        let cloud = animator.particles().unwrap();
        for (position, origin) in cloud.positions.iter().zip(&start) {
            let expected = origin.y + (1.0 + origin.x).sin() * 0.001 + (2.0 + origin.x).sin() * 0.001;
            assert!(near(position.y, expected));
            assert_eq!(position.x, origin.x);
            assert_eq!(position.z, origin.z);
        }
        assert!(near(cloud.transform.rotation.y, 0.002));
        assert_eq!(cloud.revision(), 2);
    }

    #[test]
    fn rotation_accumulates_per_tick() {
        let (_, _, mut animator) = build(5);
        animator.update(0.0);
        animator.update(0.0);

        let solid = &animator.solids()[0];
        let s = solid.motion.rotation_speed;
        assert!((solid.transform.rotation - Vec3::new(2.0 * s, 1.4 * s, s)).length() < 1e-6);
    }

    #[test]
    fn dolly_follows_scroll() {
        let (_, _, mut animator) = build(6);
        assert_eq!(animator.camera_z(), None);

        animator.enable_camera_dolly(5.0);
        animator.update_scroll_progress(0.5);
        assert_eq!(animator.camera_z(), Some(4.0));
    }

    #[test]
    fn dispose_detaches_everything_once() {
        let (mut factory, mut graph, mut animator) = build(7);
        assert_eq!(graph.len(), SOLID_COUNT + 2);

        assert!(animator.dispose(&mut graph, &mut factory));
        assert!(!animator.dispose(&mut graph, &mut factory));
        assert!(graph.is_empty());
        assert!(factory.is_disposed());
        assert!(animator.solids().is_empty());

        animator.update(1.0);
        assert!(animator.image_plane().is_none());
    }
}
