use glam::{Vec2, Vec3};

use super::graph::{NodeKey, SceneGraph};
use super::input::{CursorPosition, ScrollProgress};
use crate::math::{Color, Wave};

pub const KEY_SHADOW_MAP_SIZE: u32 = 2048;

const AMBIENT: usize = 0;
const KEY: usize = 1;
const CURSOR: usize = 2;
const ACCENT_A: usize = 3;
const ACCENT_B: usize = 4;
const RIM: usize = 5;

const CURSOR_ANCHOR: Vec3 = Vec3::new(0.0, 0.0, 3.0);
const KEY_ANCHOR: Vec3 = Vec3::new(5.0, 5.0, 5.0);
const CURSOR_REACH: f32 = 5.0;
const KEY_REACH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Parallel light shining from `position` toward the origin
    Directional,
    /// Omni light whose influence fades to zero at `range`
    Point { range: f32 },
}

/// Moves a light around a centre on two independent sinusoids
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub center: Vec2,
    pub x: Wave,
    pub y: Wave,
}

impl Orbit {
    pub fn sample(&self, time: f32) -> Vec2 {
        self.center + Vec2::new(self.x.sample(time), self.y.sample(time))
    }
}

/// Intensity oscillating around a base value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub base: f32,
    pub wave: Wave,
}

impl Pulse {
    pub fn sample(&self, time: f32) -> f32 {
        self.base + self.wave.sample(time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    /// Shadow map edge length, for lights that cast shadows
    pub shadow_map_size: Option<u32>,
    pub orbit: Option<Orbit>,
    pub pulse: Option<Pulse>,
}

impl Light {
    fn new(kind: LightKind, hex: u32, intensity: f32, position: Vec3) -> Self {
        Self {
            kind,
            color: Color::from_hex(hex),
            intensity,
            position,
            shadow_map_size: None,
            orbit: None,
            pulse: None,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow_map_size.is_some()
    }

    fn animate(&mut self, time: f32) {
        if let Some(orbit) = &self.orbit {
            let xy = orbit.sample(time);
            self.position.x = xy.x;
            self.position.y = xy.y;
        }
        if let Some(pulse) = &self.pulse {
            self.intensity = pulse.sample(time);
        }
    }
}

/// The six scene lights and their per-tick animation
#[derive(Debug)]
pub struct LightingRig {
    lights: Vec<Light>,
    attached: bool,
}

impl LightingRig {
    pub fn new(graph: &mut SceneGraph) -> Self {
        let ambient = Light::new(LightKind::Ambient, 0x404040, 0.3, Vec3::ZERO);

        let key = Light {
            shadow_map_size: Some(KEY_SHADOW_MAP_SIZE),
            ..Light::new(LightKind::Directional, 0xffffff, 0.8, KEY_ANCHOR)
        };

        let cursor = Light {
            pulse: Some(Pulse {
                base: 1.5,
                wave: Wave::sine(0.5, 2.0),
            }),
            ..Light::new(LightKind::Point { range: 10.0 }, 0xe94560, 2.0, CURSOR_ANCHOR)
        };

        let accent_a = Light {
            orbit: Some(Orbit {
                center: Vec2::new(0.0, 1.0),
                x: Wave::sine(3.0, 0.5),
                y: Wave::cosine(2.0, 0.7),
            }),
            pulse: Some(Pulse {
                base: 0.3,
                wave: Wave::sine(0.2, 1.5),
            }),
            ..Light::new(LightKind::Point { range: 8.0 }, 0x00ff88, 0.5, Vec3::new(-3.0, 2.0, 1.0))
        };

        let accent_b = Light {
            orbit: Some(Orbit {
                center: Vec2::new(0.0, -1.0),
                x: Wave::cosine(3.0, 0.6),
                y: Wave::sine(2.0, 0.8),
            }),
            pulse: Some(Pulse {
                base: 0.3,
                wave: Wave::cosine(0.2, 1.8),
            }),
            ..Light::new(LightKind::Point { range: 8.0 }, 0x0088ff, 0.5, Vec3::new(3.0, -2.0, 1.0))
        };

        let rim = Light::new(LightKind::Directional, 0xe94560, 0.3, Vec3::new(-5.0, 0.0, -5.0));

        let lights = vec![ambient, key, cursor, accent_a, accent_b, rim];
        for index in 0..lights.len() {
            graph.add(NodeKey::Light(index));
        }
        log::debug!("Attached {} lights", lights.len());

        Self {
            lights,
            attached: true,
        }
    }

    /// Orbit the accents and pulse the point lights
    pub fn update(&mut self, time: f32) {
        if !self.attached {
            return;
        }
        for light in &mut self.lights {
            light.animate(time);
        }
    }

    /// Follow the pointer with the cursor light and nudge the key light
    pub fn update_cursor_position(&mut self, cursor: Vec2) {
        if !self.attached {
            return;
        }
        if !cursor.is_finite() {
            log::debug!("Ignoring non-finite cursor {:?}", cursor);
            return;
        }
        let cursor = CursorPosition::new(cursor).get();

        let light = &mut self.lights[CURSOR];
        light.position.x = CURSOR_ANCHOR.x + cursor.x * CURSOR_REACH;
        light.position.y = CURSOR_ANCHOR.y + cursor.y * CURSOR_REACH;

        let light = &mut self.lights[KEY];
        light.position.x = KEY_ANCHOR.x + cursor.x * KEY_REACH;
        light.position.y = KEY_ANCHOR.y + cursor.y * KEY_REACH;
    }

    /// Brighten the ambient, dim the key and shift the cursor hue
    pub fn update_scroll_progress(&mut self, progress: f32) {
        if !self.attached || progress.is_nan() {
            return;
        }
        let p = ScrollProgress::clamped(progress).get();

        self.lights[AMBIENT].intensity = 0.3 + p * 0.2;
        self.lights[KEY].intensity = 0.8 - p * 0.3;
        self.lights[CURSOR].color = Color::from_hsl(p * 0.3, 0.8, 0.5);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn ambient(&self) -> &Light {
        &self.lights[AMBIENT]
    }

    pub fn key(&self) -> &Light {
        &self.lights[KEY]
    }

    pub fn cursor(&self) -> &Light {
        &self.lights[CURSOR]
    }

    pub fn accent_a(&self) -> &Light {
        &self.lights[ACCENT_A]
    }

    pub fn accent_b(&self) -> &Light {
        &self.lights[ACCENT_B]
    }

    pub fn rim(&self) -> &Light {
        &self.lights[RIM]
    }

    /// Where the cursor light sits when the pointer is centred
    pub fn cursor_anchor() -> Vec3 {
        CURSOR_ANCHOR
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Detach every light from the scene. Returns false if already detached.
    pub fn dispose(&mut self, graph: &mut SceneGraph) -> bool {
        if !self.attached {
            return false;
        }
        for index in 0..self.lights.len() {
            graph.remove(NodeKey::Light(index));
        }
        self.attached = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (SceneGraph, LightingRig) {
        let mut graph = SceneGraph::new();
        let rig = LightingRig::new(&mut graph);
        (graph, rig)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn six_lights_attached() {
        let (graph, rig) = rig();
        assert_eq!(rig.lights().len(), 6);
        assert_eq!(graph.lights().count(), 6);
        assert!(rig.key().casts_shadow());
        assert!(!rig.rim().casts_shadow());
    }

    #[test]
    fn accents_orbit() {
        let (_, mut rig) = rig();
        let t = 1.7;
        rig.update(t);

        let a = rig.accent_a().position;
        assert!(close(a.x, (0.5 * t).sin() * 3.0));
        assert!(close(a.y, (0.7 * t).cos() * 2.0 + 1.0));
        assert_eq!(a.z, 1.0);

        let b = rig.accent_b().position;
        assert!(close(b.x, (0.6 * t).cos() * 3.0));
        assert!(close(b.y, (0.8 * t).sin() * 2.0 - 1.0));
    }

    #[test]
    fn intensities_pulse() {
        let (_, mut rig) = rig();
        let t = 0.4;
        rig.update(t);

        assert!(close(rig.cursor().intensity, 1.5 + (2.0 * t).sin() * 0.5));
        assert!(close(rig.accent_a().intensity, 0.3 + (1.5 * t).sin() * 0.2));
        assert!(close(rig.accent_b().intensity, 0.3 + (1.8 * t).cos() * 0.2));
        assert_eq!(rig.ambient().intensity, 0.3);
    }

    #[test]
    fn cursor_moves_cursor_and_key() {
        let (_, mut rig) = rig();
        rig.update_cursor_position(Vec2::new(0.5, -1.0));

        assert_eq!(rig.cursor().position, Vec3::new(2.5, -5.0, 3.0));
        assert_eq!(rig.key().position, Vec3::new(6.0, 3.0, 5.0));

        rig.update_cursor_position(Vec2::new(f32::NAN, 0.0));
        assert_eq!(rig.cursor().position, Vec3::new(2.5, -5.0, 3.0));
    }

    #[test]
    fn scroll_shifts_light_balance() {
        let (_, mut rig) = rig();
        rig.update_scroll_progress(1.0);

        assert!(close(rig.ambient().intensity, 0.5));
        assert!(close(rig.key().intensity, 0.5));
        assert_eq!(rig.cursor().color, Color::from_hsl(0.3, 0.8, 0.5));

        rig.update_scroll_progress(7.0);
        assert!(close(rig.ambient().intensity, 0.5));
    }

    #[test]
    fn dispose_is_idempotent() {
        let (mut graph, mut rig) = rig();
        assert!(rig.dispose(&mut graph));
        assert!(!rig.dispose(&mut graph));
        assert_eq!(graph.lights().count(), 0);
    }
}
