use glam::{Mat4, Vec3};

use crate::config::EngineConfig;

/// Perspective camera looking down -Z
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            fov_y,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn from_config(config: &EngineConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov_degrees.to_radians(), aspect, config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.camera_distance);
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    /// Recompute the projection after changing fov, aspect or clip planes
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_places_camera_on_z() {
        let camera = PerspectiveCamera::from_config(&EngineConfig::default(), 1.5);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn set_aspect_refreshes_projection() {
        let mut camera = PerspectiveCamera::new(1.0, 1.0, 0.1, 100.0);
        let before = camera.projection();
        camera.set_aspect(2.0);
        assert_ne!(before, camera.projection());
        assert_eq!(camera.projection(), Mat4::perspective_rh(1.0, 2.0, 0.1, 100.0));
    }

    #[test]
    fn origin_projects_to_centre() {
        let camera = PerspectiveCamera::from_config(&EngineConfig::default(), 1.0);
        let clip = camera.view_projection().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-6 && clip.y.abs() < 1e-6);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
