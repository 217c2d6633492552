use glam::{Mat4, Vec3};

use crate::config::CameraSettings;

/// A perspective camera looking down its local -Z axis.
///
/// The projection matrix is cached; call
/// [`update_projection_matrix`](Self::update_projection_matrix) after changing
/// `fov`, `aspect`, `near` or `far`.
#[derive(Clone, Copy, Debug)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Builds a camera from settings, placed `distance` units along +Z.
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        Self::new(settings.fov, aspect, settings.near, settings.far)
            .at(0.0, 0.0, settings.distance)
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Recomputes the cached projection from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_follows_aspect_after_update() {
        let mut camera = PerspectiveCamera::new(50.0, 800.0 / 600.0, 0.1, 1000.0);
        let before = camera.projection_matrix();

        camera.aspect = 1920.0 / 1080.0;
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        let after = camera.projection_matrix();
        // x scale is f / aspect
        assert_relative_eq!(before.x_axis.x / after.x_axis.x, (1920.0 / 1080.0) / (800.0 / 600.0), epsilon = 1e-5);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let camera = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.5);
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
