//! Scene lights and their packed GPU form.

use glam::Vec3;

use crate::color::Color;
use crate::config::LightSettings;

/// Maximum point lights the card shader evaluates.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Uniform light from every direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Parallel rays travelling from `position` towards `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }
}

/// Omnidirectional light with no falloff distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

/// The lights a scene is lit by.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub points: Vec<PointLight>,
}

impl From<&LightSettings> for LightRig {
    fn from(settings: &LightSettings) -> Self {
        let points = settings
            .point_positions
            .iter()
            .zip(settings.point_intensity)
            .map(|(&position, intensity)| PointLight {
                color: Color::WHITE,
                intensity,
                position,
            })
            .collect();

        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: settings.ambient_intensity,
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: settings.directional_intensity,
                position: settings.directional_direction,
                target: Vec3::ZERO,
            },
            points,
        }
    }
}

impl LightRig {
    /// Packs the rig, dropping point lights past [`MAX_POINT_LIGHTS`].
    pub fn uniforms(&self) -> LightUniforms {
        let radiance = |color: Color, intensity: f32| {
            let [r, g, b] = color.to_linear();
            [r * intensity, g * intensity, b * intensity, 0.0]
        };

        let mut point_positions = [[0.0; 4]; MAX_POINT_LIGHTS];
        let mut point_colors = [[0.0; 4]; MAX_POINT_LIGHTS];
        let count = self.points.len().min(MAX_POINT_LIGHTS);
        for (i, light) in self.points.iter().take(count).enumerate() {
            point_positions[i] = light.position.extend(1.0).to_array();
            point_colors[i] = radiance(light.color, light.intensity);
        }

        LightUniforms {
            ambient: radiance(self.ambient.color, self.ambient.intensity),
            directional_dir: self.directional.to_light().extend(0.0).to_array(),
            directional_color: radiance(self.directional.color, self.directional.intensity),
            point_positions,
            point_colors,
            counts: [count as u32, 0, 0, 0],
        }
    }
}

/// GPU layout of a [`LightRig`]. Colors are premultiplied by intensity.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub ambient: [f32; 4],
    pub directional_dir: [f32; 4],
    pub directional_color: [f32; 4],
    pub point_positions: [[f32; 4]; MAX_POINT_LIGHTS],
    pub point_colors: [[f32; 4]; MAX_POINT_LIGHTS],
    pub counts: [u32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_rig_matches_settings() {
        let rig = LightRig::from(&LightSettings::default());
        assert_eq!(rig.ambient.intensity, 0.4);
        assert_eq!(rig.directional.intensity, 5.0);
        assert_eq!(rig.directional.target, Vec3::ZERO);
        assert_eq!(rig.points.len(), 2);
        assert_eq!(rig.points[0].position, Vec3::new(-5.0, 3.0, 3.0));
        assert_eq!(rig.points[1].intensity, 0.3);
    }

    #[test]
    fn directional_light_points_at_origin() {
        let rig = LightRig::from(&LightSettings::default());
        let dir = rig.directional.to_light();
        let expected = Vec3::new(1.0, 2.0, 1.0).normalize();
        assert_relative_eq!(dir.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(dir.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(dir.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn uniforms_scale_color_by_intensity() {
        let rig = LightRig::from(&LightSettings::default());
        let packed = rig.uniforms();
        assert_relative_eq!(packed.ambient[0], 0.4, epsilon = 1e-6);
        assert_relative_eq!(packed.directional_color[1], 5.0, epsilon = 1e-6);
        assert_eq!(packed.counts[0], 2);
        assert_eq!(packed.point_colors[2], [0.0; 4]);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 192);
    }
}
