//! Card and scene configuration records.
//!
//! [`CardConfig`] is the complete, immutable description of one card. Card
//! data is authored as [`CardOverrides`], a partial record where every field
//! is optional; [`CardOverrides::resolve`] fills the gaps from
//! [`CardConfig::default`]. Precedence is per field: a value present in the
//! override always wins, an absent one always falls back to the default.
//!
//! [`SceneConfig`] holds the camera, lighting and renderer settings used when
//! a scene is attached to a host.
//!
//! # Example
//!
//! ```
//! use glasscard::{CardConfig, CardOverrides, Color};
//!
//! let card = CardOverrides::new()
//!     .size(3.5, 2.5, 0.25)
//!     .color(Color::hex(0xefefef))
//!     .resolve();
//!
//! assert_eq!(card.width, 3.5);
//! assert_eq!(card.ior, CardConfig::default().ior);
//! ```

use glam::Vec3;

use crate::color::Color;
use crate::renderer::RendererOptions;
use crate::rotation::RotationDegrees;

/// Complete parameters for one glass card.
///
/// Documented ranges are conventions, not checks: out-of-range values are
/// passed to the renderer untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct CardConfig {
    /// Width along X. Positive.
    pub width: f32,
    /// Height along Y. Positive.
    pub height: f32,
    /// Depth along Z. Positive.
    pub depth: f32,
    /// Edge and corner radius, `0 ..= min(width, height) / 2`.
    pub radius: f32,
    /// Base color.
    pub color: Color,
    /// Surface opacity in `[0, 1]`.
    pub opacity: f32,
    /// Glass-like transmission in `[0, 1]`.
    pub transmission: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Volume thickness used for the transmission tint.
    pub thickness: f32,
    /// Index of refraction, `>= 1`.
    pub ior: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    /// World position.
    pub position: Vec3,
    /// Initial rotation in degrees.
    pub rotation: RotationDegrees,
    /// Display name used by the catalog.
    pub label: Option<String>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 2.5,
            height: 3.5,
            depth: 0.1,
            radius: 0.1,
            color: Color::hex(0x000000),
            opacity: 0.3,
            transmission: 0.9,
            roughness: 0.1,
            metalness: 0.05,
            thickness: 0.5,
            ior: 1.5,
            clearcoat: 1.0,
            clearcoat_roughness: 0.1,
            position: Vec3::ZERO,
            rotation: RotationDegrees::ZERO,
            label: None,
        }
    }
}

impl CardConfig {
    /// Returns a copy with `overrides` applied on top of `self`.
    pub fn merged(&self, overrides: &CardOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            depth: overrides.depth.unwrap_or(self.depth),
            radius: overrides.radius.unwrap_or(self.radius),
            color: overrides.color.unwrap_or(self.color),
            opacity: overrides.opacity.unwrap_or(self.opacity),
            transmission: overrides.transmission.unwrap_or(self.transmission),
            roughness: overrides.roughness.unwrap_or(self.roughness),
            metalness: overrides.metalness.unwrap_or(self.metalness),
            thickness: overrides.thickness.unwrap_or(self.thickness),
            ior: overrides.ior.unwrap_or(self.ior),
            clearcoat: overrides.clearcoat.unwrap_or(self.clearcoat),
            clearcoat_roughness: overrides
                .clearcoat_roughness
                .unwrap_or(self.clearcoat_roughness),
            position: overrides.position.unwrap_or(self.position),
            rotation: overrides.rotation.unwrap_or(self.rotation),
            label: overrides.label.clone().or_else(|| self.label.clone()),
        }
    }

    /// Returns a copy with only the rotation replaced.
    pub fn with_rotation(&self, rotation: RotationDegrees) -> Self {
        Self {
            rotation,
            ..self.clone()
        }
    }
}

/// A partial [`CardConfig`]: every `None` field falls back to the default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardOverrides {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
    pub radius: Option<f32>,
    pub color: Option<Color>,
    pub opacity: Option<f32>,
    pub transmission: Option<f32>,
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
    pub thickness: Option<f32>,
    pub ior: Option<f32>,
    pub clearcoat: Option<f32>,
    pub clearcoat_roughness: Option<f32>,
    pub position: Option<Vec3>,
    pub rotation: Option<RotationDegrees>,
    pub label: Option<String>,
}

impl CardOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges onto [`CardConfig::default`].
    pub fn resolve(&self) -> CardConfig {
        CardConfig::default().merged(self)
    }

    pub fn size(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.depth = Some(depth);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn transmission(mut self, transmission: f32) -> Self {
        self.transmission = Some(transmission);
        self
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = Some(roughness);
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = Some(metalness);
        self
    }

    pub fn thickness(mut self, thickness: f32) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn ior(mut self, ior: f32) -> Self {
        self.ior = Some(ior);
        self
    }

    pub fn clearcoat(mut self, clearcoat: f32, roughness: f32) -> Self {
        self.clearcoat = Some(clearcoat);
        self.clearcoat_roughness = Some(roughness);
        self
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Some(Vec3::new(x, y, z));
        self
    }

    pub fn rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Some(RotationDegrees::new(x, y, z));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Perspective camera settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 50.0,
            near: 0.1,
            far: 1000.0,
            distance: 6.0,
        }
    }
}

/// Intensities and placement of the lighting rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSettings {
    /// Soft base fill.
    pub ambient_intensity: f32,
    /// Main light. Parallel rays travelling from `directional_direction`
    /// towards the origin.
    pub directional_intensity: f32,
    pub directional_direction: Vec3,
    /// Local highlights, kept dim.
    pub point_intensity: [f32; 2],
    pub point_positions: [Vec3; 2],
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.4,
            directional_intensity: 5.0,
            directional_direction: Vec3::new(1.0, 2.0, 1.0),
            point_intensity: [0.3, 0.3],
            point_positions: [Vec3::new(-5.0, 3.0, 3.0), Vec3::new(5.0, -3.0, 3.0)],
        }
    }
}

/// Everything a scene needs at attach time besides the card itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraSettings,
    pub lights: LightSettings,
    pub renderer: RendererOptions,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }

    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.camera.fov = fov_degrees;
        self
    }

    pub fn camera_distance(mut self, distance: f32) -> Self {
        self.camera.distance = distance;
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.camera.near = near;
        self.camera.far = far;
        self
    }

    pub fn lights(mut self, lights: LightSettings) -> Self {
        self.lights = lights;
        self
    }

    pub fn directional_light(mut self, direction: Vec3, intensity: f32) -> Self {
        self.lights.directional_direction = direction;
        self.lights.directional_intensity = intensity;
        self
    }

    pub fn renderer(mut self, options: RendererOptions) -> Self {
        self.renderer = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_override_resolves_to_defaults() {
        assert_eq!(CardOverrides::new().resolve(), CardConfig::default());
    }

    #[test]
    fn present_fields_win_and_absent_fields_fall_back() {
        let defaults = CardConfig::default();
        let card = CardOverrides::new()
            .size(3.5, 2.5, 0.25)
            .ior(1.33)
            .rotation(-43.0, 14.0, 33.0)
            .resolve();

        assert_eq!(card.width, 3.5);
        assert_eq!(card.height, 2.5);
        assert_eq!(card.depth, 0.25);
        assert_eq!(card.ior, 1.33);
        assert_eq!(card.rotation, RotationDegrees::new(-43.0, 14.0, 33.0));

        assert_eq!(card.radius, defaults.radius);
        assert_eq!(card.color, defaults.color);
        assert_eq!(card.opacity, defaults.opacity);
        assert_eq!(card.clearcoat_roughness, defaults.clearcoat_roughness);
        assert_eq!(card.position, defaults.position);
        assert_eq!(card.label, None);
    }

    #[test]
    fn every_single_field_override_is_left_biased() {
        let defaults = CardConfig::default();
        let singles: Vec<(CardOverrides, Box<dyn Fn(&CardConfig) -> bool>)> = vec![
            (CardOverrides::new().radius(0.3), Box::new(|c: &CardConfig| c.radius == 0.3)),
            (CardOverrides::new().opacity(1.0), Box::new(|c: &CardConfig| c.opacity == 1.0)),
            (
                CardOverrides::new().transmission(0.2),
                Box::new(|c: &CardConfig| c.transmission == 0.2),
            ),
            (CardOverrides::new().roughness(0.7), Box::new(|c: &CardConfig| c.roughness == 0.7)),
            (CardOverrides::new().metalness(0.9), Box::new(|c: &CardConfig| c.metalness == 0.9)),
            (CardOverrides::new().thickness(2.0), Box::new(|c: &CardConfig| c.thickness == 2.0)),
            (
                CardOverrides::new().color(Color::hex(0x34d399)),
                Box::new(|c: &CardConfig| c.color == Color::hex(0x34d399)),
            ),
            (
                CardOverrides::new().position(1.0, 2.0, 3.0),
                Box::new(|c: &CardConfig| c.position == Vec3::new(1.0, 2.0, 3.0)),
            ),
            (
                CardOverrides::new().label("Idea"),
                Box::new(|c: &CardConfig| c.label.as_deref() == Some("Idea")),
            ),
        ];

        for (overrides, check) in singles {
            let card = overrides.resolve();
            assert!(check(&card), "override not applied: {overrides:?}");
            // Everything else is untouched.
            assert_eq!(card.width, defaults.width);
            assert_eq!(card.ior, defaults.ior);
            assert_eq!(card.clearcoat, defaults.clearcoat);
            assert_eq!(card.rotation, defaults.rotation);
        }
    }

    #[test]
    fn merge_applies_onto_any_base() {
        let base = CardOverrides::new().label("Base").roughness(0.5).resolve();
        let merged = base.merged(&CardOverrides::new().roughness(0.2));
        assert_eq!(merged.roughness, 0.2);
        assert_eq!(merged.label.as_deref(), Some("Base"));
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let card = CardOverrides::new().opacity(4.0).ior(0.2).radius(-1.0).resolve();
        assert_eq!(card.opacity, 4.0);
        assert_eq!(card.ior, 0.2);
        assert_eq!(card.radius, -1.0);
    }

    #[test]
    fn scene_config_builder_overrides_fields() {
        let config = SceneConfig::new()
            .fov(35.0)
            .camera_distance(10.0)
            .clip_planes(0.5, 50.0)
            .directional_light(Vec3::Y, 2.0);
        assert_eq!(config.camera.fov, 35.0);
        assert_eq!(config.camera.distance, 10.0);
        assert_eq!((config.camera.near, config.camera.far), (0.5, 50.0));
        assert_eq!(config.lights.directional_direction, Vec3::Y);
        assert_eq!(config.lights.ambient_intensity, 0.4);
    }
}
