//! Physically based transmissive material.
//!
//! [`PhysicalMaterial`] is the CPU-side description of a glass-like surface:
//! base color and opacity, a metallic/roughness response, transmission with
//! a thickness and index of refraction, and a glossy clearcoat layer on top.
//! [`MaterialUniforms`] is its packed GPU representation.

use crate::color::Color;

/// Which faces of a mesh are shaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// A physically based surface with transmission and clearcoat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub opacity: f32,
    /// Alpha blending enabled.
    pub transparent: bool,
    pub transmission: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub thickness: f32,
    pub ior: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub side: Side,
    /// Scale applied to environment reflections.
    pub env_map_intensity: f32,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            transmission: 0.0,
            roughness: 1.0,
            metalness: 0.0,
            thickness: 0.0,
            ior: 1.5,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            side: Side::Front,
            env_map_intensity: 1.0,
        }
    }
}

impl PhysicalMaterial {
    /// Shallow-merges `patch` into this material; `None` fields are left alone.
    pub fn apply(&mut self, patch: &MaterialPatch) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        merge!(
            color,
            opacity,
            transparent,
            transmission,
            roughness,
            metalness,
            thickness,
            ior,
            clearcoat,
            clearcoat_roughness,
            side,
            env_map_intensity,
        );
    }

    /// Packs the material for the card shader.
    pub fn uniforms(&self) -> MaterialUniforms {
        let [r, g, b] = self.color.to_linear();
        let opacity = if self.transparent { self.opacity } else { 1.0 };
        MaterialUniforms {
            color: [r, g, b, opacity],
            surface: [
                self.roughness,
                self.metalness,
                self.transmission,
                self.thickness,
            ],
            layers: [
                self.ior,
                self.clearcoat,
                self.clearcoat_roughness,
                self.env_map_intensity,
            ],
        }
    }
}

/// A partial update for a live [`PhysicalMaterial`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialPatch {
    pub color: Option<Color>,
    pub opacity: Option<f32>,
    pub transparent: Option<bool>,
    pub transmission: Option<f32>,
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
    pub thickness: Option<f32>,
    pub ior: Option<f32>,
    pub clearcoat: Option<f32>,
    pub clearcoat_roughness: Option<f32>,
    pub side: Option<Side>,
    pub env_map_intensity: Option<f32>,
}

/// GPU layout of a material.
///
/// ```wgsl
/// struct Material {
///     color: vec4<f32>,   // linear rgb, opacity
///     surface: vec4<f32>, // roughness, metalness, transmission, thickness
///     layers: vec4<f32>,  // ior, clearcoat, clearcoat roughness, env intensity
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub color: [f32; 4],
    pub surface: [f32; 4],
    pub layers: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_present_fields() {
        let mut material = PhysicalMaterial {
            roughness: 0.1,
            clearcoat: 1.0,
            ..Default::default()
        };
        material.apply(&MaterialPatch {
            roughness: Some(0.6),
            side: Some(Side::Double),
            ..Default::default()
        });
        assert_eq!(material.roughness, 0.6);
        assert_eq!(material.side, Side::Double);
        assert_eq!(material.clearcoat, 1.0);
        assert_eq!(material.ior, 1.5);
    }

    #[test]
    fn opaque_materials_ignore_opacity() {
        let material = PhysicalMaterial {
            opacity: 0.2,
            ..Default::default()
        };
        assert_eq!(material.uniforms().color[3], 1.0);

        let glass = PhysicalMaterial {
            opacity: 0.2,
            transparent: true,
            ..Default::default()
        };
        assert_eq!(glass.uniforms().color[3], 0.2);
    }

    #[test]
    fn uniforms_are_three_vec4s() {
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
    }
}
