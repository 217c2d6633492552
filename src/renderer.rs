//! The renderer abstraction the scene code draws through.
//!
//! Everything above this module (cards, the post-processing composer, the
//! scene lifecycle) talks to a `&mut dyn Renderer`. Two backends implement
//! it: [`GpuRenderer`](crate::GpuRenderer) on top of wgpu, and
//! [`HeadlessRenderer`](crate::HeadlessRenderer), which records what it was
//! asked to do without touching a GPU.
//!
//! # Frame protocol
//!
//! ```text
//! begin_frame() ──▶ draw_scene / draw_effect (any number) ──▶ end_frame()
//! ```
//!
//! `begin_frame` returns `false` when there is nothing to draw into (the
//! surface is lost or the renderer was disposed); the caller skips the frame.
//!
//! # Disposal
//!
//! After [`dispose`](Renderer::dispose) every method is a silent no-op and
//! every `release_*` returns `false`.

use crate::camera::PerspectiveCamera;
use crate::geometry::RawGeometry;
use crate::handles::{GeometryId, MaterialId, OutputId, TargetId};
use crate::material::PhysicalMaterial;
use crate::scene::Scene;

/// Tone mapping applied when shading meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToneMapping {
    None,
    /// ACES filmic curve (Narkowicz fit).
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Value passed to shaders.
    pub fn shader_index(self) -> u32 {
        match self {
            ToneMapping::None => 0,
            ToneMapping::AcesFilmic => 1,
        }
    }
}

/// GPU adapter preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

/// Options fixed at renderer creation.
///
/// ```
/// use glasscard::{RendererOptions, ToneMapping};
///
/// let options = RendererOptions::default().exposure(1.2);
/// assert!(options.alpha);
/// assert_eq!(options.tone_mapping, ToneMapping::AcesFilmic);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererOptions {
    /// Output keeps an alpha channel so the page behind shows through.
    pub alpha: bool,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    pub power_preference: PowerPreference,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            alpha: true,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            power_preference: PowerPreference::HighPerformance,
        }
    }
}

impl RendererOptions {
    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn tone_mapping(mut self, tone_mapping: ToneMapping) -> Self {
        self.tone_mapping = tone_mapping;
        self
    }

    pub fn exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn power_preference(mut self, preference: PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Clear color for the output surface.
    pub fn clear_color(&self) -> [f64; 4] {
        if self.alpha {
            [0.0, 0.0, 0.0, 0.0]
        } else {
            [0.0, 0.0, 0.0, 1.0]
        }
    }
}

/// Where a draw lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderDestination {
    /// The renderer's output surface.
    Screen,
    /// An off-screen target created with [`Renderer::create_render_target`].
    Target(TargetId),
}

/// Fullscreen effect stages.
///
/// The three SMAA stages take these inputs:
///
/// | Stage         | inputs\[0\]   | inputs\[1\]  |
/// |---------------|---------------|--------------|
/// | `SmaaEdges`   | scene color   |              |
/// | `SmaaWeights` | edges         |              |
/// | `SmaaBlend`   | scene color   | weights      |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    SmaaEdges,
    SmaaWeights,
    SmaaBlend,
}

impl Effect {
    pub fn label(self) -> &'static str {
        match self {
            Effect::SmaaEdges => "SMAA Edges",
            Effect::SmaaWeights => "SMAA Weights",
            Effect::SmaaBlend => "SMAA Blend",
        }
    }

    /// Number of input targets the stage samples.
    pub fn input_count(self) -> usize {
        match self {
            Effect::SmaaBlend => 2,
            Effect::SmaaEdges | Effect::SmaaWeights => 1,
        }
    }
}

/// A drawing backend.
///
/// Sizes passed to [`set_size`](Self::set_size) are logical pixels; the
/// drawing buffer is that size multiplied by the pixel ratio.
pub trait Renderer {
    /// The output node a host attaches to its view.
    fn output(&self) -> OutputId;

    /// Sets the logical output size.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn pixel_ratio(&self) -> f32;

    /// Sets the logical size and the pixel ratio as one change.
    fn set_size_and_pixel_ratio(&mut self, width: u32, height: u32, ratio: f32) {
        self.set_pixel_ratio(ratio);
        self.set_size(width, height);
    }

    /// Output size in physical pixels.
    fn drawing_buffer_size(&self) -> (u32, u32) {
        let (width, height) = self.size();
        scaled_size(width, height, self.pixel_ratio())
    }

    fn create_geometry(&mut self, geometry: &RawGeometry) -> GeometryId;

    /// Frees a geometry. Returns `false` if it was already gone.
    fn release_geometry(&mut self, id: GeometryId) -> bool;

    fn create_material(&mut self, material: &PhysicalMaterial) -> MaterialId;

    /// Re-uploads a live material's parameters.
    fn write_material(&mut self, id: MaterialId, material: &PhysicalMaterial);

    fn release_material(&mut self, id: MaterialId) -> bool;

    /// Allocates an off-screen color target, in physical pixels.
    fn create_render_target(&mut self, width: u32, height: u32, label: &str) -> TargetId;

    fn resize_render_target(&mut self, id: TargetId, width: u32, height: u32);

    fn release_render_target(&mut self, id: TargetId) -> bool;

    /// Starts a frame. `false` means skip it.
    fn begin_frame(&mut self) -> bool;

    /// Draws every mesh in `scene` as seen from `camera`.
    fn draw_scene(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        destination: RenderDestination,
    );

    /// Runs a fullscreen effect stage.
    fn draw_effect(&mut self, effect: Effect, inputs: &[TargetId], destination: RenderDestination);

    /// Submits the frame and presents the output.
    fn end_frame(&mut self);

    /// Releases the device-level resources. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// `width × ratio, height × ratio`, rounded, never below one pixel.
pub fn scaled_size(width: u32, height: u32, ratio: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_size_rounds_and_clamps() {
        assert_eq!(scaled_size(800, 600, 2.0), (1600, 1200));
        assert_eq!(scaled_size(801, 601, 1.5), (1202, 902));
        assert_eq!(scaled_size(0, 10, 1.0), (1, 10));
    }

    #[test]
    fn default_options_match_glass_output() {
        let options = RendererOptions::default();
        assert!(options.alpha);
        assert_eq!(options.exposure, 1.0);
        assert_eq!(options.power_preference, PowerPreference::HighPerformance);
        assert_eq!(options.clear_color()[3], 0.0);
        assert_eq!(options.alpha(false).clear_color()[3], 1.0);
    }

    #[test]
    fn blend_stage_samples_two_inputs() {
        assert_eq!(Effect::SmaaEdges.input_count(), 1);
        assert_eq!(Effect::SmaaWeights.input_count(), 1);
        assert_eq!(Effect::SmaaBlend.input_count(), 2);
    }
}
