//! The scene's post-processing pipeline: render pass, then SMAA.

use log::debug;

use crate::camera::PerspectiveCamera;
use crate::render_graph::{RenderGraph, SceneNode, SmaaNode};
use crate::renderer::{Renderer, scaled_size};
use crate::scene::Scene;

/// A scene render followed by morphological anti-aliasing.
///
/// The anti-aliasing stage runs at `width × pixel_ratio` by
/// `height × pixel_ratio`. Frames are only produced when
/// [`render`](Self::render) is called.
///
/// ```
/// use glasscard::{HeadlessRenderer, PostProcessing};
///
/// let mut renderer = HeadlessRenderer::new();
/// let mut pipeline = PostProcessing::new(&mut renderer, 800, 600, 2.0);
/// assert_eq!(pipeline.resolution(), (1600, 1200));
///
/// pipeline.dispose(&mut renderer);
/// pipeline.dispose(&mut renderer);
/// assert_eq!(renderer.live_targets(), 0);
/// ```
pub struct PostProcessing {
    composer: RenderGraph,
}

impl PostProcessing {
    /// Builds the pipeline for a `width × height` logical output.
    pub fn new(renderer: &mut dyn Renderer, width: u32, height: u32, pixel_ratio: f32) -> Self {
        let (smaa_width, smaa_height) = scaled_size(width, height, pixel_ratio);
        let smaa = SmaaNode::new(renderer, smaa_width, smaa_height);
        let composer = RenderGraph::builder()
            .node(SceneNode::new())
            .node(smaa)
            .pixel_ratio(pixel_ratio)
            .build(renderer, width, height);
        debug!("post-processing ready at {smaa_width}x{smaa_height}");
        Self { composer }
    }

    /// Runs every pass and presents one frame. A no-op after
    /// [`dispose`](Self::dispose); returns whether a frame was produced.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> bool {
        self.composer.execute(renderer, scene, camera)
    }

    /// Updates the pixel ratio and the logical size together.
    pub fn resize(&mut self, renderer: &mut dyn Renderer, width: u32, height: u32, pixel_ratio: f32) {
        if self.composer.is_disposed() {
            return;
        }
        if self.composer.pixel_ratio() != pixel_ratio {
            self.composer.set_pixel_ratio(renderer, pixel_ratio);
        }
        self.composer.set_size(renderer, width, height);
    }

    /// Physical resolution the passes run at.
    pub fn resolution(&self) -> (u32, u32) {
        self.composer.target_size()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.composer.pixel_ratio()
    }

    /// Releases every intermediate target. Idempotent.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        if !self.composer.is_disposed() {
            self.composer.dispose(renderer);
            debug!("post-processing disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.composer.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightSettings;
    use crate::headless::HeadlessRenderer;
    use crate::light::LightRig;
    use crate::renderer::Effect;

    #[test]
    fn render_runs_scene_then_three_smaa_stages() {
        let mut renderer = HeadlessRenderer::new();
        let mut pipeline = PostProcessing::new(&mut renderer, 800, 600, 1.0);
        let lights = LightRig::from(&LightSettings::default());

        assert!(pipeline.render(&mut renderer, &Scene::new(&lights), &PerspectiveCamera::default()));
        assert_eq!(renderer.scene_draws(), 1);
        assert_eq!(
            renderer.effects(),
            vec![Effect::SmaaEdges, Effect::SmaaWeights, Effect::SmaaBlend]
        );
        pipeline.dispose(&mut renderer);
    }

    #[test]
    fn resize_updates_size_and_ratio_together() {
        let mut renderer = HeadlessRenderer::new();
        let mut pipeline = PostProcessing::new(&mut renderer, 800, 600, 1.0);

        pipeline.resize(&mut renderer, 1920, 1080, 1.5);
        assert_eq!(pipeline.pixel_ratio(), 1.5);
        assert_eq!(pipeline.resolution(), (2880, 1620));
        pipeline.dispose(&mut renderer);
    }

    #[test]
    fn render_after_dispose_is_a_no_op() {
        let mut renderer = HeadlessRenderer::new();
        let mut pipeline = PostProcessing::new(&mut renderer, 800, 600, 1.0);
        pipeline.dispose(&mut renderer);
        pipeline.dispose(&mut renderer);

        let lights = LightRig::from(&LightSettings::default());
        assert!(!pipeline.render(&mut renderer, &Scene::new(&lights), &PerspectiveCamera::default()));
        pipeline.resize(&mut renderer, 10, 10, 1.0);
        assert_eq!(renderer.frames_presented(), 0);
        assert_eq!(renderer.live_targets(), 0);
    }
}
