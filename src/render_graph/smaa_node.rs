//! Subpixel morphological anti-aliasing.
//!
//! Three fullscreen stages over the previous node's color output:
//!
//! 1. **edges**: luma differences above a threshold mark edge texels
//! 2. **weights**: each edge texel gets blend weights from the length of
//!    the edge run it sits on
//! 3. **blend**: the color is mixed with its neighbours by those weights
//!
//! The two intermediate targets belong to the node and follow the graph's
//! physical size.

use log::debug;

use crate::render_graph::{NodeTargets, RenderContext, RenderNode, RenderTarget};
use crate::renderer::{Effect, RenderDestination, Renderer};

pub struct SmaaNode {
    edges: RenderTarget,
    weights: RenderTarget,
}

impl SmaaNode {
    /// Allocates the edge and weight targets at `width × height` physical
    /// pixels.
    pub fn new(renderer: &mut dyn Renderer, width: u32, height: u32) -> Self {
        Self {
            edges: RenderTarget::new(renderer, width, height, "SMAA Edges Target"),
            weights: RenderTarget::new(renderer, width, height, "SMAA Weights Target"),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.edges.size()
    }
}

impl RenderNode for SmaaNode {
    fn label(&self) -> &'static str {
        "smaa"
    }

    fn execute(&mut self, ctx: &mut RenderContext, targets: NodeTargets) {
        let (Some(edges), Some(weights)) = (self.edges.id(), self.weights.id()) else {
            return;
        };

        let renderer = &mut *ctx.renderer;
        renderer.draw_effect(
            Effect::SmaaEdges,
            &[targets.read],
            RenderDestination::Target(edges),
        );
        renderer.draw_effect(
            Effect::SmaaWeights,
            &[edges],
            RenderDestination::Target(weights),
        );

        let destination = if targets.to_screen {
            RenderDestination::Screen
        } else {
            RenderDestination::Target(targets.write)
        };
        renderer.draw_effect(Effect::SmaaBlend, &[targets.read, weights], destination);
    }

    fn set_size(&mut self, renderer: &mut dyn Renderer, width: u32, height: u32) {
        self.edges.ensure_size(renderer, width, height);
        self.weights.ensure_size(renderer, width, height);
        debug!("smaa targets resized to {width}x{height}");
    }

    fn dispose(&mut self, renderer: &mut dyn Renderer) {
        self.edges.release(renderer);
        self.weights.release(renderer);
    }
}
