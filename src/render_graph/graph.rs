//! The render graph and its builder.

use log::{debug, warn};

use crate::camera::PerspectiveCamera;
use crate::render_graph::{NodeTargets, RenderContext, RenderNode, RenderTarget};
use crate::renderer::{Renderer, scaled_size};
use crate::scene::Scene;

/// Builder for [`RenderGraph`]. Nodes execute in the order they are added.
///
/// ```
/// use glasscard::{HeadlessRenderer, RenderGraph, SceneNode};
///
/// let mut renderer = HeadlessRenderer::new();
/// let mut graph = RenderGraph::builder()
///     .node(SceneNode::new())
///     .build(&mut renderer, 640, 480);
/// assert_eq!(graph.node_count(), 1);
/// graph.dispose(&mut renderer);
/// ```
pub struct RenderGraphBuilder {
    nodes: Vec<Box<dyn RenderNode>>,
    pixel_ratio: f32,
}

impl RenderGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            pixel_ratio: 1.0,
        }
    }

    /// Appends a node to the chain.
    pub fn node<N: RenderNode + 'static>(mut self, node: N) -> Self {
        self.nodes.push(Box::new(node));
        self
    }

    pub fn pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Allocates the ping-pong targets for a `width × height` logical output
    /// and sizes every node to match.
    pub fn build(self, renderer: &mut dyn Renderer, width: u32, height: u32) -> RenderGraph {
        let (target_width, target_height) = scaled_size(width, height, self.pixel_ratio);
        let read = RenderTarget::new(renderer, target_width, target_height, "RenderGraph Target A");
        let write = RenderTarget::new(renderer, target_width, target_height, "RenderGraph Target B");

        let mut graph = RenderGraph {
            nodes: self.nodes,
            read,
            write,
            width,
            height,
            pixel_ratio: self.pixel_ratio,
            disposed: false,
        };
        for node in &mut graph.nodes {
            node.set_size(renderer, target_width, target_height);
        }
        graph
    }
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain of render nodes over two ping-pong targets.
///
/// ```text
/// SceneNode:  draws into read          (no swap)
/// SmaaNode:   read → write or screen   (swap)
/// ```
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
    read: RenderTarget,
    write: RenderTarget,
    /// Logical size.
    width: u32,
    height: u32,
    pixel_ratio: f32,
    disposed: bool,
}

impl RenderGraph {
    pub fn builder() -> RenderGraphBuilder {
        RenderGraphBuilder::new()
    }

    /// Runs every node and presents the result.
    ///
    /// Returns `false` without drawing if the graph was disposed or the
    /// renderer declined the frame.
    pub fn execute(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> bool {
        if self.disposed || self.nodes.is_empty() {
            return false;
        }
        let (Some(mut read), Some(mut write)) = (self.read.id(), self.write.id()) else {
            return false;
        };
        if !renderer.begin_frame() {
            warn!("renderer declined the frame; skipping");
            return false;
        }

        let last = self.nodes.len() - 1;
        let mut ctx = RenderContext {
            renderer,
            scene,
            camera,
        };
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let targets = NodeTargets {
                read,
                write,
                to_screen: i == last,
            };
            node.execute(&mut ctx, targets);
            if node.needs_swap() {
                std::mem::swap(&mut read, &mut write);
            }
        }
        ctx.renderer.end_frame();
        true
    }

    /// Resizes the targets and nodes to `width × height` logical pixels at
    /// the current pixel ratio.
    pub fn set_size(&mut self, renderer: &mut dyn Renderer, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.width = width;
        self.height = height;

        let (target_width, target_height) = self.target_size();
        self.read.ensure_size(renderer, target_width, target_height);
        self.write.ensure_size(renderer, target_width, target_height);
        for node in &mut self.nodes {
            node.set_size(renderer, target_width, target_height);
        }
        debug!(
            "render graph resized to {width}x{height} @{} ({target_width}x{target_height})",
            self.pixel_ratio
        );
    }

    /// Changes the pixel ratio and resizes everything to match.
    pub fn set_pixel_ratio(&mut self, renderer: &mut dyn Renderer, ratio: f32) {
        self.pixel_ratio = ratio;
        self.set_size(renderer, self.width, self.height);
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Logical size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Physical size of the intermediate targets.
    pub fn target_size(&self) -> (u32, u32) {
        scaled_size(self.width, self.height, self.pixel_ratio)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Releases both ping-pong targets and every node's resources.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        if self.disposed {
            return;
        }
        self.read.release(renderer);
        self.write.release(renderer);
        for node in &mut self.nodes {
            node.dispose(renderer);
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
