use crate::render_graph::{NodeTargets, RenderContext, RenderNode};
use crate::renderer::RenderDestination;

/// Draws the scene.
///
/// Renders into the graph's read target so the next node can sample it, or
/// straight to the screen when it is the only node. It never swaps.
#[derive(Debug, Default)]
pub struct SceneNode;

impl SceneNode {
    pub fn new() -> Self {
        Self
    }
}

impl RenderNode for SceneNode {
    fn label(&self) -> &'static str {
        "scene"
    }

    fn execute(&mut self, ctx: &mut RenderContext, targets: NodeTargets) {
        let destination = if targets.to_screen {
            RenderDestination::Screen
        } else {
            RenderDestination::Target(targets.read)
        };
        ctx.renderer.draw_scene(ctx.scene, ctx.camera, destination);
    }

    fn needs_swap(&self) -> bool {
        false
    }
}
