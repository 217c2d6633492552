//! The core render node trait for the render graph.

use crate::handles::TargetId;
use crate::render_graph::RenderContext;
use crate::renderer::Renderer;

/// The ping-pong targets a node sees during one execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeTargets {
    /// Holds the previous node's output.
    pub read: TargetId,
    /// Free for this node's output.
    pub write: TargetId,
    /// This is the last node; its output goes to the screen.
    pub to_screen: bool,
}

/// One stage of a [`RenderGraph`](crate::RenderGraph).
///
/// # Execution flow
///
/// 1. `execute()` is called in insertion order
/// 2. if `needs_swap()` is true afterwards, read and write targets trade places
/// 3. the last node is told to render to the screen
///
/// Nodes that allocate their own targets size them in
/// [`set_size`](Self::set_size) and free them in [`dispose`](Self::dispose).
pub trait RenderNode {
    fn label(&self) -> &'static str;

    /// Records this node's draws.
    fn execute(&mut self, ctx: &mut RenderContext, targets: NodeTargets);

    /// Whether the node wrote into `targets.write` and the graph should swap.
    fn needs_swap(&self) -> bool {
        true
    }

    /// Called with the physical size whenever the graph is resized.
    fn set_size(&mut self, _renderer: &mut dyn Renderer, _width: u32, _height: u32) {}

    /// Frees anything the node allocated. Must tolerate repeated calls.
    fn dispose(&mut self, _renderer: &mut dyn Renderer) {}
}
