//! Multi-pass frame composer.
//!
//! A [`RenderGraph`] runs a linear chain of [`RenderNode`]s over a pair of
//! ping-pong targets. Each node reads the previous result from the *read*
//! target and either writes to the *write* target (then the two swap) or,
//! if it is the last node, straight to the screen.
//!
//! ```text
//! ┌─────────────┐    ┌─────────────────────────────┐    ┌──────────┐
//! │  SceneNode  │───▶│          SmaaNode           │───▶│  Screen  │
//! │ (no swap)   │    │ edges ─▶ weights ─▶ blend   │    │          │
//! └─────────────┘    └─────────────────────────────┘    └──────────┘
//!       │                         │
//!       ▼                         ▼
//!    read target            write target (swap)
//! ```
//!
//! The targets are sized in physical pixels: the logical size handed to
//! [`RenderGraph::set_size`] times the graph's pixel ratio.
//!
//! # Example
//!
//! ```
//! use glasscard::{HeadlessRenderer, RenderGraph, SceneNode, SmaaNode};
//!
//! let mut renderer = HeadlessRenderer::new();
//! let smaa = SmaaNode::new(&mut renderer, 1600, 1200);
//! let mut graph = RenderGraph::builder()
//!     .node(SceneNode::new())
//!     .node(smaa)
//!     .pixel_ratio(2.0)
//!     .build(&mut renderer, 800, 600);
//!
//! assert_eq!(graph.target_size(), (1600, 1200));
//! graph.dispose(&mut renderer);
//! ```

mod graph;
mod render_node;
mod render_target;
mod scene_node;
mod smaa_node;

pub use graph::{RenderGraph, RenderGraphBuilder};
pub use render_node::{NodeTargets, RenderNode};
pub use render_target::{RenderContext, RenderTarget};
pub use scene_node::SceneNode;
pub use smaa_node::SmaaNode;
