//! Render targets and execution context for the render graph.

use crate::camera::PerspectiveCamera;
use crate::handles::TargetId;
use crate::renderer::Renderer;
use crate::scene::Scene;

/// An off-screen color target used for intermediate pass results.
///
/// The texture itself lives in the renderer; this struct remembers its
/// handle and size so it can be resized in place and released once.
#[derive(Debug)]
pub struct RenderTarget {
    id: Option<TargetId>,
    label: &'static str,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Allocates a target of `width × height` physical pixels.
    pub fn new(renderer: &mut dyn Renderer, width: u32, height: u32, label: &'static str) -> Self {
        let id = renderer.create_render_target(width, height, label);
        Self {
            id: Some(id),
            label,
            width,
            height,
        }
    }

    /// The target's handle, or `None` once released.
    pub fn id(&self) -> Option<TargetId> {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resizes the target if its dimensions differ.
    pub fn ensure_size(&mut self, renderer: &mut dyn Renderer, width: u32, height: u32) {
        let Some(id) = self.id else {
            return;
        };
        if (self.width, self.height) != (width, height) {
            renderer.resize_render_target(id, width, height);
            self.width = width;
            self.height = height;
        }
    }

    /// Frees the texture. Later calls do nothing.
    pub fn release(&mut self, renderer: &mut dyn Renderer) {
        if let Some(id) = self.id.take() {
            renderer.release_render_target(id);
        }
    }
}

/// Everything a node needs while executing.
///
/// Built fresh for each frame; the `'a` lifetime keeps nodes from holding on
/// to the scene or renderer past the frame.
pub struct RenderContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub scene: &'a Scene<'a>,
    pub camera: &'a PerspectiveCamera,
}
