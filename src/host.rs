//! The surface a scene is mounted on.

use crate::errors::RenderError;
use crate::events::WindowEvents;
use crate::handles::{FrameRequestId, OutputId};
use crate::renderer::{Renderer, RendererOptions};

/// A place to show a rendered scene: a window, a page element, or a test
/// double.
///
/// The host reports its size in logical pixels plus a device pixel ratio,
/// owns the resize listener registry, schedules animation frames and
/// creates the renderer that draws into it.
pub trait HostSurface {
    type Renderer: Renderer;

    fn client_width(&self) -> u32;

    fn client_height(&self) -> u32;

    fn device_pixel_ratio(&self) -> f32;

    /// `client_width / client_height`, or `None` while the host has no height.
    fn aspect(&self) -> Option<f32> {
        let height = self.client_height();
        (height > 0).then(|| self.client_width() as f32 / height as f32)
    }

    fn create_renderer(&mut self, options: &RendererOptions)
    -> Result<Self::Renderer, RenderError>;

    /// Shows a renderer's output.
    fn append_output(&mut self, output: OutputId);

    /// Stops showing an output. Unknown outputs are ignored.
    fn remove_output(&mut self, output: OutputId);

    /// Asks for one animation frame callback.
    fn request_animation_frame(&mut self) -> FrameRequestId;

    fn cancel_animation_frame(&mut self, id: FrameRequestId);

    fn events(&self) -> &WindowEvents;
}
