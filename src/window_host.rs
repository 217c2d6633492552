//! A winit window as a [`HostSurface`].

use std::sync::Arc;

use log::debug;
use winit::window::Window;

use crate::errors::RenderError;
use crate::events::WindowEvents;
use crate::gpu::GpuContext;
use crate::gpu_renderer::GpuRenderer;
use crate::handles::{FrameRequestId, OutputId};
use crate::host::HostSurface;
use crate::renderer::RendererOptions;

/// Hosts a scene in a desktop window.
///
/// Sizes are reported in logical pixels and the window scale factor is the
/// device pixel ratio. Animation frames map to `request_redraw`; the event
/// loop hands the pending id back through
/// [`take_frame_request`](Self::take_frame_request) when the redraw arrives.
pub struct WindowHost {
    window: Arc<Window>,
    events: WindowEvents,
    outputs: Vec<OutputId>,
    pending_frame: Option<FrameRequestId>,
    next_id: u64,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            events: WindowEvents::new(),
            outputs: Vec::new(),
            pending_frame: None,
            next_id: 0,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// The outstanding frame request, cleared on read.
    pub fn take_frame_request(&mut self) -> Option<FrameRequestId> {
        self.pending_frame.take()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn logical_size(&self) -> (u32, u32) {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        (size.width.round() as u32, size.height.round() as u32)
    }
}

impl HostSurface for WindowHost {
    type Renderer = GpuRenderer;

    fn client_width(&self) -> u32 {
        self.logical_size().0
    }

    fn client_height(&self) -> u32 {
        self.logical_size().1
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    fn create_renderer(&mut self, options: &RendererOptions) -> Result<GpuRenderer, RenderError> {
        let gpu = GpuContext::new(self.window.clone(), options)?;
        let output = OutputId::new(self.next_id());
        let size = self.logical_size();
        Ok(GpuRenderer::new(
            gpu,
            output,
            *options,
            size,
            self.device_pixel_ratio(),
        ))
    }

    fn append_output(&mut self, output: OutputId) {
        self.outputs.push(output);
        self.window.set_visible(true);
    }

    fn remove_output(&mut self, output: OutputId) {
        self.outputs.retain(|o| *o != output);
        if self.outputs.is_empty() {
            debug!("last output removed");
        }
    }

    fn request_animation_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId::new(self.next_id());
        self.pending_frame = Some(id);
        self.window.request_redraw();
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameRequestId) {
        if self.pending_frame == Some(id) {
            self.pending_frame = None;
        }
    }

    fn events(&self) -> &WindowEvents {
        &self.events
    }
}
