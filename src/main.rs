use std::sync::Arc;

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use glasscard::{
    apply_action, Axis, CardCatalog, ControlAction, GpuRenderer, HostSurface, KeyboardInput,
    RotationControls, RotationDegrees, SceneConfig, SceneError, SceneLifecycle, WindowHost,
};

struct Viewer {
    host: Option<WindowHost>,
    scene: SceneLifecycle<GpuRenderer>,
    controls: RotationControls,
    base_rotation: RotationDegrees,
    input: KeyboardInput,
    error: Option<SceneError>,
}

impl Viewer {
    fn new() -> Self {
        let base_card = CardCatalog::base_card();
        let base_rotation = base_card.rotation;
        Self {
            host: None,
            scene: SceneLifecycle::new(base_card, SceneConfig::new()),
            controls: RotationControls::new(base_rotation),
            base_rotation,
            input: KeyboardInput::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn on_action(&mut self, action: ControlAction) {
        if action == ControlAction::Copy {
            info!("rotation for card data:\n{}", self.controls.clipboard_text());
            return;
        }
        if let Some(rotation) = apply_action(&mut self.controls, action, self.base_rotation) {
            self.scene.set_rotation(rotation);
            info!(
                "{} {} {}",
                self.controls.readout(Axis::X),
                self.controls.readout(Axis::Y),
                self.controls.readout(Axis::Z)
            );
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Glass Card")
            .with_inner_size(LogicalSize::new(1024.0, 768.0))
            .with_transparent(true)
            .with_visible(false);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let mut host = WindowHost::new(window);
        if let Err(e) = self.scene.attach(&mut host) {
            return self.fail(event_loop, e);
        }
        self.host = Some(host);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.scene.detach(host);
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if host.events().has_resize_listeners() {
                    self.scene.handle_resize(host);
                }
            }
            WindowEvent::RedrawRequested => match host.take_frame_request() {
                Some(id) => {
                    self.scene.on_animation_frame(id);
                }
                // Redraw asked for by the system: schedule our own.
                None => {
                    self.scene.request_frame(host);
                }
            },
            WindowEvent::Occluded(false) => {
                self.scene.request_frame(host);
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::KeyboardInput { .. } => {
                if let Some(action) = self.input.handle_event(&event) {
                    self.on_action(action);
                }
            }
            _ => (),
        }
    }
}

fn main() -> Result<(), SceneError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut viewer = Viewer::new();
    event_loop.run_app(&mut viewer)?;

    match viewer.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
