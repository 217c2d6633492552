//! Scene lifecycle: attach to a host, render on demand, tear down.
//!
//! [`SceneLifecycle`] owns everything a mounted card scene needs (camera,
//! renderer, lights, the card and the post-processing pipeline) and moves
//! through three states:
//!
//! ```text
//!  Unattached ──attach()──▶ Attached ──detach()──▶ Detached
//!                              │ ▲
//!          set_rotation() /    │ │  exactly one render
//!          handle_resize()     └─┘  per update
//! ```
//!
//! Nothing renders continuously. A frame is produced on attach, on each
//! rotation update, on each resize, and when a requested animation frame
//! fires. Calls that arrive while the scene is not attached are ignored,
//! except [`set_rotation`](SceneLifecycle::set_rotation), whose value is kept
//! and used by the next attach.

use log::{debug, info, warn};

use crate::camera::PerspectiveCamera;
use crate::card::CardEntity;
use crate::config::{CardConfig, SceneConfig};
use crate::errors::Result;
use crate::events::ResizeSubscription;
use crate::handles::{FrameRequestId, OutputId};
use crate::host::HostSurface;
use crate::light::LightRig;
use crate::post_process::PostProcessing;
use crate::renderer::Renderer;
use crate::rotation::RotationDegrees;
use crate::scene::Scene;

/// Where a [`SceneLifecycle`] is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Unattached,
    Attached,
    /// Terminal. Every resource has been released.
    Detached,
}

/// Resources that only exist while attached.
struct AttachedScene<R: Renderer> {
    camera: PerspectiveCamera,
    renderer: R,
    lights: LightRig,
    card: CardEntity,
    pipeline: PostProcessing,
    resize: Option<ResizeSubscription>,
    pending_frame: Option<FrameRequestId>,
    output: OutputId,
}

impl<R: Renderer> AttachedScene<R> {
    fn render(&mut self) -> bool {
        let scene = Scene::new(&self.lights).with_mesh(self.card.mesh());
        self.pipeline.render(&mut self.renderer, &scene, &self.camera)
    }

    /// Releases GPU resources in dependency order. The resize guard and
    /// pending frame are handled by the caller, who holds the host.
    fn release(&mut self) {
        self.pipeline.dispose(&mut self.renderer);
        self.renderer.dispose();
        self.card.dispose(&mut self.renderer);
    }
}

/// Owns a mounted glass-card scene.
///
/// ```
/// use glasscard::{CardCatalog, HeadlessHost, RotationDegrees, SceneConfig, SceneLifecycle};
///
/// let mut host = HeadlessHost::new(800, 600);
/// let mut scene = SceneLifecycle::new(CardCatalog::base_card(), SceneConfig::default());
///
/// scene.attach(&mut host).unwrap();
/// scene.set_rotation(RotationDegrees::new(30.0, -10.0, 5.0));
/// assert_eq!(scene.frames_rendered(), 2);
///
/// scene.detach(&mut host);
/// assert!(host.outputs().is_empty());
/// ```
pub struct SceneLifecycle<R: Renderer> {
    config: SceneConfig,
    base_card: CardConfig,
    rotation: RotationDegrees,
    state: LifecycleState,
    scene: Option<AttachedScene<R>>,
    frames_rendered: usize,
}

impl<R: Renderer> SceneLifecycle<R> {
    /// Creates an unattached lifecycle. The rotation state starts at the
    /// base card's rotation.
    pub fn new(base_card: CardConfig, config: SceneConfig) -> Self {
        Self {
            rotation: base_card.rotation,
            config,
            base_card,
            state: LifecycleState::Unattached,
            scene: None,
            frames_rendered: 0,
        }
    }

    /// Builds the scene on `host`, renders one frame, then starts listening
    /// for resizes.
    ///
    /// Only renderer creation can fail; nothing has been appended to the host
    /// or subscribed when it does. Attaching an attached or detached scene
    /// does nothing.
    pub fn attach<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: HostSurface<Renderer = R>,
    {
        if self.state != LifecycleState::Unattached {
            debug!("attach ignored in state {:?}", self.state);
            return Ok(());
        }

        let width = host.client_width();
        let height = host.client_height();
        let pixel_ratio = host.device_pixel_ratio();
        let aspect = host.aspect().unwrap_or(1.0);

        let camera = PerspectiveCamera::from_settings(&self.config.camera, aspect);

        let mut renderer = host.create_renderer(&self.config.renderer)?;
        renderer.set_size_and_pixel_ratio(width, height, pixel_ratio);
        let output = renderer.output();
        host.append_output(output);

        let pipeline = PostProcessing::new(&mut renderer, width, height, pixel_ratio);
        let card = CardEntity::new(&mut renderer, self.base_card.with_rotation(self.rotation));
        let lights = LightRig::from(&self.config.lights);

        let mut scene = AttachedScene {
            camera,
            renderer,
            lights,
            card,
            pipeline,
            resize: None,
            pending_frame: None,
            output,
        };
        if scene.render() {
            self.frames_rendered += 1;
        }
        scene.resize = Some(host.events().subscribe_resize());

        self.scene = Some(scene);
        self.state = LifecycleState::Attached;
        info!("scene attached at {width}x{height} @{pixel_ratio}");
        Ok(())
    }

    /// Records `rotation` and, when attached, applies it to the card and
    /// renders exactly one frame.
    ///
    /// The angles are used as given; clamping is the control surface's job.
    pub fn set_rotation(&mut self, rotation: RotationDegrees) {
        self.rotation = rotation;
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.card.set_rotation(rotation.x, rotation.y, rotation.z);
        if scene.render() {
            self.frames_rendered += 1;
        }
    }

    /// Re-projects for the host's current size and renders one frame.
    ///
    /// Only acts while the resize subscription is live. A host with zero
    /// height is skipped rather than producing a degenerate projection.
    ///
    /// The host must be of the kind the scene was attached to:
    ///
    /// ```compile_fail
    /// use glasscard::{CardCatalog, GpuRenderer, HeadlessHost, SceneConfig, SceneLifecycle};
    ///
    /// let host = HeadlessHost::new(800, 600);
    /// let mut scene =
    ///     SceneLifecycle::<GpuRenderer>::new(CardCatalog::base_card(), SceneConfig::new());
    /// scene.handle_resize(&host);
    /// ```
    pub fn handle_resize<H>(&mut self, host: &H)
    where
        H: HostSurface<Renderer = R>,
    {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if !scene.resize.as_ref().is_some_and(ResizeSubscription::is_active) {
            return;
        }
        let Some(aspect) = host.aspect() else {
            debug!("resize to zero height ignored");
            return;
        };

        let width = host.client_width();
        let height = host.client_height();
        let pixel_ratio = host.device_pixel_ratio();

        scene.camera.aspect = aspect;
        scene.camera.update_projection_matrix();
        scene.renderer.set_size_and_pixel_ratio(width, height, pixel_ratio);
        scene.pipeline.resize(&mut scene.renderer, width, height, pixel_ratio);

        if scene.render() {
            self.frames_rendered += 1;
        }
        debug!("resized to {width}x{height} (aspect {aspect:.3})");
    }

    /// Asks the host for one animation frame. At most one request is
    /// outstanding; asking again returns the pending id.
    pub fn request_frame<H>(&mut self, host: &mut H) -> Option<FrameRequestId>
    where
        H: HostSurface<Renderer = R>,
    {
        let scene = self.scene.as_mut()?;
        let id = *scene
            .pending_frame
            .get_or_insert_with(|| host.request_animation_frame());
        Some(id)
    }

    /// Frame callback: renders once if `id` is the pending request.
    pub fn on_animation_frame(&mut self, id: FrameRequestId) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        if scene.pending_frame != Some(id) {
            return false;
        }
        scene.pending_frame = None;
        let rendered = scene.render();
        if rendered {
            self.frames_rendered += 1;
        }
        rendered
    }

    /// Tears the scene down.
    ///
    /// In order: unsubscribe from resize, cancel any pending frame, dispose
    /// the pipeline, the renderer and the card, then remove the output from
    /// the host. A second call does nothing.
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: HostSurface<Renderer = R>,
    {
        let Some(mut scene) = self.scene.take() else {
            return;
        };

        if let Some(mut subscription) = scene.resize.take() {
            subscription.cancel();
        }
        if let Some(id) = scene.pending_frame.take() {
            host.cancel_animation_frame(id);
        }
        scene.release();
        host.remove_output(scene.output);

        self.state = LifecycleState::Detached;
        info!("scene detached after {} frames", self.frames_rendered);
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == LifecycleState::Attached
    }

    /// The current rotation, for mirroring into a control surface.
    pub fn rotation(&self) -> RotationDegrees {
        self.rotation
    }

    pub fn base_card(&self) -> &CardConfig {
        &self.base_card
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.scene.as_ref().map(|scene| &scene.camera)
    }

    pub fn card(&self) -> Option<&CardEntity> {
        self.scene.as_ref().map(|scene| &scene.card)
    }

    pub fn renderer(&self) -> Option<&R> {
        self.scene.as_ref().map(|scene| &scene.renderer)
    }

    pub fn pipeline(&self) -> Option<&PostProcessing> {
        self.scene.as_ref().map(|scene| &scene.pipeline)
    }

    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.scene.as_ref().and_then(|scene| scene.pending_frame)
    }

    /// Frames produced since creation.
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }
}

impl<R: Renderer> Drop for SceneLifecycle<R> {
    fn drop(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            warn!("scene dropped while attached; releasing resources without a host");
            scene.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_data::CardCatalog;
    use crate::headless::{HeadlessHost, HeadlessRenderer};

    fn lifecycle() -> SceneLifecycle<HeadlessRenderer> {
        SceneLifecycle::new(CardCatalog::base_card(), SceneConfig::default())
    }

    #[test]
    fn starts_unattached_with_base_rotation() {
        let scene = lifecycle();
        assert_eq!(scene.state(), LifecycleState::Unattached);
        assert_eq!(scene.rotation(), RotationDegrees::new(-43.0, 14.0, 33.0));
        assert!(scene.camera().is_none());
    }

    #[test]
    fn operations_before_attach_are_silent() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();

        scene.handle_resize(&host);
        assert_eq!(scene.request_frame(&mut host), None);
        assert!(!scene.on_animation_frame(FrameRequestId::new(1)));
        scene.detach(&mut host);

        assert_eq!(scene.state(), LifecycleState::Unattached);
        assert_eq!(scene.frames_rendered(), 0);
    }

    #[test]
    fn rotation_set_while_unattached_is_used_on_attach() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();

        scene.set_rotation(RotationDegrees::new(10.0, 20.0, 30.0));
        assert_eq!(scene.frames_rendered(), 0);

        scene.attach(&mut host).unwrap();
        let rotation = scene.card().unwrap().mesh().transform.rotation;
        assert_eq!(rotation, RotationDegrees::new(10.0, 20.0, 30.0).to_radians());
        scene.detach(&mut host);
    }

    #[test]
    fn camera_follows_settings_and_host_aspect() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();

        let camera = scene.camera().unwrap();
        assert_eq!(camera.fov, 50.0);
        assert_eq!((camera.near, camera.far), (0.1, 1000.0));
        assert_eq!(camera.position.z, 6.0);
        assert_eq!(camera.aspect, 800.0 / 600.0);
        scene.detach(&mut host);
    }

    #[test]
    fn renderer_gets_host_size_and_pixel_ratio() {
        let mut host = HeadlessHost::new(800, 600).with_pixel_ratio(2.0);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();

        let renderer = scene.renderer().unwrap();
        assert_eq!(renderer.size(), (800, 600));
        assert_eq!(renderer.drawing_buffer_size(), (1600, 1200));
        assert_eq!(scene.pipeline().unwrap().resolution(), (1600, 1200));
        scene.detach(&mut host);
    }

    #[test]
    fn second_attach_is_ignored() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();
        scene.attach(&mut host).unwrap();

        assert_eq!(host.renderers_created(), 1);
        assert_eq!(host.outputs().len(), 1);
        assert_eq!(host.events().resize_listener_count(), 1);
        scene.detach(&mut host);
    }

    #[test]
    fn zero_height_resize_is_skipped() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();

        host.set_client_size(800, 0);
        scene.handle_resize(&host);

        assert_eq!(scene.frames_rendered(), 1);
        assert_eq!(scene.camera().unwrap().aspect, 800.0 / 600.0);
        scene.detach(&mut host);
    }

    #[test]
    fn frame_requests_coalesce_and_render_once() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();

        let first = scene.request_frame(&mut host).unwrap();
        let again = scene.request_frame(&mut host).unwrap();
        assert_eq!(first, again);
        assert_eq!(host.pending_frames().len(), 1);

        let fired = host.fire_frame().unwrap();
        assert!(scene.on_animation_frame(fired));
        assert!(!scene.on_animation_frame(fired));
        assert_eq!(scene.frames_rendered(), 2);
        scene.detach(&mut host);
    }

    #[test]
    fn detach_cancels_pending_frame() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();
        let id = scene.request_frame(&mut host).unwrap();

        scene.detach(&mut host);

        assert!(host.pending_frames().is_empty());
        assert!(!scene.on_animation_frame(id));
        assert_eq!(scene.frames_rendered(), 1);
    }

    #[test]
    fn detached_scene_cannot_reattach() {
        let mut host = HeadlessHost::new(800, 600);
        let mut scene = lifecycle();
        scene.attach(&mut host).unwrap();
        scene.detach(&mut host);

        scene.attach(&mut host).unwrap();
        assert_eq!(scene.state(), LifecycleState::Detached);
        assert_eq!(host.renderers_created(), 1);
        assert!(host.outputs().is_empty());
    }
}
