//! A GPU-less renderer and host.
//!
//! [`HeadlessRenderer`] keeps the same resource bookkeeping a real backend
//! does (slot maps of geometries, materials and targets) and records every
//! draw instead of executing it. [`HeadlessHost`] is a fixed-size surface
//! with a manual clock for animation frames. Together they let the whole
//! scene lifecycle run in tests and tools without a window or adapter.
//!
//! A host and the renderers it creates share a [`ReleaseLog`], so teardown
//! order can be read back across both.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use log::{debug, trace};
use slotmap::SlotMap;

use crate::camera::PerspectiveCamera;
use crate::errors::RenderError;
use crate::events::WindowEvents;
use crate::geometry::RawGeometry;
use crate::handles::{FrameRequestId, GeometryId, MaterialId, OutputId, TargetId};
use crate::host::HostSurface;
use crate::material::PhysicalMaterial;
use crate::mesh::Transform;
use crate::renderer::{Effect, RenderDestination, Renderer, RendererOptions};
use crate::scene::Scene;

/// One recorded draw.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawRecord {
    Scene {
        destination: RenderDestination,
        /// Transforms of the meshes drawn, in scene order.
        transforms: Vec<Transform>,
        camera_position: Vec3,
        camera_aspect: f32,
    },
    Effect {
        effect: Effect,
        inputs: Vec<TargetId>,
        destination: RenderDestination,
    },
}

/// A freeing call seen by the headless backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    Frame(FrameRequestId),
    Target(TargetId),
    Geometry(GeometryId),
    Material(MaterialId),
    Renderer,
    Output(OutputId),
}

/// One [`ReleaseLog`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub release: Release,
    /// Resize listeners registered with the host when the call was made.
    pub resize_listeners: usize,
}

/// Release calls in the order they were made, including calls that found
/// nothing left to free.
#[derive(Clone, Debug, Default)]
pub struct ReleaseLog {
    records: Rc<RefCell<Vec<ReleaseRecord>>>,
    events: WindowEvents,
}

impl ReleaseLog {
    /// A log that samples `events` for the resize listener count.
    pub fn new(events: WindowEvents) -> Self {
        Self {
            records: Rc::default(),
            events,
        }
    }

    fn record(&self, release: Release) {
        let resize_listeners = self.events.resize_listener_count();
        self.records.borrow_mut().push(ReleaseRecord {
            release,
            resize_listeners,
        });
    }

    pub fn records(&self) -> Vec<ReleaseRecord> {
        self.records.borrow().clone()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.records.borrow().iter().map(|record| record.release).collect()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

/// A [`Renderer`] that records instead of drawing.
#[derive(Debug)]
pub struct HeadlessRenderer {
    output: OutputId,
    options: RendererOptions,
    size: (u32, u32),
    pixel_ratio: f32,
    geometries: SlotMap<GeometryId, usize>,
    materials: SlotMap<MaterialId, PhysicalMaterial>,
    targets: SlotMap<TargetId, (u32, u32)>,
    material_writes: usize,
    stale_releases: usize,
    in_frame: bool,
    draws: Vec<DrawRecord>,
    frames_presented: usize,
    release_log: ReleaseLog,
    disposed: bool,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::with_options(OutputId::new(0), RendererOptions::default())
    }
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(output: OutputId, options: RendererOptions) -> Self {
        Self {
            output,
            options,
            size: (1, 1),
            pixel_ratio: 1.0,
            geometries: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            targets: SlotMap::with_key(),
            material_writes: 0,
            stale_releases: 0,
            in_frame: false,
            draws: Vec::new(),
            frames_presented: 0,
            release_log: ReleaseLog::default(),
            disposed: false,
        }
    }

    /// Records releases into `log` instead of a private one.
    pub fn with_release_log(mut self, log: ReleaseLog) -> Self {
        self.release_log = log;
        self
    }

    pub fn release_log(&self) -> &ReleaseLog {
        &self.release_log
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Geometries, materials and targets still allocated.
    pub fn live_resources(&self) -> usize {
        self.live_geometries() + self.live_materials() + self.live_targets()
    }

    /// Sizes of every live target.
    pub fn target_sizes(&self) -> Vec<(u32, u32)> {
        self.targets.values().copied().collect()
    }

    pub fn material(&self, id: MaterialId) -> Option<&PhysicalMaterial> {
        self.materials.get(id)
    }

    /// Number of `write_material` calls that hit a live material.
    pub fn material_writes(&self) -> usize {
        self.material_writes
    }

    /// Releases of handles that were already gone while the renderer was live.
    pub fn stale_releases(&self) -> usize {
        self.stale_releases
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// Every draw since creation or the last [`clear_draws`](Self::clear_draws).
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Drops the recorded draws. Counters such as
    /// [`frames_presented`](Self::frames_presented) keep running.
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    pub fn scene_draws(&self) -> usize {
        self.draws
            .iter()
            .filter(|draw| matches!(draw, DrawRecord::Scene { .. }))
            .count()
    }

    /// Effect stages in the order they ran.
    pub fn effects(&self) -> Vec<Effect> {
        self.draws
            .iter()
            .filter_map(|draw| match draw {
                DrawRecord::Effect { effect, .. } => Some(*effect),
                DrawRecord::Scene { .. } => None,
            })
            .collect()
    }

    /// Mesh transforms from the most recent scene draw.
    pub fn last_scene_transforms(&self) -> Option<&[Transform]> {
        self.draws.iter().rev().find_map(|draw| match draw {
            DrawRecord::Scene { transforms, .. } => Some(transforms.as_slice()),
            DrawRecord::Effect { .. } => None,
        })
    }

    /// Camera aspect from the most recent scene draw.
    pub fn last_camera_aspect(&self) -> Option<f32> {
        self.draws.iter().rev().find_map(|draw| match draw {
            DrawRecord::Scene { camera_aspect, .. } => Some(*camera_aspect),
            DrawRecord::Effect { .. } => None,
        })
    }

    fn stale(&mut self, kind: &str) -> bool {
        self.stale_releases += 1;
        debug!("release of unknown {kind} ignored");
        false
    }
}

impl Renderer for HeadlessRenderer {
    fn output(&self) -> OutputId {
        self.output
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if !self.disposed {
            self.size = (width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if !self.disposed {
            self.pixel_ratio = ratio;
        }
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_geometry(&mut self, geometry: &RawGeometry) -> GeometryId {
        if self.disposed {
            return GeometryId::default();
        }
        self.geometries.insert(geometry.vertex_count())
    }

    fn release_geometry(&mut self, id: GeometryId) -> bool {
        self.release_log.record(Release::Geometry(id));
        if self.disposed {
            return false;
        }
        self.geometries.remove(id).is_some() || self.stale("geometry")
    }

    fn create_material(&mut self, material: &PhysicalMaterial) -> MaterialId {
        if self.disposed {
            return MaterialId::default();
        }
        self.materials.insert(*material)
    }

    fn write_material(&mut self, id: MaterialId, material: &PhysicalMaterial) {
        if let Some(slot) = self.materials.get_mut(id) {
            *slot = *material;
            self.material_writes += 1;
        }
    }

    fn release_material(&mut self, id: MaterialId) -> bool {
        self.release_log.record(Release::Material(id));
        if self.disposed {
            return false;
        }
        self.materials.remove(id).is_some() || self.stale("material")
    }

    fn create_render_target(&mut self, width: u32, height: u32, label: &str) -> TargetId {
        if self.disposed {
            return TargetId::default();
        }
        trace!("target {label:?} {width}x{height}");
        self.targets.insert((width, height))
    }

    fn resize_render_target(&mut self, id: TargetId, width: u32, height: u32) {
        if let Some(size) = self.targets.get_mut(id) {
            *size = (width, height);
        }
    }

    fn release_render_target(&mut self, id: TargetId) -> bool {
        self.release_log.record(Release::Target(id));
        if self.disposed {
            return false;
        }
        self.targets.remove(id).is_some() || self.stale("render target")
    }

    fn begin_frame(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.in_frame = true;
        true
    }

    fn draw_scene(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        destination: RenderDestination,
    ) {
        if !self.in_frame {
            return;
        }
        self.draws.push(DrawRecord::Scene {
            destination,
            transforms: scene.meshes.iter().map(|mesh| mesh.transform).collect(),
            camera_position: camera.position,
            camera_aspect: camera.aspect,
        });
    }

    fn draw_effect(&mut self, effect: Effect, inputs: &[TargetId], destination: RenderDestination) {
        if !self.in_frame {
            return;
        }
        self.draws.push(DrawRecord::Effect {
            effect,
            inputs: inputs.to_vec(),
            destination,
        });
    }

    fn end_frame(&mut self) {
        if std::mem::take(&mut self.in_frame) {
            self.frames_presented += 1;
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.release_log.record(Release::Renderer);
        self.geometries.clear();
        self.materials.clear();
        self.targets.clear();
        self.in_frame = false;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// An in-memory [`HostSurface`].
///
/// Animation frames never fire by themselves; read
/// [`pending_frames`](Self::pending_frames) and hand an id to the scene to
/// simulate the callback.
#[derive(Debug)]
pub struct HeadlessHost {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
    events: WindowEvents,
    release_log: ReleaseLog,
    outputs: Vec<OutputId>,
    pending_frames: Vec<FrameRequestId>,
    next_id: u64,
    fail_renderer: bool,
    renderers_created: usize,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        let events = WindowEvents::new();
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
            release_log: ReleaseLog::new(events.clone()),
            events,
            outputs: Vec::new(),
            pending_frames: Vec::new(),
            next_id: 1,
            fail_renderer: false,
            renderers_created: 0,
        }
    }

    /// A host whose renderer creation always fails.
    pub fn failing(width: u32, height: u32) -> Self {
        Self {
            fail_renderer: true,
            ..Self::new(width, height)
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Changes the client size. Returns whether anyone is listening for it.
    pub fn set_client_size(&mut self, width: u32, height: u32) -> bool {
        self.width = width;
        self.height = height;
        self.events.has_resize_listeners()
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
    }

    /// Outputs currently shown, in append order.
    pub fn outputs(&self) -> &[OutputId] {
        &self.outputs
    }

    pub fn pending_frames(&self) -> &[FrameRequestId] {
        &self.pending_frames
    }

    /// Removes and returns the oldest pending frame request, as if the
    /// frame callback were about to run.
    pub fn fire_frame(&mut self) -> Option<FrameRequestId> {
        (!self.pending_frames.is_empty()).then(|| self.pending_frames.remove(0))
    }

    pub fn renderers_created(&self) -> usize {
        self.renderers_created
    }

    /// Releases made through this host and the renderers it created.
    pub fn release_log(&self) -> &ReleaseLog {
        &self.release_log
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl HostSurface for HeadlessHost {
    type Renderer = HeadlessRenderer;

    fn client_width(&self) -> u32 {
        self.width
    }

    fn client_height(&self) -> u32 {
        self.height
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn create_renderer(&mut self, options: &RendererOptions) -> Result<HeadlessRenderer, RenderError> {
        if self.fail_renderer {
            return Err(RenderError::Unavailable(
                "headless host has no renderer".to_string(),
            ));
        }
        self.renderers_created += 1;
        let output = OutputId::new(self.next_id());
        Ok(HeadlessRenderer::with_options(output, *options)
            .with_release_log(self.release_log.clone()))
    }

    fn append_output(&mut self, output: OutputId) {
        self.outputs.push(output);
    }

    fn remove_output(&mut self, output: OutputId) {
        self.release_log.record(Release::Output(output));
        self.outputs.retain(|&o| o != output);
    }

    fn request_animation_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId::new(self.next_id());
        self.pending_frames.push(id);
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameRequestId) {
        self.release_log.record(Release::Frame(id));
        self.pending_frames.retain(|&pending| pending != id);
    }

    fn events(&self) -> &WindowEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handles_release_once() {
        let mut renderer = HeadlessRenderer::new();
        let id = renderer.create_geometry(&RawGeometry::rounded_box(1.0, 1.0, 1.0, 1, 0.1));
        assert!(renderer.release_geometry(id));
        assert!(!renderer.release_geometry(id));
        assert_eq!(renderer.stale_releases(), 1);
    }

    #[test]
    fn dispose_frees_everything_and_silences_calls() {
        let mut renderer = HeadlessRenderer::new();
        let material = renderer.create_material(&PhysicalMaterial::default());
        renderer.create_render_target(4, 4, "t");

        renderer.dispose();
        renderer.dispose();

        assert_eq!(renderer.live_resources(), 0);
        assert!(!renderer.release_material(material));
        assert!(!renderer.begin_frame());
        assert_eq!(renderer.stale_releases(), 0);
    }

    #[test]
    fn draws_outside_a_frame_are_dropped() {
        let mut renderer = HeadlessRenderer::new();
        renderer.draw_effect(Effect::SmaaEdges, &[], RenderDestination::Screen);
        renderer.end_frame();
        assert!(renderer.draws().is_empty());
        assert_eq!(renderer.frames_presented(), 0);
    }

    #[test]
    fn clear_draws_keeps_counters() {
        let mut renderer = HeadlessRenderer::new();
        let target = renderer.create_render_target(4, 4, "t");
        assert!(renderer.begin_frame());
        renderer.draw_effect(Effect::SmaaEdges, &[target], RenderDestination::Screen);
        renderer.end_frame();

        renderer.clear_draws();
        assert!(renderer.draws().is_empty());
        assert!(renderer.effects().is_empty());
        assert_eq!(renderer.frames_presented(), 1);
        assert_eq!(renderer.live_targets(), 1);
    }

    #[test]
    fn release_log_keeps_calls_made_after_dispose() {
        let mut renderer = HeadlessRenderer::new();
        let geometry = renderer.create_geometry(&RawGeometry::rounded_box(1.0, 1.0, 1.0, 1, 0.1));

        renderer.dispose();
        renderer.dispose();
        assert!(!renderer.release_geometry(geometry));

        assert_eq!(
            renderer.release_log().releases(),
            vec![Release::Renderer, Release::Geometry(geometry)]
        );
    }

    #[test]
    fn host_log_samples_resize_listeners() {
        let mut host = HeadlessHost::new(10, 10);
        let subscription = host.events().subscribe_resize();
        host.remove_output(OutputId::new(7));
        drop(subscription);
        host.remove_output(OutputId::new(8));

        let listeners: Vec<usize> = host
            .release_log()
            .records()
            .iter()
            .map(|record| record.resize_listeners)
            .collect();
        assert_eq!(listeners, vec![1, 0]);
    }

    #[test]
    fn host_frames_can_be_cancelled() {
        let mut host = HeadlessHost::new(10, 10);
        let first = host.request_animation_frame();
        let second = host.request_animation_frame();
        host.cancel_animation_frame(first);
        assert_eq!(host.pending_frames(), &[second]);
        assert_eq!(host.fire_frame(), Some(second));
        assert_eq!(host.fire_frame(), None);
    }

    #[test]
    fn failing_host_creates_no_renderer() {
        let mut host = HeadlessHost::failing(10, 10);
        assert!(host.create_renderer(&RendererOptions::default()).is_err());
        assert_eq!(host.renderers_created(), 0);
    }
}
