//! The wgpu implementation of [`Renderer`].
//!
//! [`GpuRenderer`] turns the backend-neutral draw calls into render passes:
//! [`draw_scene`](Renderer::draw_scene) goes through the [`MeshPass`] and
//! [`draw_effect`](Renderer::draw_effect) through the [`EffectPass`]. All
//! passes of one frame are recorded into a single encoder that
//! [`end_frame`](Renderer::end_frame) submits before presenting.

use log::{debug, error, trace, warn};
use slotmap::SlotMap;

use crate::camera::PerspectiveCamera;
use crate::effect_pass::{EffectOutput, EffectPass};
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::handles::{GeometryId, MaterialId, OutputId, TargetId};
use crate::material::PhysicalMaterial;
use crate::mesh_pass::{
    CameraUniforms, GpuGeometry, GpuMaterial, MeshDraw, MeshPass, TARGET_FORMAT,
};
use crate::renderer::{scaled_size, Effect, RenderDestination, Renderer, RendererOptions};
use crate::scene::Scene;

/// An off-screen color target.
struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

fn create_target(device: &wgpu::Device, width: u32, height: u32, label: &str) -> GpuTarget {
    let (width, height) = (width.max(1), height.max(1));
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTarget {
        texture,
        view,
        width,
        height,
    }
}

/// Logical output size and pixel ratio, kept as one value so the surface is
/// only ever configured at their product.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    size: (u32, u32),
    pixel_ratio: f32,
}

impl Viewport {
    fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            size: (width, height),
            pixel_ratio,
        }
    }

    /// Surface size in physical pixels.
    fn physical(&self) -> (u32, u32) {
        scaled_size(self.size.0, self.size.1, self.pixel_ratio)
    }

    /// Applies a change and returns the new physical size, or `None` when the
    /// physical size stays the same.
    fn update(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Option<(u32, u32)> {
        let before = self.physical();
        *self = Self::new(width, height, pixel_ratio);
        let after = self.physical();
        (after != before).then_some(after)
    }
}

/// The frame being recorded.
struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// Everything that goes away on dispose.
struct GpuState {
    gpu: GpuContext,
    mesh_pass: MeshPass,
    effect_pass: EffectPass,
    geometries: SlotMap<GeometryId, GpuGeometry>,
    materials: SlotMap<MaterialId, GpuMaterial>,
    targets: SlotMap<TargetId, GpuTarget>,
    frame: Option<Frame>,
}

/// A [`Renderer`] drawing into a window surface.
pub struct GpuRenderer {
    output: OutputId,
    options: RendererOptions,
    viewport: Viewport,
    state: Option<GpuState>,
}

impl GpuRenderer {
    /// Wraps a context whose surface shows `size` logical pixels at
    /// `pixel_ratio`.
    pub fn new(
        gpu: GpuContext,
        output: OutputId,
        options: RendererOptions,
        size: (u32, u32),
        pixel_ratio: f32,
    ) -> Self {
        let mesh_pass = MeshPass::new(&gpu.device, gpu.format());
        let effect_pass = EffectPass::new(&gpu.device, gpu.format());
        let viewport = Viewport::new(size.0, size.1, pixel_ratio);
        let mut renderer = Self {
            output,
            options,
            viewport,
            state: Some(GpuState {
                gpu,
                mesh_pass,
                effect_pass,
                geometries: SlotMap::with_key(),
                materials: SlotMap::with_key(),
                targets: SlotMap::with_key(),
                frame: None,
            }),
        };
        renderer.configure_surface(viewport.physical());
        renderer
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// The GPU context, until the renderer is disposed.
    pub fn gpu(&self) -> Option<&GpuContext> {
        self.state.as_ref().map(|state| &state.gpu)
    }

    fn resize_viewport(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        if let Some(physical) = self.viewport.update(width, height, pixel_ratio) {
            self.configure_surface(physical);
        }
    }

    fn configure_surface(&mut self, (width, height): (u32, u32)) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if (state.gpu.width(), state.gpu.height()) != (width, height) {
            debug!("surface {width}x{height}");
            state.gpu.resize(width, height);
        }
    }
}

impl Renderer for GpuRenderer {
    fn output(&self) -> OutputId {
        self.output
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.resize_viewport(width, height, self.viewport.pixel_ratio);
    }

    fn size(&self) -> (u32, u32) {
        self.viewport.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        let (width, height) = self.viewport.size;
        self.resize_viewport(width, height, ratio);
    }

    fn pixel_ratio(&self) -> f32 {
        self.viewport.pixel_ratio
    }

    fn set_size_and_pixel_ratio(&mut self, width: u32, height: u32, ratio: f32) {
        self.resize_viewport(width, height, ratio);
    }

    fn create_geometry(&mut self, geometry: &RawGeometry) -> GeometryId {
        let Some(state) = self.state.as_mut() else {
            return GeometryId::default();
        };
        let uploaded =
            state
                .mesh_pass
                .create_geometry(&state.gpu.device, &geometry.vertices, &geometry.indices);
        state.geometries.insert(uploaded)
    }

    fn release_geometry(&mut self, id: GeometryId) -> bool {
        self.state
            .as_mut()
            .is_some_and(|state| state.geometries.remove(id).is_some())
    }

    fn create_material(&mut self, material: &PhysicalMaterial) -> MaterialId {
        let Some(state) = self.state.as_mut() else {
            return MaterialId::default();
        };
        let uploaded =
            state
                .mesh_pass
                .create_material(&state.gpu.device, &material.uniforms(), material.side);
        state.materials.insert(uploaded)
    }

    fn write_material(&mut self, id: MaterialId, material: &PhysicalMaterial) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Some(uploaded) = state.materials.get_mut(id) {
            state.gpu.queue.write_buffer(
                &uploaded.buffer,
                0,
                bytemuck::bytes_of(&material.uniforms()),
            );
            uploaded.side = material.side;
        }
    }

    fn release_material(&mut self, id: MaterialId) -> bool {
        self.state
            .as_mut()
            .is_some_and(|state| state.materials.remove(id).is_some())
    }

    fn create_render_target(&mut self, width: u32, height: u32, label: &str) -> TargetId {
        let Some(state) = self.state.as_mut() else {
            return TargetId::default();
        };
        trace!("target {label:?} {width}x{height}");
        let target = create_target(&state.gpu.device, width, height, label);
        state.targets.insert(target)
    }

    fn resize_render_target(&mut self, id: TargetId, width: u32, height: u32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let Some(target) = state.targets.get_mut(id) else {
            return;
        };
        if (target.width, target.height) == (width.max(1), height.max(1)) {
            return;
        }
        target.texture.destroy();
        *target = create_target(&state.gpu.device, width, height, "Resized Target");
    }

    fn release_render_target(&mut self, id: TargetId) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        match state.targets.remove(id) {
            Some(target) => {
                target.texture.destroy();
                true
            }
            None => false,
        }
    }

    fn begin_frame(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.frame.is_some() {
            return true;
        }

        let surface_texture = match state.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                debug!("surface lost, reconfiguring");
                state.gpu.reconfigure();
                return false;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of memory acquiring the surface texture");
                return false;
            }
            Err(e) => {
                warn!("skipping frame: {e}");
                return false;
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = state
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        state.frame = Some(Frame {
            surface_texture,
            view,
            encoder,
        });
        true
    }

    fn draw_scene(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        destination: RenderDestination,
    ) {
        let options = self.options;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let GpuState {
            gpu,
            mesh_pass,
            geometries,
            materials,
            targets,
            frame,
            ..
        } = state;
        let Some(frame) = frame.as_mut() else {
            return;
        };

        let (view, width, height, to_surface) = match destination {
            RenderDestination::Screen => (&frame.view, gpu.width(), gpu.height(), true),
            RenderDestination::Target(id) => match targets.get(id) {
                Some(target) => (&target.view, target.width, target.height, false),
                None => {
                    warn!("scene draw into a released target skipped");
                    return;
                }
            },
        };

        let draws: Vec<MeshDraw> = scene
            .meshes
            .iter()
            .filter_map(|mesh| {
                Some(MeshDraw {
                    geometry: geometries.get(mesh.geometry)?,
                    material: materials.get(mesh.material)?,
                    transform: mesh.transform,
                })
            })
            .collect();

        mesh_pass.ensure_depth_size(&gpu.device, width, height);
        mesh_pass.render(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            view,
            to_surface,
            options.clear_color(),
            &CameraUniforms::new(camera, &options),
            &scene.lights.uniforms(),
            &draws,
        );
    }

    fn draw_effect(&mut self, effect: Effect, inputs: &[TargetId], destination: RenderDestination) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let GpuState {
            gpu,
            effect_pass,
            targets,
            frame,
            ..
        } = state;
        let Some(frame) = frame.as_mut() else {
            return;
        };

        let input_views: Vec<&wgpu::TextureView> = inputs
            .iter()
            .filter_map(|id| targets.get(*id).map(|target| &target.view))
            .collect();
        let (input_a, input_b) = match input_views.as_slice() {
            [a] => (*a, *a),
            [a, b, ..] => (*a, *b),
            [] => {
                warn!("{} has no live inputs", effect.label());
                return;
            }
        };

        let output = match destination {
            RenderDestination::Screen => EffectOutput {
                view: &frame.view,
                to_surface: true,
                width: gpu.width(),
                height: gpu.height(),
            },
            RenderDestination::Target(id) => match targets.get(id) {
                Some(target) => EffectOutput {
                    view: &target.view,
                    to_surface: false,
                    width: target.width,
                    height: target.height,
                },
                None => {
                    warn!("{} into a released target skipped", effect.label());
                    return;
                }
            },
        };

        effect_pass.render(
            &gpu.device,
            &mut frame.encoder,
            effect,
            input_a,
            input_b,
            output,
        );
    }

    fn end_frame(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Some(frame) = state.frame.take() {
            state.gpu.queue.submit(Some(frame.encoder.finish()));
            frame.surface_texture.present();
        }
    }

    fn dispose(&mut self) {
        if let Some(state) = self.state.take() {
            for (_, target) in state.targets {
                target.texture.destroy();
            }
            debug!("gpu renderer disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_is_logical_size_times_ratio() {
        let viewport = Viewport::new(1024, 768, 3.0);
        assert_eq!(viewport.size, (1024, 768));
        assert_eq!(viewport.physical(), (3072, 2304));
    }

    #[test]
    fn combined_update_reports_one_physical_size() {
        let mut viewport = Viewport::new(1024, 768, 1.0);
        assert_eq!(viewport.update(1024, 768, 3.0), Some((3072, 2304)));
        assert_eq!(viewport.update(1024, 768, 3.0), None);
        assert_eq!(viewport.update(800, 600, 2.0), Some((1600, 1200)));
    }

    #[test]
    fn high_dpi_startup_stays_within_texture_limits() {
        // The window reports 1024x768 logical at scale 3. Re-applying the same
        // values during attach must not reach the 8192 texture limit.
        let mut viewport = Viewport::new(1024, 768, 3.0);
        assert_eq!(viewport.update(1024, 768, 3.0), None);
        let (width, height) = viewport.physical();
        assert!(width.max(height) <= wgpu::Limits::default().max_texture_dimension_2d);
    }

    #[test]
    fn change_that_keeps_physical_size_is_skipped() {
        let mut viewport = Viewport::new(800, 600, 2.0);
        assert_eq!(viewport.update(1600, 1200, 1.0), None);
        assert_eq!(viewport.size, (1600, 1200));
    }
}
