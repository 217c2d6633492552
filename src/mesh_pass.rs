//! Lit, transparent mesh rendering with depth testing.
//!
//! [`MeshPass`] draws glass cards with the physically based shader in
//! `shaders/card.wgsl`. It owns the pipelines and the depth buffer; geometry
//! and material buffers live in the renderer's resource maps.
//!
//! # Architecture
//!
//! The mesh pass uses three bind groups:
//! - **Group 0**: camera uniforms and the light rig
//! - **Group 1**: model uniforms (model matrix, normal matrix), one per draw
//! - **Group 2**: material uniforms, one per material
//!
//! # Double-sided transparency
//!
//! Double-sided materials are drawn twice, back faces first and front faces
//! second, so the near surface of the glass always blends over the far one.

use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::light::LightUniforms;
use crate::material::{MaterialUniforms, Side};
use crate::mesh::{Transform, Vertex3d};
use crate::renderer::RendererOptions;

/// Format of every off-screen target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniforms for 3D rendering.
///
/// ```wgsl
/// struct Camera {
///     view_proj: mat4x4f,
///     position: vec3f,
///     exposure: f32,
///     tone_mapping: u32,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub exposure: f32,
    /// 0 = none, 1 = ACES filmic.
    pub tone_mapping: u32,
    pub _padding: [u32; 3],
}

impl CameraUniforms {
    pub fn new(camera: &PerspectiveCamera, options: &RendererOptions) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            exposure: options.exposure,
            tone_mapping: options.tone_mapping.shader_index(),
            _padding: [0; 3],
        }
    }
}

/// Per-draw model uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space).
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals.
    pub normal_matrix: [[f32; 4]; 4],
}

impl From<&Transform> for ModelUniforms {
    fn from(transform: &Transform) -> Self {
        let model = transform.matrix();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Uploaded vertex and index buffers.
pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// An uploaded material and the bind group that exposes it.
pub struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub side: Side,
}

/// Back-face and front-face pipelines for one color format.
struct SidedPipelines {
    back_faces: wgpu::RenderPipeline,
    front_faces: wgpu::RenderPipeline,
}

/// One mesh to draw: buffers, material and placement.
pub struct MeshDraw<'a> {
    pub geometry: &'a GpuGeometry,
    pub material: &'a GpuMaterial,
    pub transform: Transform,
}

/// Handles card rendering with depth testing.
///
/// # Pipeline configuration
///
/// - Culling chosen per material side
/// - Alpha blending, premultiplied into the target
/// - Depth write and Less-than comparison
pub struct MeshPass {
    to_target: SidedPipelines,
    to_surface: SidedPipelines,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_bind_group_layout: wgpu::BindGroupLayout,
    material_bind_group_layout: wgpu::BindGroupLayout,
    depth_view: Option<wgpu::TextureView>,
    depth_size: (u32, u32),
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl MeshPass {
    /// Creates the card pipelines for off-screen targets and for the
    /// surface format.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Card Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/card.wgsl").into()),
        });

        // Camera + lights (group 0)
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[uniform_entry(0), uniform_entry(1)],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Model (group 1) and material (group 2)
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_entry(0)],
            });
        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[uniform_entry(0)],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Card Pipeline Layout"),
            bind_group_layouts: &[
                &scene_bind_group_layout,
                &model_bind_group_layout,
                &material_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = |format: wgpu::TextureFormat, cull: wgpu::Face, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(cull),
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let to_target = SidedPipelines {
            back_faces: pipeline(TARGET_FORMAT, wgpu::Face::Front, "Card Back Faces"),
            front_faces: pipeline(TARGET_FORMAT, wgpu::Face::Back, "Card Front Faces"),
        };
        let to_surface = SidedPipelines {
            back_faces: pipeline(surface_format, wgpu::Face::Front, "Card Back Faces (Surface)"),
            front_faces: pipeline(surface_format, wgpu::Face::Back, "Card Front Faces (Surface)"),
        };

        Self {
            to_target,
            to_surface,
            camera_buffer,
            light_buffer,
            scene_bind_group,
            model_bind_group_layout,
            material_bind_group_layout,
            depth_view: None,
            depth_size: (0, 0),
        }
    }

    pub fn create_geometry(
        &self,
        device: &wgpu::Device,
        vertices: &[Vertex3d],
        indices: &[u32],
    ) -> GpuGeometry {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuGeometry {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn create_material(
        &self,
        device: &wgpu::Device,
        uniforms: &MaterialUniforms,
        side: Side,
    ) -> GpuMaterial {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniforms"),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        GpuMaterial {
            buffer,
            bind_group,
            side,
        }
    }

    /// Recreates the depth buffer if the destination size changed.
    pub fn ensure_depth_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.depth_view.is_some() && self.depth_size == (width, height) {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_size = (width, height);
    }

    /// Records one pass that clears `target` and draws every mesh into it.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        to_surface: bool,
        clear: [f64; 4],
        camera: &CameraUniforms,
        lights: &LightUniforms,
        draws: &[MeshDraw],
    ) {
        let Some(depth_view) = self.depth_view.as_ref() else {
            return;
        };

        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(lights));

        // One model buffer per draw; a shared buffer would only hold the
        // last write by the time the encoder is submitted.
        let model_bind_groups: Vec<wgpu::BindGroup> = draws
            .iter()
            .map(|draw| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Uniforms"),
                    contents: bytemuck::bytes_of(&ModelUniforms::from(&draw.transform)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Model Bind Group"),
                    layout: &self.model_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                })
            })
            .collect();

        let [r, g, b, a] = clear;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Card Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let pipelines = if to_surface {
            &self.to_surface
        } else {
            &self.to_target
        };
        pass.set_bind_group(0, &self.scene_bind_group, &[]);

        for (draw, model_bind_group) in draws.iter().zip(&model_bind_groups) {
            let (first, second) = match draw.material.side {
                Side::Front => (&pipelines.front_faces, None),
                Side::Back => (&pipelines.back_faces, None),
                Side::Double => (&pipelines.back_faces, Some(&pipelines.front_faces)),
            };
            for pipeline in std::iter::once(first).chain(second) {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, model_bind_group, &[]);
                pass.set_bind_group(2, &draw.material.bind_group, &[]);
                pass.set_vertex_buffer(0, draw.geometry.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    draw.geometry.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..draw.geometry.index_count, 0, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_sizes_match_wgsl_layouts() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 96);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 128);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let transform = Transform::new().scale(glam::Vec3::new(2.0, 1.0, 1.0));
        let uniforms = ModelUniforms::from(&transform);
        assert_relative_eq!(uniforms.normal_matrix[0][0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(uniforms.model[0][0], 2.0, epsilon = 1e-6);
    }
}
