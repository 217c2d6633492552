//! Fullscreen effect passes for the anti-aliasing chain.
//!
//! [`EffectPass`] owns one pipeline per [`Effect`] stage and per output
//! format. Each stage renders a single triangle covering the destination and
//! samples up to two input textures.
//!
//! # Shader interface
//!
//! Every stage shader sees the same bind group:
//!
//! ```wgsl
//! struct Uniforms {
//!     resolution: vec2f,
//!     texel: vec2f,
//! }
//! @group(0) @binding(0) var<uniform> u: Uniforms;
//! @group(0) @binding(1) var input_a: texture_2d<f32>;
//! @group(0) @binding(2) var input_b: texture_2d<f32>;
//! @group(0) @binding(3) var input_sampler: sampler;
//! ```
//!
//! Stages with a single input get the same view bound to both slots.

use wgpu::util::DeviceExt;

use crate::mesh_pass::TARGET_FORMAT;
use crate::renderer::Effect;

/// Uniforms shared by every stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniforms {
    /// Destination size in pixels `[width, height]`.
    pub resolution: [f32; 2],
    /// Size of one pixel in UV units.
    pub texel: [f32; 2],
}

impl EffectUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            resolution: [w, h],
            texel: [1.0 / w, 1.0 / h],
        }
    }
}

fn shader_source(effect: Effect) -> &'static str {
    match effect {
        Effect::SmaaEdges => include_str!("shaders/smaa_edges.wgsl"),
        Effect::SmaaWeights => include_str!("shaders/smaa_weights.wgsl"),
        Effect::SmaaBlend => include_str!("shaders/smaa_blend.wgsl"),
    }
}

fn stage_index(effect: Effect) -> usize {
    match effect {
        Effect::SmaaEdges => 0,
        Effect::SmaaWeights => 1,
        Effect::SmaaBlend => 2,
    }
}

struct StagePipelines {
    to_target: wgpu::RenderPipeline,
    to_surface: wgpu::RenderPipeline,
}

/// The destination of one effect draw.
pub struct EffectOutput<'a> {
    pub view: &'a wgpu::TextureView,
    pub to_surface: bool,
    pub width: u32,
    pub height: u32,
}

/// Fullscreen pipelines for every [`Effect`].
pub struct EffectPass {
    stages: [StagePipelines; 3],
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl EffectPass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Effect Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Effect Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Effect Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let stage = |effect: Effect| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(effect.label()),
                source: wgpu::ShaderSource::Wgsl(shader_source(effect).into()),
            });
            let pipeline = |format: wgpu::TextureFormat| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(effect.label()),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs"),
                        buffers: &[],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            };
            StagePipelines {
                to_target: pipeline(TARGET_FORMAT),
                to_surface: pipeline(surface_format),
            }
        };

        Self {
            stages: [
                stage(Effect::SmaaEdges),
                stage(Effect::SmaaWeights),
                stage(Effect::SmaaBlend),
            ],
            bind_group_layout,
            sampler,
        }
    }

    /// Records one fullscreen pass of `effect` reading `input_a` and
    /// `input_b` into `output`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        effect: Effect,
        input_a: &wgpu::TextureView,
        input_b: &wgpu::TextureView,
        output: EffectOutput,
    ) {
        let uniforms = EffectUniforms::new(output.width, output.height);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Effect Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input_a),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(input_b),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let stage = &self.stages[stage_index(effect)];
        let pipeline = if output.to_surface {
            &stage.to_surface
        } else {
            &stage.to_target
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(effect.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_carry_texel_size() {
        let u = EffectUniforms::new(800, 400);
        assert_eq!(u.resolution, [800.0, 400.0]);
        assert_eq!(u.texel, [1.0 / 800.0, 1.0 / 400.0]);
        assert_eq!(std::mem::size_of::<EffectUniforms>(), 16);
    }

    #[test]
    fn zero_sized_output_does_not_divide_by_zero() {
        let u = EffectUniforms::new(0, 0);
        assert!(u.texel.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn every_stage_has_its_own_slot() {
        let mut slots: Vec<usize> = [Effect::SmaaEdges, Effect::SmaaWeights, Effect::SmaaBlend]
            .into_iter()
            .map(stage_index)
            .collect();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
