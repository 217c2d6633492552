//! # Glasscard
//!
//! **An on-demand wgpu renderer for a single glass-like 3D card.**
//!
//! A rounded, clear-coated card is lit by an ambient, a directional and two
//! point lights, drawn into an off-screen target and anti-aliased with SMAA.
//! Frames are only produced when something changes: on attach, on a rotation
//! update, on a resize, or when an animation frame that was asked for fires.
//!
//! ## Quick Start
//!
//! ```
//! use glasscard::*;
//!
//! let mut host = HeadlessHost::new(800, 600);
//! let mut scene = SceneLifecycle::new(CardCatalog::base_card(), SceneConfig::new());
//!
//! scene.attach(&mut host)?;
//! scene.set_rotation(RotationDegrees::new(30.0, -10.0, 5.0));
//! assert_eq!(scene.frames_rendered(), 2);
//!
//! scene.detach(&mut host);
//! assert!(host.outputs().is_empty());
//! # Ok::<(), SceneError>(())
//! ```
//!
//! ## Layout
//!
//! - **Scene core**: [`SceneLifecycle`], [`CardEntity`], [`PostProcessing`]
//!   and the [`RenderGraph`] they run on. Backend-neutral, written against the
//!   [`Renderer`] and [`HostSurface`] traits.
//! - **Backends**: [`GpuRenderer`] and [`WindowHost`] for a real window,
//!   [`HeadlessRenderer`] and [`HeadlessHost`] for tests and tooling.
//! - **Data**: [`CardCatalog`] for the built-in cards, [`CardConfig`] and
//!   [`CardOverrides`] to describe new ones.

mod camera;
mod card;
mod card_data;
mod color;
mod config;
mod controls;
mod effect_pass;
mod errors;
mod events;
mod factory;
mod geometry;
mod gpu;
mod gpu_renderer;
mod handles;
mod headless;
mod host;
mod input;
mod lifecycle;
mod light;
mod material;
mod mesh;
mod mesh_pass;
mod post_process;
mod render_graph;
mod renderer;
mod rotation;
mod scene;
mod window_host;

pub use camera::PerspectiveCamera;
pub use card::CardEntity;
pub use card_data::{CardCatalog, CardKey, SubCard};
pub use color::Color;
pub use config::{CameraSettings, CardConfig, CardOverrides, LightSettings, SceneConfig};
pub use controls::{RotationControls, SLIDER_MAX, SLIDER_MIN, SLIDER_STEP};
pub use effect_pass::{EffectPass, EffectUniforms};
pub use errors::{RenderError, Result, SceneError};
pub use events::{ResizeSubscription, WindowEvents};
pub use factory::{CARD_SEGMENTS, card_geometry, card_material};
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use gpu_renderer::GpuRenderer;
pub use handles::{FrameRequestId, GeometryId, MaterialId, OutputId, TargetId};
pub use headless::{DrawRecord, HeadlessHost, HeadlessRenderer, Release, ReleaseLog, ReleaseRecord};
pub use host::HostSurface;
pub use input::{COARSE_STEPS, ControlAction, KeyboardInput, action_for, apply_action};
pub use lifecycle::{LifecycleState, SceneLifecycle};
pub use light::{AmbientLight, DirectionalLight, LightRig, MAX_POINT_LIGHTS, PointLight};
pub use material::{MaterialPatch, PhysicalMaterial, Side};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{MeshPass, TARGET_FORMAT};
pub use post_process::PostProcessing;
pub use render_graph::{
    NodeTargets, RenderContext, RenderGraph, RenderGraphBuilder, RenderNode, RenderTarget,
    SceneNode, SmaaNode,
};
pub use renderer::{
    Effect, PowerPreference, RenderDestination, Renderer, RendererOptions, ToneMapping,
    scaled_size,
};
pub use rotation::{Axis, RotationDegrees};
pub use scene::Scene;
pub use window_host::WindowHost;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3};

// Re-export the winit key type the keyboard bindings use
pub use winit::keyboard::KeyCode;
