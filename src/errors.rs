//! Error types.
//!
//! Almost nothing in the scene core can fail: missing hosts, stale handles and
//! out-of-range material values are all treated as no-ops. The only real
//! failure modes are creating a GPU renderer for a host surface and running
//! the windowing event loop, which is what these types describe.

use thiserror::Error;

/// Failures raised while creating or configuring a renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No compatible GPU adapter was found for the host surface.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a logical device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The window could not be wrapped in a presentable surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reported no texture formats for this adapter.
    #[error("Surface exposes no supported texture formats")]
    NoSurfaceFormat,

    /// The host surface cannot provide a renderer at all.
    #[error("Host surface cannot create a renderer: {0}")]
    Unavailable(String),
}

/// Top-level error for scene setup and the viewer application.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Renderer creation failed during attach.
    #[error("Renderer setup failed: {0}")]
    Renderer(#[from] RenderError),

    /// The winit event loop could not be created or exited abnormally.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The host window could not be created.
    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SceneError>;
