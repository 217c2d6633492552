//! Type-safe handles to renderer-owned resources.
//!
//! Geometry, materials and render targets live inside a
//! [`Renderer`](crate::Renderer); the rest of the crate only holds these keys.
//! They are generational, so a handle to a released resource never aliases a
//! newer one and releasing it twice is harmless.
//!
//! ```ignore
//! let geometry: GeometryId = renderer.create_geometry(&raw);
//! renderer.release_geometry(geometry); // true
//! renderer.release_geometry(geometry); // false, nothing left to free
//! ```

use slotmap::new_key_type;

new_key_type! {
    /// Handle to uploaded vertex and index buffers.
    pub struct GeometryId;

    /// Handle to an uploaded physical material.
    pub struct MaterialId;

    /// Handle to an off-screen color target.
    pub struct TargetId;
}

/// Identity of a renderer's output surface, the node a host shows on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputId(pub(crate) u64);

/// Identity of a pending animation-frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub(crate) u64);

impl OutputId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl FrameRequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}
