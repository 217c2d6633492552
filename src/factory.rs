//! Builds card geometry and materials from a [`CardConfig`].
//!
//! No validation happens here: whatever numbers the config carries go
//! straight into the geometry generator and the material.

use crate::config::CardConfig;
use crate::geometry::RawGeometry;
use crate::material::{PhysicalMaterial, Side};

/// Rounding segments used for every card.
pub const CARD_SEGMENTS: u32 = 4;

/// The rounded-box geometry for a card.
pub fn card_geometry(config: &CardConfig) -> RawGeometry {
    RawGeometry::rounded_box(
        config.width,
        config.height,
        config.depth,
        CARD_SEGMENTS,
        config.radius,
    )
}

/// The glass material for a card: transparent, double-sided, full-strength
/// environment reflections.
pub fn card_material(config: &CardConfig) -> PhysicalMaterial {
    PhysicalMaterial {
        color: config.color,
        opacity: config.opacity,
        transparent: true,
        transmission: config.transmission,
        roughness: config.roughness,
        metalness: config.metalness,
        thickness: config.thickness,
        ior: config.ior,
        clearcoat: config.clearcoat,
        clearcoat_roughness: config.clearcoat_roughness,
        side: Side::Double,
        env_map_intensity: 1.0,
    }
}
