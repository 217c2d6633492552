//! A single glass card living in a renderer.

use glam::Vec3;
use log::{debug, warn};

use crate::config::CardConfig;
use crate::factory::{card_geometry, card_material};
use crate::material::{MaterialPatch, PhysicalMaterial};
use crate::mesh::Mesh;
use crate::renderer::Renderer;
use crate::rotation::RotationDegrees;

/// One card: a rounded-box geometry, its glass material and the mesh node
/// combining them.
///
/// The card exclusively owns both GPU resources and frees them together in
/// [`dispose`](Self::dispose). Call it before dropping the card; a card
/// dropped while still holding resources logs a leak warning.
///
/// ```
/// use glasscard::{CardConfig, CardEntity, HeadlessRenderer};
///
/// let mut renderer = HeadlessRenderer::new();
/// let mut card = CardEntity::new(&mut renderer, CardConfig::default());
///
/// card.set_rotation(30.0, -10.0, 5.0);
/// card.dispose(&mut renderer);
/// card.dispose(&mut renderer); // no-op
/// assert_eq!(renderer.live_geometries(), 0);
/// ```
#[derive(Debug)]
pub struct CardEntity {
    config: CardConfig,
    material: PhysicalMaterial,
    mesh: Mesh,
    disposed: bool,
}

impl CardEntity {
    /// Builds and uploads the card's geometry and material, then places the
    /// mesh at the configured position and rotation.
    pub fn new(renderer: &mut dyn Renderer, config: CardConfig) -> Self {
        let geometry = renderer.create_geometry(&card_geometry(&config));
        let material = card_material(&config);
        let material_id = renderer.create_material(&material);

        let mut mesh = Mesh::new(geometry, material_id);
        mesh.transform.position = config.position;
        mesh.transform.rotation = config.rotation.to_radians();

        debug!(
            "card {:?} created ({}x{}x{})",
            config.label.as_deref().unwrap_or("unnamed"),
            config.width,
            config.height,
            config.depth
        );

        Self {
            config,
            material,
            mesh,
            disposed: false,
        }
    }

    /// Replaces the orientation with the given Euler angles in degrees.
    ///
    /// Each axis is converted to radians on its own; the previous rotation
    /// is discarded, not accumulated.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.mesh.transform.rotation = RotationDegrees::new(x, y, z).to_radians();
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.mesh.transform.position = Vec3::new(x, y, z);
    }

    /// Merges `patch` into the live material and re-uploads it.
    pub fn update_material(&mut self, renderer: &mut dyn Renderer, patch: &MaterialPatch) {
        if self.disposed {
            return;
        }
        self.material.apply(patch);
        renderer.write_material(self.mesh.material, &self.material);
    }

    /// Frees the geometry and material. Later calls do nothing.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        if self.disposed {
            return;
        }
        renderer.release_geometry(self.mesh.geometry);
        renderer.release_material(self.mesh.material);
        self.disposed = true;
        debug!("card resources released");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The renderable node. Still owned by the card.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn material(&self) -> &PhysicalMaterial {
        &self.material
    }
}

impl Drop for CardEntity {
    fn drop(&mut self) {
        if !self.disposed {
            warn!("card dropped without dispose(); its geometry and material leak until the renderer goes away");
        }
    }
}
