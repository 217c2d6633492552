use crate::light::LightRig;
use crate::mesh::Mesh;

/// What gets drawn in one frame: the lights and the meshes they shine on.
///
/// A scene borrows everything it holds and is rebuilt for each render, so
/// the meshes stay owned by their cards.
#[derive(Clone, Debug)]
pub struct Scene<'a> {
    pub lights: &'a LightRig,
    pub meshes: Vec<&'a Mesh>,
}

impl<'a> Scene<'a> {
    pub fn new(lights: &'a LightRig) -> Self {
        Self {
            lights,
            meshes: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: &'a Mesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
