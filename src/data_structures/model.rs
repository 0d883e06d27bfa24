//! Flattened meshes produced by the importer.

use std::sync::Arc;

use crate::{
    data_structures::bounding_box::BoundingBox, render::GraphicsDevice,
    resources::texture::{Texture, TextureKind},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// One triangle list with its per-vertex data, the GPU buffers it was uploaded
/// to and the textures of its material.
pub struct Mesh<D: GraphicsDevice + ?Sized> {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<Arc<Texture<D::Texture>>>,
    pub vertex_buffer: D::Buffer,
    pub index_buffer: D::Buffer,
}

impl<D: GraphicsDevice + ?Sized> Mesh<D> {
    pub fn num_elements(&self) -> u32 {
        self.indices.len() as u32
    }

    /// First texture of the given kind, in material order.
    pub fn texture(&self, kind: TextureKind) -> Option<&Texture<D::Texture>> {
        self.textures
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.as_ref())
    }
}

impl<D: GraphicsDevice + ?Sized> std::fmt::Debug for Mesh<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("name", &self.name)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field(
                "textures",
                &self.textures.iter().map(|t| &t.path).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Everything an import produces. `bounding_box` is `None` when the model has no
/// vertices at all.
pub struct Model<D: GraphicsDevice + ?Sized> {
    pub meshes: Vec<Mesh<D>>,
    pub bounding_box: Option<BoundingBox>,
}

impl<D: GraphicsDevice + ?Sized> std::fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("meshes", &self.meshes)
            .field("bounding_box", &self.bounding_box)
            .finish()
    }
}
