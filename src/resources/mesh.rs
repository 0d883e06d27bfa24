use std::sync::Arc;

use crate::{
    data_structures::{
        model::{Mesh, ModelVertex},
        scene_graph::SourceMesh,
    },
    error::ImportError,
    render::GraphicsDevice,
    resources::texture::Texture,
};

/// Interleaves positions, normals and texture coordinates. Missing normals become
/// zero vectors, missing texture coordinates become `(0, 0)`.
///
/// A NaN or infinite position is rejected, the bounding box is only defined over
/// finite points.
pub fn build_vertices(mesh: &SourceMesh) -> Result<Vec<ModelVertex>, ImportError> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            if !position.iter().all(|c| c.is_finite()) {
                return Err(ImportError::NonFinitePosition {
                    mesh: mesh.name.clone(),
                    vertex: i,
                });
            }
            Ok(ModelVertex {
                position: *position,
                normal: mesh.normals.get(i).copied().unwrap_or_default(),
                tex_coords: mesh
                    .tex_coords
                    .as_ref()
                    .and_then(|uvs| uvs.get(i))
                    .copied()
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Concatenates the index lists of every face.
pub fn build_indices(mesh: &SourceMesh) -> Result<Vec<u32>, ImportError> {
    let vertices = mesh.positions.len();
    let mut indices = Vec::with_capacity(mesh.faces.iter().map(Vec::len).sum());
    for face in &mesh.faces {
        if let Some(&index) = face.iter().find(|&&i| i as usize >= vertices) {
            return Err(ImportError::InvalidFaceIndex {
                mesh: mesh.name.clone(),
                index,
                vertices,
            });
        }
        indices.extend_from_slice(face);
    }
    Ok(indices)
}

pub fn upload_mesh<D: GraphicsDevice + ?Sized>(
    device: &D,
    name: String,
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
    textures: Vec<Arc<Texture<D::Texture>>>,
) -> Mesh<D> {
    let vertex_buffer = device.create_model_vertex_buffer(&format!("{:?} Vertex Buffer", name), &vertices);
    let index_buffer = device.create_index_buffer(&format!("{:?} Index Buffer", name), &indices);
    Mesh {
        name,
        vertices,
        indices,
        textures,
        vertex_buffer,
        index_buffer,
    }
}
