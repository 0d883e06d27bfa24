use std::path::Path;

use crate::{
    data_structures::{
        bounding_box::BoundsAccumulator,
        model::{Mesh, Model},
        scene_graph::{SceneGraph, SceneNode},
    },
    error::ImportError,
    render::GraphicsDevice,
    resources::texture::{TextureCache, TextureKind, resolve_textures},
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 */
pub mod gltf;
pub mod mesh;
pub mod obj;
pub mod texture;

/// Post-processing the importer asks an [`ImportSource`] for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Split every polygon into triangles.
    pub triangulate: bool,
    /// Bring texture V into a top-left origin, which is what wgpu samples with.
    pub flip_uvs: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            flip_uvs: true,
        }
    }
}

/// A model format: turns a file into a [`SceneGraph`].
pub trait ImportSource {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<SceneGraph, ImportError>;
}

/// Picks an import source by file extension.
pub fn source_for_path(path: &Path) -> Result<Box<dyn ImportSource>, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("obj") => Ok(Box::new(obj::ObjSource)),
        Some("gltf") | Some("glb") => Ok(Box::new(gltf::GltfSource)),
        _ => Err(ImportError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Imports `path` through `source` and flattens its scene graph into meshes.
///
/// Nodes are visited depth-first, pre-order; the meshes of a node are uploaded
/// before its children are visited. Every vertex of every mesh goes into the
/// bounding box. Any error drops whatever was uploaded so far, so a failed import
/// leaves nothing behind but the textures already in `cache`.
pub fn import_model<D: GraphicsDevice + ?Sized>(
    source: &dyn ImportSource,
    path: &Path,
    device: &D,
    cache: &mut TextureCache<D::Texture>,
) -> Result<Model<D>, ImportError> {
    let graph = source.import(path, &ImportOptions::default())?;
    let root = graph.root.as_ref().ok_or_else(|| ImportError::MissingRoot {
        path: path.to_path_buf(),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut meshes = Vec::new();
    let mut bounds = BoundsAccumulator::new();
    root.walk(&mut |node| {
        process_node(node, &graph, base_dir, device, cache, &mut meshes, &mut bounds)
    })?;

    log::info!(
        "Imported {:?}: {} meshes, {} textures",
        path,
        meshes.len(),
        cache.len()
    );
    Ok(Model {
        meshes,
        bounding_box: bounds.finish(),
    })
}

fn process_node<D: GraphicsDevice + ?Sized>(
    node: &SceneNode,
    graph: &SceneGraph,
    base_dir: &Path,
    device: &D,
    cache: &mut TextureCache<D::Texture>,
    meshes: &mut Vec<Mesh<D>>,
    bounds: &mut BoundsAccumulator,
) -> Result<(), ImportError> {
    for &mesh_idx in &node.meshes {
        let source_mesh = graph
            .meshes
            .get(mesh_idx)
            .ok_or_else(|| ImportError::InvalidMeshIndex {
                node: node.name.clone(),
                index: mesh_idx,
                available: graph.meshes.len(),
            })?;

        let vertices = mesh::build_vertices(source_mesh)?;
        let indices = mesh::build_indices(source_mesh)?;
        bounds.extend(vertices.iter().map(|v| v.position));

        let material = source_mesh.material.and_then(|idx| {
            let material = graph.materials.get(idx);
            if material.is_none() {
                log::warn!(
                    "Mesh {} references material {} but there are only {}. Drawing it untextured.",
                    source_mesh.name,
                    idx,
                    graph.materials.len()
                );
            }
            material
        });
        let mut textures = Vec::new();
        if let Some(material) = material {
            for kind in [TextureKind::Diffuse, TextureKind::Specular] {
                textures.extend(resolve_textures(material, kind, base_dir, device, cache));
            }
        }

        meshes.push(mesh::upload_mesh(
            device,
            source_mesh.name.clone(),
            vertices,
            indices,
            textures,
        ));
    }
    Ok(())
}
