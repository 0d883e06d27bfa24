//! glTF 2.0 (`.gltf` and `.glb`) through the `gltf` crate.
//!
//! Every primitive becomes its own [`SourceMesh`] since materials are assigned per
//! primitive. The node hierarchy of the default scene (or the first one) hangs
//! off a synthetic root. Node transforms are not applied.
//!
//! Primitives are triangle lists, strips or fans, so strips and fans are always
//! unrolled into triangles and the V axis already matches wgpu. [`ImportOptions`]
//! has nothing left to do here.

use std::{collections::HashMap, path::Path};

use gltf::mesh::Mode;

use crate::{
    data_structures::scene_graph::{SceneGraph, SceneNode, SourceMaterial, SourceMesh, TextureRef},
    error::ImportError,
    resources::{ImportOptions, ImportSource},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct GltfSource;

impl ImportSource for GltfSource {
    fn import(&self, path: &Path, _options: &ImportOptions) -> Result<SceneGraph, ImportError> {
        let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |e: gltf::Error| ImportError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let gltf = gltf::Gltf::from_slice(&bytes).map_err(parse_err)?;
        let gltf::Gltf { document, blob } = gltf;
        let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(parse_err)?;
        let file_name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        Ok(to_scene_graph(&document, &buffers, &file_name))
    }
}

fn to_scene_graph(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    file_name: &str,
) -> SceneGraph {
    let materials = document
        .materials()
        .map(|m| to_material(m, buffers, file_name))
        .collect();

    // glTF mesh index -> our mesh indices, one per usable primitive
    let mut meshes = Vec::new();
    let mut primitives_of: HashMap<usize, Vec<usize>> = HashMap::new();
    for mesh in document.meshes() {
        let name = mesh.name().unwrap_or("unknown_mesh");
        for primitive in mesh.primitives() {
            match to_mesh(name, &primitive, buffers) {
                Some(source_mesh) => {
                    primitives_of.entry(mesh.index()).or_default().push(meshes.len());
                    meshes.push(source_mesh);
                }
                None => log::warn!(
                    "Skipping primitive {} of mesh {}: {:?} is not a triangle mode",
                    primitive.index(),
                    name,
                    primitive.mode()
                ),
            }
        }
    }

    let root = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .map(|scene| {
            let mut root = SceneNode::new(scene.name().unwrap_or(file_name));
            root.children = scene
                .nodes()
                .map(|node| to_scene_node(node, &primitives_of))
                .collect();
            root
        });

    SceneGraph {
        meshes,
        materials,
        root,
    }
}

fn to_scene_node(node: gltf::Node, primitives_of: &HashMap<usize, Vec<usize>>) -> SceneNode {
    let meshes = node
        .mesh()
        .and_then(|mesh| primitives_of.get(&mesh.index()))
        .cloned()
        .unwrap_or_default();
    SceneNode {
        name: node
            .name()
            .map_or_else(|| format!("node{}", node.index()), str::to_string),
        meshes,
        children: node
            .children()
            .map(|child| to_scene_node(child, primitives_of))
            .collect(),
    }
}

fn to_material(material: gltf::Material, buffers: &[gltf::buffer::Data], file_name: &str) -> SourceMaterial {
    let diffuse = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .and_then(|info| to_texture_ref(info.texture().source(), buffers, file_name))
        .into_iter()
        .collect();
    SourceMaterial {
        name: material.name().unwrap_or("default").to_string(),
        diffuse,
        // core glTF has no specular map
        specular: Vec::new(),
    }
}

fn to_texture_ref(image: gltf::Image, buffers: &[gltf::buffer::Data], file_name: &str) -> Option<TextureRef> {
    match image.source() {
        gltf::image::Source::View { view, .. } => {
            let buffer = &buffers[view.buffer().index()];
            let start = view.offset();
            let end = start + view.length();
            match buffer.0.get(start..end) {
                Some(bytes) => Some(TextureRef::embedded(
                    format!("{}#image{}", file_name, image.index()),
                    bytes.to_vec(),
                )),
                None => {
                    log::warn!("Image {} of {} points past its buffer", image.index(), file_name);
                    None
                }
            }
        }
        gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
            log::warn!("Image {} of {} is a data URI, which is not supported", image.index(), file_name);
            None
        }
        gltf::image::Source::Uri { uri, .. } => Some(TextureRef::file(uri)),
    }
}

fn to_mesh(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<SourceMesh> {
    let mode = primitive.mode();
    if !matches!(mode, Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan) {
        return None;
    }
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()].0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|it| it.collect())
        .unwrap_or_default();
    let normals = reader
        .read_normals()
        .map(|it| it.collect())
        .unwrap_or_default();
    // glTF already uses a top-left texture origin, nothing to flip
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let faces = match mode {
        Mode::TriangleStrip => strip_to_triangles(&indices),
        Mode::TriangleFan => fan_to_triangles(&indices),
        _ => indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
    };

    Some(SourceMesh {
        name: name.to_string(),
        positions,
        normals,
        tex_coords,
        faces,
        material: primitive.material().index(),
    })
}

/// Every other triangle of a strip is flipped to keep the winding consistent.
fn strip_to_triangles(indices: &[u32]) -> Vec<Vec<u32>> {
    indices
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 0 {
                vec![w[0], w[1], w[2]]
            } else {
                vec![w[1], w[0], w[2]]
            }
        })
        .collect()
}

fn fan_to_triangles(indices: &[u32]) -> Vec<Vec<u32>> {
    match indices.split_first() {
        Some((&hub, rest)) => rest.windows(2).map(|w| vec![hub, w[0], w[1]]).collect(),
        None => Vec::new(),
    }
}
