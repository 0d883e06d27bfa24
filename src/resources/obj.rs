//! Wavefront OBJ through `tobj`.
//!
//! OBJ has no hierarchy, so every model in the file hangs off a single root node.

use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{
    data_structures::scene_graph::{SceneGraph, SceneNode, SourceMaterial, SourceMesh, TextureRef},
    error::ImportError,
    resources::{ImportOptions, ImportSource},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjSource;

impl ImportSource for ObjSource {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<SceneGraph, ImportError> {
        let obj_text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        parse_obj(&obj_text, path, options, |mtl| tobj::load_mtl(base_dir.join(mtl)))
    }
}

/// Parses OBJ text. `load_mtl` resolves `mtllib` statements.
pub fn parse_obj<ML>(
    obj_text: &str,
    path: &Path,
    options: &ImportOptions,
    load_mtl: ML,
) -> Result<SceneGraph, ImportError>
where
    ML: Fn(&Path) -> tobj::MTLLoadResult,
{
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, obj_materials) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ..Default::default()
        },
        load_mtl,
    )
    .map_err(|e| ImportError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // A broken material library only costs the textures.
    let materials = match obj_materials {
        Ok(materials) => materials.into_iter().map(to_material).collect(),
        Err(e) => {
            log::warn!("Material library of {:?} could not be loaded: {}", path, e);
            Vec::new()
        }
    };

    let meshes: Vec<SourceMesh> = models
        .into_iter()
        .map(|m| to_mesh(m, options))
        .collect();
    let root = SceneNode::new(path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned()))
        .with_meshes(0..meshes.len());

    Ok(SceneGraph {
        meshes,
        materials,
        root: Some(root),
    })
}

fn to_material(m: tobj::Material) -> SourceMaterial {
    SourceMaterial {
        name: m.name,
        diffuse: m.diffuse_texture.into_iter().map(TextureRef::file).collect(),
        specular: m.specular_texture.into_iter().map(TextureRef::file).collect(),
    }
}

fn to_mesh(m: tobj::Model, options: &ImportOptions) -> SourceMesh {
    let mesh = m.mesh;
    let positions = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect::<Vec<_>>();
    let normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| [n[0], n[1], n[2]])
        .collect();
    // OBJ puts the texture origin bottom-left
    let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| if options.flip_uvs { [t[0], 1.0 - t[1]] } else { [t[0], t[1]] })
            .collect()
    });

    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut start = 0;
        mesh.face_arities
            .iter()
            .map(|&arity| {
                let end = start + arity as usize;
                let face = mesh.indices[start..end.min(mesh.indices.len())].to_vec();
                start = end;
                face
            })
            .collect()
    };

    SourceMesh {
        name: m.name,
        positions,
        normals,
        tex_coords,
        faces,
        material: mesh.material_id,
    }
}
