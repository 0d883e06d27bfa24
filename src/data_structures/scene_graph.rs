//! Imported scene graphs.
//!
//! This is the read-only tree an [`ImportSource`](crate::resources::ImportSource)
//! hands to the importer. Meshes and materials live in flat tables on the
//! [`SceneGraph`]; nodes refer to them by index, the way the model formats do.

use crate::resources::texture::TextureKind;

/// A reference to an image used by a material.
///
/// `path` is the cache key. For images stored inside the model file `data` holds
/// the encoded bytes and `path` is a synthetic `"<file>#image<n>"` name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub path: String,
    pub data: Option<Vec<u8>>,
}

impl TextureRef {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    pub fn embedded(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data: Some(data),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub diffuse: Vec<TextureRef>,
    pub specular: Vec<TextureRef>,
}

impl SourceMaterial {
    pub fn textures(&self, kind: TextureKind) -> &[TextureRef] {
        match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Specular => &self.specular,
        }
    }
}

/// Mesh data as the import library returned it.
///
/// `normals` may be empty and `tex_coords` may be absent; otherwise both match
/// `positions` in length. Every face lists indices into `positions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub faces: Vec<Vec<u32>>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first pre-order walk: a node is passed to `visit` before any of its
    /// children. Stops at the first error.
    pub fn walk<E>(&self, visit: &mut dyn FnMut(&SceneNode) -> Result<(), E>) -> Result<(), E> {
        visit(self)?;
        for child in &self.children {
            child.walk(visit)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
    pub meshes: Vec<SourceMesh>,
    pub materials: Vec<SourceMaterial>,
    pub root: Option<SceneNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_count(node: &SceneNode) -> usize {
        1 + node.children.iter().map(node_count).sum::<usize>()
    }

    #[test]
    fn walk_is_pre_order_and_visits_each_node_once() {
        let root = SceneNode::new("root")
            .with_child(
                SceneNode::new("a")
                    .with_child(SceneNode::new("a1"))
                    .with_child(SceneNode::new("a2")),
            )
            .with_child(SceneNode::new("b"));
        let mut seen = Vec::new();
        root.walk::<()>(&mut |node| {
            seen.push(node.name.clone());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, ["root", "a", "a1", "a2", "b"]);
        assert_eq!(node_count(&root), seen.len());
    }

    #[test]
    fn walk_stops_on_error() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("bad"))
            .with_child(SceneNode::new("never"));
        let mut seen = Vec::new();
        let result = root.walk(&mut |node| {
            seen.push(node.name.clone());
            if node.name == "bad" { Err(()) } else { Ok(()) }
        });
        assert!(result.is_err());
        assert_eq!(seen, ["root", "bad"]);
    }

    #[test]
    fn material_textures_by_kind() {
        let material = SourceMaterial {
            name: "m".into(),
            diffuse: vec![TextureRef::file("d.png")],
            specular: vec![TextureRef::file("s.png"), TextureRef::file("s2.png")],
        };
        assert_eq!(material.textures(TextureKind::Diffuse).len(), 1);
        assert_eq!(material.textures(TextureKind::Specular)[1].path, "s2.png");
    }
}
