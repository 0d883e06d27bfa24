use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    data_structures::scene_graph::{SourceMaterial, TextureRef},
    error::ResourceError,
    render::GraphicsDevice,
};

/// Material channel a texture was loaded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    pub fn name(&self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
        }
    }
}

/// A loaded image: the device handle plus the channel and path it was loaded for.
#[derive(Debug)]
pub struct Texture<H> {
    pub handle: H,
    pub kind: TextureKind,
    pub path: String,
}

/// Textures already uploaded during one import, keyed by the path string the
/// material used.
///
/// The key ignores [`TextureKind`]: a path first loaded as diffuse
/// and later asked for as specular comes back as the diffuse record.
pub struct TextureCache<H> {
    loaded: HashMap<String, Arc<Texture<H>>>,
}

impl<H> Default for TextureCache<H> {
    fn default() -> Self {
        Self {
            loaded: HashMap::new(),
        }
    }
}

impl<H> TextureCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&Arc<Texture<H>>> {
        self.loaded.get(path)
    }

    pub fn insert(&mut self, texture: Texture<H>) -> Arc<Texture<H>> {
        let texture = Arc::new(texture);
        self.loaded.insert(texture.path.clone(), texture.clone());
        texture
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Decodes the image behind `texture`, either from its embedded bytes or from
/// `base_dir/path`.
pub fn load_image(texture: &TextureRef, base_dir: &Path) -> Result<image::DynamicImage, ResourceError> {
    let path = base_dir.join(&texture.path);
    let decode = |bytes: &[u8], path: PathBuf| {
        image::load_from_memory(bytes).map_err(|source| ResourceError::Decode { path, source })
    };
    match &texture.data {
        Some(bytes) => decode(bytes, PathBuf::from(&texture.path)),
        None => {
            let bytes = std::fs::read(&path).map_err(|source| ResourceError::Io {
                path: path.clone(),
                source,
            })?;
            decode(&bytes, path)
        }
    }
}

/// Returns the textures of `kind` in `material`, uploading each path at most once
/// per cache.
///
/// Images that fail to load are logged and left out; they are not cached, so a
/// later reference to the same path tries again.
pub fn resolve_textures<D: GraphicsDevice + ?Sized>(
    material: &SourceMaterial,
    kind: TextureKind,
    base_dir: &Path,
    device: &D,
    cache: &mut TextureCache<D::Texture>,
) -> Vec<Arc<Texture<D::Texture>>> {
    let mut textures = Vec::new();
    for texture_ref in material.textures(kind) {
        if let Some(texture) = cache.get(&texture_ref.path) {
            textures.push(texture.clone());
            continue;
        }
        match load_image(texture_ref, base_dir) {
            Ok(img) => {
                let handle = device.create_texture(&texture_ref.path, &img);
                log::debug!("Loaded {} {}", kind.name(), texture_ref.path);
                textures.push(cache.insert(Texture {
                    handle,
                    kind,
                    path: texture_ref.path.clone(),
                }));
            }
            Err(e) => {
                log::error!("Material {} is missing a texture: {}", material.name, e);
            }
        }
    }
    textures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_image_decodes_without_touching_disk() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let texture = TextureRef::embedded("model.glb#image0", png);
        let img = load_image(&texture, Path::new("/does/not/exist")).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let texture = TextureRef::file("nope.png");
        let err = load_image(&texture, Path::new("/does/not/exist")).unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let texture = TextureRef::embedded("x#image0", vec![1, 2, 3, 4]);
        let err = load_image(&texture, Path::new(".")).unwrap_err();
        assert!(matches!(err, ResourceError::Decode { .. }));
    }

    #[test]
    fn cache_is_keyed_by_path_only() {
        let mut cache = TextureCache::new();
        let first = cache.insert(Texture {
            handle: 1u32,
            kind: TextureKind::Diffuse,
            path: "shared.png".into(),
        });
        let hit = cache.get("shared.png").unwrap();
        assert!(Arc::ptr_eq(&first, hit));
        assert_eq!(hit.kind, TextureKind::Diffuse);
        assert!(cache.get("Shared.png").is_none());
        assert_eq!(cache.len(), 1);
    }
}
