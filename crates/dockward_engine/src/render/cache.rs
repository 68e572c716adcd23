//! Resource loading with null-handle fallback
//!
//! Loads never fail loudly: a missing or unreadable file is logged and yields
//! the null handle, which the scene treats as "not renderable".

use super::{MaterialHandle, MeshHandle, TextureHandle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// CPU-side summary of a loaded mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshInfo {
    /// Source file
    pub path: PathBuf,
    /// Number of `v` records
    pub vertex_count: usize,
    /// Number of `f` records
    pub face_count: usize,
}

/// Decoded texture metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Source file
    pub path: PathBuf,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Named material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialInfo {
    /// Name used to look the material up
    pub name: String,
    /// Bound texture, null for untextured materials
    pub texture: TextureHandle,
}

/// Path-keyed cache of meshes, textures and materials
#[derive(Debug, Default)]
pub struct ResourceCache {
    base_dir: PathBuf,
    meshes: Vec<MeshInfo>,
    textures: Vec<TextureInfo>,
    materials: Vec<MaterialInfo>,
    mesh_lookup: HashMap<PathBuf, MeshHandle>,
    texture_lookup: HashMap<PathBuf, TextureHandle>,
    material_lookup: HashMap<String, MaterialHandle>,
}

impl ResourceCache {
    /// Cache resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Load a Wavefront OBJ mesh
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> MeshHandle {
        let path = self.resolve(path.as_ref());
        if let Some(handle) = self.mesh_lookup.get(&path) {
            return *handle;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!("Failed to load mesh {}: {}", path.display(), err);
                return MeshHandle::NULL;
            }
        };

        let mut info = MeshInfo {
            path: path.clone(),
            vertex_count: 0,
            face_count: 0,
        };
        for line in contents.lines() {
            match line.split_whitespace().next() {
                Some("v") => info.vertex_count += 1,
                Some("f") => info.face_count += 1,
                _ => {}
            }
        }
        if info.vertex_count == 0 || info.face_count == 0 {
            log::warn!("Mesh {} has no geometry", path.display());
            return MeshHandle::NULL;
        }

        log::debug!(
            "Loaded mesh {} ({} vertices, {} faces)",
            path.display(),
            info.vertex_count,
            info.face_count
        );
        self.meshes.push(info);
        let handle = MeshHandle::from_index(self.meshes.len() as u32);
        self.mesh_lookup.insert(path, handle);
        handle
    }

    /// Load a texture image (any format the `image` crate can read)
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = self.resolve(path.as_ref());
        if let Some(handle) = self.texture_lookup.get(&path) {
            return *handle;
        }

        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
                self.textures.push(TextureInfo {
                    path: path.clone(),
                    width,
                    height,
                });
                let handle = TextureHandle::from_index(self.textures.len() as u32);
                self.texture_lookup.insert(path, handle);
                handle
            }
            Err(err) => {
                log::warn!("Failed to load texture {}: {}", path.display(), err);
                TextureHandle::NULL
            }
        }
    }

    /// Get or create the material called `name`
    ///
    /// An empty name yields the null handle.
    pub fn material(&mut self, name: &str, texture: TextureHandle) -> MaterialHandle {
        if name.is_empty() {
            log::warn!("Refusing to create a material without a name");
            return MaterialHandle::NULL;
        }
        if let Some(handle) = self.material_lookup.get(name) {
            return *handle;
        }

        self.materials.push(MaterialInfo {
            name: name.to_string(),
            texture,
        });
        let handle = MaterialHandle::from_index(self.materials.len() as u32);
        self.material_lookup.insert(name.to_string(), handle);
        handle
    }

    /// Mesh metadata for a non-null handle
    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshInfo> {
        Self::slot(&self.meshes, handle.index())
    }

    /// Texture metadata for a non-null handle
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureInfo> {
        Self::slot(&self.textures, handle.index())
    }

    /// Material data for a non-null handle
    pub fn material_info(&self, handle: MaterialHandle) -> Option<&MaterialInfo> {
        Self::slot(&self.materials, handle.index())
    }

    fn slot<T>(items: &[T], index: u32) -> Option<&T> {
        (index as usize).checked_sub(1).and_then(|i| items.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "# one face\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_missing_files_give_null_handles() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ResourceCache::new(dir.path());

        assert!(cache.load_mesh("missing.obj").is_null());
        assert!(cache.load_texture("missing.png").is_null());
        assert!(cache.material("", TextureHandle::NULL).is_null());
    }

    #[test]
    fn test_mesh_is_scanned_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), TRIANGLE).unwrap();
        std::fs::write(dir.path().join("empty.obj"), "# nothing\n").unwrap();
        let mut cache = ResourceCache::new(dir.path());

        let handle = cache.load_mesh("tri.obj");
        assert!(!handle.is_null());
        assert_eq!(cache.load_mesh("tri.obj"), handle);
        let info = cache.mesh(handle).unwrap();
        assert_eq!((info.vertex_count, info.face_count), (3, 1));

        assert!(cache.load_mesh("empty.obj").is_null());
        assert!(cache.mesh(MeshHandle::NULL).is_none());
    }

    #[test]
    fn test_texture_dimensions_come_from_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        image::RgbaImage::new(4, 2).save(&path).unwrap();
        let mut cache = ResourceCache::new(dir.path());

        let texture = cache.load_texture("checker.png");
        let info = cache.texture(texture).unwrap();
        assert_eq!((info.width, info.height), (4, 2));

        let material = cache.material("crate", texture);
        assert_eq!(cache.material("crate", TextureHandle::NULL), material);
        assert_eq!(cache.material_info(material).unwrap().texture, texture);
    }
}
