//! Image cache with path-based de-duplication
//!
//! Loading the same file twice returns the handle of the first load. Paths
//! are canonicalized first, so `./a/../tex.png` and `tex.png` share an entry.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use super::property::PropertyBag;
use crate::error::{HostError, HostResult};
use crate::host::{ResourceHandle, Value};

/// An image resource known to the host
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub filepath: PathBuf,
    /// Image attributes such as `colorspace_settings.name`
    pub properties: PropertyBag,
}

/// Statistics about cache usage
#[derive(Debug, Default, Clone)]
pub struct CacheStatistics {
    /// Images read from disk
    pub loads: usize,
    /// Requests answered by an existing entry
    pub reuses: usize,
}

impl CacheStatistics {
    /// Fraction of requests answered without loading
    pub fn hit_ratio(&self) -> f32 {
        let total = self.loads + self.reuses;
        if total == 0 {
            0.0
        } else {
            self.reuses as f32 / total as f32
        }
    }
}

/// Every image loaded in a scene, keyed by canonical path
#[derive(Debug, Default)]
pub struct ImageCache {
    images: Vec<Image>,
    by_path: HashMap<PathBuf, ResourceHandle>,
    stats: CacheStatistics,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an image by path, loading it on first use
    pub fn load(&mut self, path: &Path) -> HostResult<ResourceHandle> {
        let load_error = |source| HostError::ResourceLoad {
            path: path.to_path_buf(),
            source,
        };

        let canonical = std::fs::canonicalize(path).map_err(load_error)?;
        if let Some(handle) = self.by_path.get(&canonical) {
            self.stats.reuses += 1;
            return Ok(*handle);
        }

        // Opening proves the file is readable; decoding is the renderer's job.
        File::open(&canonical).map_err(load_error)?;

        let handle = ResourceHandle(self.images.len());
        let name = canonical
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.images.push(Image {
            filepath: canonical.clone(),
            properties: image_properties(&canonical, &name),
        });
        self.by_path.insert(canonical, handle);
        self.stats.loads += 1;

        debug!("Loaded image {} as resource {}", path.display(), handle.0);
        Ok(handle)
    }

    pub fn get(&self, handle: ResourceHandle) -> Option<&Image> {
        self.images.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: ResourceHandle) -> Option<&mut Image> {
        self.images.get_mut(handle.0)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get_statistics(&self) -> &CacheStatistics {
        &self.stats
    }
}

fn image_properties(path: &Path, name: &str) -> PropertyBag {
    PropertyBag::new()
        .with("name", Value::Text(name.to_string()))
        .with("filepath", Value::Text(path.display().to_string()))
        .with("alpha_mode", Value::Text("STRAIGHT".to_string()))
        .with_group(
            "colorspace_settings",
            PropertyBag::new().with("name", Value::Text("sRGB".to_string())),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("material_creator_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"not really a png").unwrap();
        path
    }

    #[test]
    fn test_same_path_same_handle() {
        let path = scratch_file("grid.png");
        let mut cache = ImageCache::new();

        let first = cache.load(&path).unwrap();
        let dotted = path.parent().unwrap().join(".").join("grid.png");
        let second = cache.load(&dotted).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_statistics().loads, 1);
        assert_eq!(cache.get_statistics().reuses, 1);
        assert_eq!(cache.get_statistics().hit_ratio(), 0.5);
    }

    #[test]
    fn test_distinct_paths_distinct_handles() {
        let a = scratch_file("albedo.png");
        let b = scratch_file("normal.png");
        let mut cache = ImageCache::new();
        assert_ne!(cache.load(&a).unwrap(), cache.load(&b).unwrap());
        let image = cache.get(ResourceHandle(1)).unwrap();
        assert_eq!(image.properties.value("name"), Some(&Value::Text("normal.png".into())));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let mut cache = ImageCache::new();
        let err = cache.load(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, HostError::ResourceLoad { .. }));
        assert!(cache.is_empty());
    }
}
