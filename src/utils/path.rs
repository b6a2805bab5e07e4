//! Path utilities for output naming and resolution

use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up on a unique name
const MAX_UNIQUE_SUFFIX: u32 = 9999;

/// Path utilities
pub struct PathUtils;

impl PathUtils {
    /// Resolve `path` against `base` unless it is already absolute
    pub fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() || base.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    /// Return `path` if it is free, otherwise the first free `stem_NNN.ext`.
    ///
    /// When every suffix is taken the original path is returned and the
    /// engine's no-overwrite flag reports the collision.
    pub async fn unique_path(path: &Path) -> PathBuf {
        if !Self::exists(path).await {
            return path.to_path_buf();
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path.extension().map(|e| e.to_string_lossy().to_string());
        let parent = path.parent().unwrap_or_else(|| Path::new(""));

        for counter in 1..=MAX_UNIQUE_SUFFIX {
            let name = match &extension {
                Some(ext) => format!("{}_{:03}.{}", stem, counter, ext),
                None => format!("{}_{:03}", stem, counter),
            };
            let candidate = parent.join(name);
            if !Self::exists(&candidate).await {
                return candidate;
            }
        }

        path.to_path_buf()
    }

    /// Create the directory that will hold `path`
    pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await
            }
            _ => Ok(()),
        }
    }

    /// Get file extension from path, lowercased
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Split a path into (path without extension, extension)
    pub fn split_extension(path: &Path) -> (PathBuf, Option<String>) {
        match path.extension() {
            Some(ext) => (
                path.with_extension(""),
                Some(ext.to_string_lossy().to_string()),
            ),
            None => (path.to_path_buf(), None),
        }
    }

    async fn exists(path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
