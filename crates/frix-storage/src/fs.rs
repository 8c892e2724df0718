//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading and writing the site file tree on the
//! local filesystem.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a site directory.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use frix_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("site"));
/// let templates = storage.list(Path::new("templates"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory of the site tree.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects absolute paths and paths containing parent directory
    /// components (`..`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path)).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::io(e, Some(parent.to_path_buf())).with_backend(BACKEND)
            })?;
        }
        fs::write(&full_path, contents)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
        tracing::debug!(path = %full_path.display(), bytes = contents.len(), "Wrote file");
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let full_path = self.resolve(dir)?;
        let entries = match fs::read_dir(&full_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(e, Some(full_path)).with_backend(BACKEND)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| dir.join(entry.file_name()))
            .collect();
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|p| p.exists())
    }
}
