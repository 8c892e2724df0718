//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Use the builder methods to seed the file tree;
/// writes performed by the engine land in the same map and can be inspected
/// afterwards.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use frix_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("key.json", r#"{"/": {"template": "page", "content": "home.json"}}"#)
///     .with_file("templates/page.html", "<h1>{{title}}</h1>");
///
/// let key = storage.read(Path::new("key.json")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    writes: RwLock<Vec<PathBuf>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given contents.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.into());
        self
    }

    /// Contents of a file, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }

    /// Paths written through [`Storage::write`], in write order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.read().unwrap().clone()
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_owned());
        self.writes.write().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        // BTreeMap keys are already sorted.
        Ok(self
            .files
            .read()
            .unwrap()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StorageErrorKind;

    #[test]
    fn test_read_seeded_file() {
        let storage = MockStorage::new().with_file("key.json", "{}");

        assert_eq!(storage.read(Path::new("key.json")).unwrap(), "{}");
    }

    #[test]
    fn test_read_missing_file() {
        let storage = MockStorage::new();

        let err = storage.read(Path::new("key.json")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_write_is_recorded() {
        let storage = MockStorage::new();

        storage.write(Path::new("bin/main.css"), "p {}").unwrap();

        assert_eq!(storage.file("bin/main.css").as_deref(), Some("p {}"));
        assert_eq!(storage.writes(), vec![PathBuf::from("bin/main.css")]);
    }

    #[test]
    fn test_list_direct_children_only() {
        let storage = MockStorage::new()
            .with_file("templates/page.html", "")
            .with_file("templates/author.html", "")
            .with_file("templates/nested/deep.html", "")
            .with_file("key.json", "");

        let files = storage.list(Path::new("templates")).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("templates/author.html"),
                PathBuf::from("templates/page.html"),
            ]
        );
    }

    #[test]
    fn test_exists() {
        let storage = MockStorage::new().with_file("key.json", "{}");

        assert!(storage.exists(Path::new("key.json")));
        assert!(!storage.exists(Path::new("other.json")));
    }
}
