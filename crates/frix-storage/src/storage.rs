//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for abstracting file-tree access,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **relative paths** below the storage root
//! (e.g. `"key.json"`, `"templates/page.html"`, `"bin/main.css"`).
//! Absolute paths and paths containing `..` are rejected by backends that
//! map onto a real directory.

use std::path::{Path, PathBuf};

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (escapes the storage root).
    InvalidPath,
    /// Resource exists but is not valid UTF-8 text.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => StorageErrorKind::InvalidData,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the error means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::InvalidData => "Invalid data",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction over the site file tree.
///
/// Backends map relative paths onto their own layout. Reads and writes are
/// whole-file and text-only; the engine has no use for partial or binary I/O.
pub trait Storage: Send + Sync {
    /// Read a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist, can't be read,
    /// or the path escapes the storage root.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Write a whole file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file can't be written or the path
    /// escapes the storage root.
    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// List the files directly inside a directory, sorted by path.
    ///
    /// Subdirectories are not descended into. A missing directory yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory exists but can't be read.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError>;

    /// Check if a file exists at the given path.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &Path) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_new() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert!(err.path.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_storage_error_with_path() {
        let err = StorageError::new(StorageErrorKind::NotFound).with_path("content/page1.json");

        assert_eq!(err.path.as_deref(), Some(Path::new("content/page1.json")));
    }

    #[test]
    fn test_storage_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::new(StorageErrorKind::NotFound).with_source(io_err);

        assert!(err.downcast_source::<std::io::Error>().is_some());
    }

    #[test]
    fn test_storage_error_io_kinds() {
        let cases = [
            (std::io::ErrorKind::NotFound, StorageErrorKind::NotFound),
            (
                std::io::ErrorKind::PermissionDenied,
                StorageErrorKind::PermissionDenied,
            ),
            (std::io::ErrorKind::InvalidData, StorageErrorKind::InvalidData),
            (std::io::ErrorKind::TimedOut, StorageErrorKind::Other),
        ];

        for (io_kind, expected) in cases {
            let err = StorageError::io(std::io::Error::new(io_kind, "boom"), None);
            assert_eq!(err.kind, expected, "io kind {io_kind:?}");
        }
    }

    #[test]
    fn test_storage_error_is_not_found() {
        assert!(StorageError::not_found("key.json").is_not_found());
        assert!(!StorageError::new(StorageErrorKind::InvalidPath).is_not_found());
    }

    #[test]
    fn test_storage_error_display_simple() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_storage_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::new(StorageErrorKind::NotFound)
            .with_backend("Fs")
            .with_path("content/page1.json")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: file not found (path: content/page1.json)"
        );
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
