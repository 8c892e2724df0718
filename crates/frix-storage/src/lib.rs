//! File-tree storage for the frix rendering engine.
//!
//! The render pipeline never touches the filesystem directly. Content documents,
//! templates and the key document are read through the [`Storage`] trait, and
//! rendered output is written back through it. This enables:
//!
//! - **Unit testing** of whole render passes without a real file tree
//! - **Clean separation** between the pure rendering core and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `write()`, `list()`, and `exists()` methods
//! - [`FsStorage`] implementation rooted at a directory on the local filesystem
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use frix_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("site"));
//! let key = storage.read(Path::new("key.json"))?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
