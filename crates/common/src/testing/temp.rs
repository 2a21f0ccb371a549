//! Temporary file-backed storage
//!
//! Wraps a [`JsonFileStore`] living in a temporary directory that is
//! removed when the wrapper is dropped.

#![allow(clippy::missing_errors_doc)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::storage::{JsonFileStore, StorageError};

/// File-backed store whose directory is deleted on drop
///
/// # Examples
///
/// ```
/// use postline_common::storage::KeyValueStore;
/// use postline_common::testing::TempStorage;
///
/// let temp = TempStorage::new().unwrap();
/// temp.store().set("themeMode", "dark").unwrap();
///
/// let reopened = temp.reopen().unwrap();
/// assert_eq!(reopened.get("themeMode").unwrap().as_deref(), Some("dark"));
/// ```
#[derive(Debug)]
pub struct TempStorage {
    store: Arc<JsonFileStore>,
    path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TempStorage {
    pub fn new() -> Result<Self, StorageError> {
        let dir = tempfile::Builder::new().prefix("postline-storage").tempdir()?;
        let path = dir.path().join("storage.json");
        let store = Arc::new(JsonFileStore::open(&path)?);

        Ok(Self { store, path, _dir: dir })
    }

    pub fn store(&self) -> Arc<JsonFileStore> {
        Arc::clone(&self.store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a second handle on the same file, as a restarted process would
    pub fn reopen(&self) -> Result<JsonFileStore, StorageError> {
        JsonFileStore::open(&self.path)
    }

    /// Raw file contents, for asserting on exactly what was persisted
    pub fn contents(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}
