//! JSON-file backed key-value store

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::error::StorageResult;
use super::traits::KeyValueStore;

/// Store persisted as a single JSON object on disk
///
/// The file is read once on open and rewritten on every mutation through a
/// sibling temporary file and a rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "discarding corrupt storage file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), keys = entries.len(), "storage file opened");

        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let tmp_path = self.path.with_extension("tmp");
        let serialized = serde_json::to_vec_pretty(entries)?;

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn mutate<F>(&self, change: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.entries.lock();
        if change(&mut entries) {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }

    fn clear_all(&self) -> StorageResult<()> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            changed
        })
    }

    fn clear_all_except(&self, keep: &[&str]) -> StorageResult<()> {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|key, _| keep.contains(&key.as_str()));
            entries.len() != before
        })
    }
}
