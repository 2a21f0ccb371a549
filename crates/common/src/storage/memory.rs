//! In-memory key-value store

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::error::StorageResult;
use super::traits::KeyValueStore;

/// Process-local store; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: RwLock::new(entries) }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn clear_all(&self) -> StorageResult<()> {
        self.entries.write().clear();
        Ok(())
    }
}
