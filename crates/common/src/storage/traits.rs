//! Key-value capability traits
//!
//! [`KeyValueStore`] is the object-safe primitive the backends implement.
//! [`KeyValueStoreExt`] layers the JSON helpers on top of any store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::json::merge_missing;

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Remove every key
    fn clear_all(&self) -> StorageResult<()>;

    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove every key not listed in `keep`
    fn clear_all_except(&self, keep: &[&str]) -> StorageResult<()> {
        for key in self.keys()? {
            if !keep.contains(&key.as_str()) {
                self.remove(&key)?;
            }
        }
        debug!(kept = keep.len(), "storage cleared");
        Ok(())
    }

    fn get_and_remove(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }
}

/// JSON helpers available on every [`KeyValueStore`]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Deserialize the value stored under `key`
    ///
    /// # Errors
    /// [`StorageError::Corrupt`] when the stored text does not parse as `T`
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupt { key: key.to_string(), source }),
            None => Ok(None),
        }
    }

    /// Serialize `value` under `key`
    ///
    /// With `merge`, an object value is combined with the object already
    /// stored: fields already present keep their stored value, missing
    /// fields are filled from `value`. Arrays and scalars always replace.
    fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        merge: bool,
    ) -> StorageResult<()> {
        let mut value = serde_json::to_value(value)?;

        if merge && value.is_object() {
            let current = self.get(key)?.and_then(|raw| serde_json::from_str(&raw).ok());
            if let Some(current @ serde_json::Value::Object(_)) = current {
                merge_missing(&mut value, current);
            }
        }

        self.set(key, &serde_json::to_string(&value)?)
    }

    fn get_json_and_remove<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let value = self.get_json(key);
        self.remove(key)?;
        value
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
