//! Mock implementations of the storage capability

#![allow(clippy::missing_errors_doc)]

use parking_lot::Mutex;

use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

/// Storage operation recorded by [`FailingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get(String),
    Set(String),
    Remove(String),
    Keys,
    ClearAll,
}

/// In-memory store that records every operation and can be told to fail
/// writes, for exercising "storage is broken but logout still succeeds".
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: Mutex<bool>,
    ops: Mutex<Vec<StoreOp>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().clone()
    }

    fn record(&self, op: StoreOp) {
        self.ops.lock().push(op);
    }

    fn check_writable(&self) -> StorageResult<()> {
        if *self.fail_writes.lock() {
            return Err(StorageError::Backend("write rejected".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.record(StoreOp::Get(key.to_string()));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.record(StoreOp::Set(key.to_string()));
        self.check_writable()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.record(StoreOp::Remove(key.to_string()));
        self.check_writable()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.record(StoreOp::Keys);
        self.inner.keys()
    }

    fn clear_all(&self) -> StorageResult<()> {
        self.record(StoreOp::ClearAll);
        self.check_writable()?;
        self.inner.clear_all()
    }
}
