//! Modular common utilities shared across Postline crates.
//!
//! # Modules
//!
//! - [`storage`]: the local key-value capability the session store persists
//!   into, with an in-memory and a JSON-file backend
//! - `testing` (feature `test-utils`): temporary storage and failure-injecting
//!   stores for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use storage::{JsonFileStore, KeyValueStore, KeyValueStoreExt, MemoryStore, StorageError};
