//! Local key-value storage
//!
//! The session store persists `{user, accessToken, refreshToken}` through
//! this capability and wipes it on logout, keeping only allow-listed
//! preference keys.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, the default and the test backend
//! - [`JsonFileStore`]: the whole map serialized to one JSON file, rewritten
//!   atomically on every mutation
//!
//! # Example
//!
//! ```
//! use postline_common::storage::{KeyValueStore, KeyValueStoreExt, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("themeMode", "dark").unwrap();
//! store.set_json("auth", &serde_json::json!({"accessToken": "t1"}), false).unwrap();
//!
//! store.clear_all_except(&["themeMode"]).unwrap();
//! assert_eq!(store.get("themeMode").unwrap().as_deref(), Some("dark"));
//! assert!(!store.has("auth").unwrap());
//! ```

pub mod error;
pub mod file;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, KeyValueStoreExt};
