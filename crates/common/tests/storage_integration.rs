//! Integration tests for storage module
//!
//! These tests verify the storage workflows the session store relies on:
//! - Persisting a session document and reading it back after reopen
//! - Merging JSON documents with stored fields winning
//! - Wiping everything except preference keys on logout

use std::sync::Arc;
use std::thread;

use postline_common::storage::{JsonFileStore, KeyValueStore, KeyValueStoreExt, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    access_token: String,
    refresh_token: Option<String>,
}

fn open_temp() -> (tempfile::TempDir, std::path::PathBuf, JsonFileStore) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("nested").join("storage.json");
    let store = JsonFileStore::open(&path).expect("store should open");
    (dir, path, store)
}

#[test]
fn session_document_survives_reopen() {
    let (_dir, path, store) = open_temp();
    let session =
        StoredSession { access_token: "t1".into(), refresh_token: Some("r1".into()) };

    store.set_json("auth", &session, false).unwrap();
    drop(store);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get_json::<StoredSession>("auth").unwrap(), Some(session));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["auth"].as_str().unwrap().contains("accessToken"));
}

#[test]
fn merge_keeps_stored_fields_and_fills_missing_ones() {
    let (_dir, _path, store) = open_temp();

    store.set_json("prefs", &json!({"theme": "dark", "layout": {"dense": true}}), false).unwrap();
    store
        .set_json(
            "prefs",
            &json!({"theme": "light", "locale": "en", "layout": {"dense": false, "cols": 2}}),
            true,
        )
        .unwrap();

    let merged: serde_json::Value = store.get_json("prefs").unwrap().unwrap();
    assert_eq!(
        merged,
        json!({"theme": "dark", "locale": "en", "layout": {"dense": true, "cols": 2}})
    );
}

#[test]
fn logout_wipe_keeps_preferences_on_disk() {
    let (_dir, path, store) = open_temp();
    store.set("themeMode", "dark").unwrap();
    store.set("auth", "{}").unwrap();
    store.set("draft", "hello").unwrap();

    store.clear_all_except(&["themeMode"]).unwrap();
    drop(store);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.keys().unwrap(), vec!["themeMode".to_string()]);
    assert_eq!(reopened.get_and_remove("themeMode").unwrap().as_deref(), Some("dark"));
    assert!(!reopened.has("themeMode").unwrap());
}

#[test]
fn corrupt_value_is_reported_with_its_key() {
    let (_dir, _path, store) = open_temp();
    store.set("auth", "{not json").unwrap();

    let err = store.get_json::<StoredSession>("auth").unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "auth"));
}

#[test]
fn concurrent_writers_do_not_lose_keys() {
    let (_dir, path, store) = open_temp();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.set(&format!("key-{i}"), "v").unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.keys().unwrap().len(), 8);
}
