//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! wiring a client from the result.

use postline_domain::PostlineError;
use postline_infra::{config, ClientContext};

#[test]
fn test_load_config_from_toml_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("postline.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "https://feed.example.test/api"
timeout_secs = 12
max_attempts = 2

[storage]
path = "/tmp/postline-state.json"
preserved_keys = ["themeMode", "locale"]
"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("config should load");

    assert_eq!(config.api.base_url, "https://feed.example.test/api");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.api.max_attempts, 2);
    assert_eq!(config.storage.path.as_deref(), Some("/tmp/postline-state.json"));
    assert_eq!(config.storage.session_key, "auth");
    assert_eq!(config.storage.preserved_keys, vec!["themeMode", "locale"]);
}

#[test]
fn test_load_config_from_json_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"api": {"base_url": "https://abc.ngrok-free.app/api"}}"#)
        .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("config should load");

    assert_eq!(config.api.base_url, "https://abc.ngrok-free.app/api");
    assert_eq!(config.storage.preserved_keys, vec!["themeMode"]);
    assert!(config.storage.path.is_none());
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = config::load_from_file(Some(dir.path().join("absent.toml")));

    assert!(matches!(result, Err(PostlineError::Config(msg)) if msg.contains("not found")));
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("postline.toml");
    std::fs::write(&path, "[api\nbase_url = ").expect("Failed to write config");

    let result = config::load_from_file(Some(path));

    assert!(matches!(result, Err(PostlineError::Config(msg)) if msg.contains("TOML")));
}

#[test]
fn test_loaded_config_wires_file_backed_client() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state = dir.path().join("state").join("storage.json");
    let path = dir.path().join("postline.json");
    let contents = serde_json::json!({
        "api": {"base_url": "http://localhost:8000/api"},
        "storage": {"path": state.display().to_string()}
    });
    std::fs::write(&path, contents.to_string()).expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("config should load");
    let context = ClientContext::build(&config).expect("context should build");

    assert!(!context.session.is_authenticated());
    assert!(state.parent().is_some_and(|parent| parent.exists()));
}
