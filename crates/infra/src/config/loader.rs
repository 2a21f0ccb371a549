//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `POSTLINE_API_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `POSTLINE_API_URL`: API base URL (required)
//! - `POSTLINE_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `POSTLINE_API_MAX_ATTEMPTS`: Attempts for idempotent requests
//! - `POSTLINE_STORAGE_PATH`: JSON file backing the local store
//! - `POSTLINE_PRESERVED_KEYS`: Comma-separated keys kept across logout
//!
//! ## File Locations
//! `postline.toml`, `postline.json`, `config.toml`, `config.json`, looked up
//! in the working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use postline_domain::{ApiConfig, ClientConfig, PostlineError, Result, StorageConfig};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["postline.toml", "postline.json", "config.toml", "config.json"];

/// Load configuration, environment first and files second
///
/// # Errors
/// Returns `PostlineError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `POSTLINE_API_URL` is required; everything else falls back to the
/// defaults of [`ApiConfig`] and [`StorageConfig`].
///
/// # Errors
/// Returns `PostlineError::Config` if the URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let base_url = env_var("POSTLINE_API_URL")?;
    let api_defaults = ApiConfig::default();
    let storage_defaults = StorageConfig::default();

    let api = ApiConfig {
        base_url,
        timeout_secs: env_parse("POSTLINE_API_TIMEOUT_SECS")?.unwrap_or(api_defaults.timeout_secs),
        max_attempts: env_parse("POSTLINE_API_MAX_ATTEMPTS")?.unwrap_or(api_defaults.max_attempts),
    };

    let preserved_keys = std::env::var("POSTLINE_PRESERVED_KEYS")
        .ok()
        .map(|raw| split_keys(&raw))
        .unwrap_or(storage_defaults.preserved_keys);

    let storage = StorageConfig {
        path: std::env::var("POSTLINE_STORAGE_PATH").ok().filter(|p| !p.trim().is_empty()),
        session_key: storage_defaults.session_key,
        preserved_keys,
    };

    Ok(ClientConfig { api, storage })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`].
///
/// # Errors
/// Returns `PostlineError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PostlineError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PostlineError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PostlineError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration by file extension (`.json` or `.toml`)
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PostlineError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PostlineError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PostlineError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    probe_in(&dirs)
}

fn probe_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            PostlineError::Config(format!("Missing required environment variable: {key}"))
        })
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PostlineError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "POSTLINE_API_URL",
        "POSTLINE_API_TIMEOUT_SECS",
        "POSTLINE_API_MAX_ATTEMPTS",
        "POSTLINE_STORAGE_PATH",
        "POSTLINE_PRESERVED_KEYS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn env_requires_api_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, PostlineError::Config(msg) if msg.contains("POSTLINE_API_URL")));
    }

    #[test]
    fn env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("POSTLINE_API_URL", "https://api.test/api");
        std::env::set_var("POSTLINE_API_MAX_ATTEMPTS", "3");
        std::env::set_var("POSTLINE_PRESERVED_KEYS", "themeMode, locale,,");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "https://api.test/api");
        assert_eq!(config.api.max_attempts, 3);
        assert_eq!(config.api.timeout_secs, ApiConfig::default().timeout_secs);
        assert_eq!(config.storage.preserved_keys, vec!["themeMode", "locale"]);
        assert_eq!(config.storage.path, None);
    }

    #[test]
    fn env_rejects_bad_numbers() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("POSTLINE_API_URL", "https://api.test/api");
        std::env::set_var("POSTLINE_API_TIMEOUT_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(PostlineError::Config(msg)) if msg.contains("TIMEOUT")));
    }

    #[test]
    fn parse_by_extension() {
        let toml = "[api]\nbase_url = \"https://a.test/api\"\n";
        let config = parse_config(toml, Path::new("postline.toml")).unwrap();
        assert_eq!(config.api.base_url, "https://a.test/api");
        assert_eq!(config.storage, StorageConfig::default());

        let json = r#"{"api": {"base_url": "https://b.test/api", "timeout_secs": 5}}"#;
        let config = parse_config(json, Path::new("config.json")).unwrap();
        assert_eq!(config.api.timeout_secs, 5);

        assert!(parse_config("", Path::new("config.yaml")).is_err());
    }

    #[test]
    fn probe_prefers_postline_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("postline.json"), "{}").unwrap();

        let found = probe_in(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.file_name().unwrap(), "postline.json");

        let empty = tempfile::tempdir().unwrap();
        assert!(probe_in(&[empty.path().to_path_buf()]).is_none());
    }
}
