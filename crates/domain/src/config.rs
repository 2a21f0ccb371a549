//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_PRESERVED_STORAGE_KEYS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_STORAGE_KEY,
};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint is resolved against (e.g. "https://host/api")
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts for idempotent requests (initial try + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

/// Local persisted state configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store; in-memory when absent
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Keys that survive logout (user preferences)
    #[serde(default = "default_preserved_keys")]
    pub preserved_keys: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            session_key: default_session_key(),
            preserved_keys: default_preserved_keys(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_session_key() -> String {
    DEFAULT_SESSION_STORAGE_KEY.to_string()
}

fn default_preserved_keys() -> Vec<String> {
    DEFAULT_PRESERVED_STORAGE_KEYS.iter().map(|k| (*k).to_string()).collect()
}
