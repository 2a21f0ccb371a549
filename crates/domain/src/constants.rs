//! Application constants
//!
//! Centralized location for wire-level codes and storage keys.

// Error codes emitted by the API in the `error_code` body field
pub const EXPIRED_TOKEN_ERROR_CODE: &str = "auth_expired_token";
pub const AUTH_ERROR_CODE_PREFIX: &str = "auth_";

// Local persisted state
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "auth";
pub const DEFAULT_PRESERVED_STORAGE_KEYS: &[&str] = &["themeMode"];

// HTTP
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const NGROK_HOST_SUFFIX: &str = ".ngrok-free.app";
pub const NGROK_SKIP_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Status synthesized for failures that never produced a response.
pub const NETWORK_FAILURE_STATUS: u16 = 500;
