//! Error types used throughout the application

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{AUTH_ERROR_CODE_PREFIX, EXPIRED_TOKEN_ERROR_CODE, NETWORK_FAILURE_STATUS};

/// Main error type for Postline plumbing (configuration, storage, wiring)
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PostlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Postline operations
pub type Result<T> = std::result::Result<T, PostlineError>;

/// Field name to messages, as returned with a 422 response.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

static NO_VALIDATION_ERRORS: ValidationErrors = BTreeMap::new();

/// Every failure a caller of the remote API can observe.
///
/// The variant decides how the failure is handled: `Auth` drives the
/// refresh protocol, `SessionExpired` and `RefreshUnavailable` are the two
/// outcomes of a failed refresh, everything else propagates unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    #[error("Validation failed: {message}")]
    Validation { message: String, errors: ValidationErrors },

    #[error("Authentication failed: {message}")]
    Auth { message: String, error_code: Option<String> },

    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    #[error("Token refresh unavailable: {message}")]
    RefreshUnavailable { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String, error_code: Option<String> },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Request failed ({status}): {message}")]
    Unknown { status: u16, message: String, error_code: Option<String> },
}

/// Error body as served by the API: `{message, error_code?, errors?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse a response body, tolerating empty or non-JSON payloads.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    fn validation_errors(&self) -> ValidationErrors {
        let Some(serde_json::Value::Object(map)) = &self.errors else {
            return ValidationErrors::new();
        };

        map.iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                    serde_json::Value::String(s) => vec![s.clone()],
                    serde_json::Value::Null => Vec::new(),
                    other => vec![other.to_string()],
                };
                (field.clone(), messages)
            })
            .collect()
    }
}

/// Uniform view of an error handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorShape {
    pub status: u16,
    pub message: String,
    pub validation_errors: ValidationErrors,
    pub has_validation_errors: bool,
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_response(status: u16, body: ErrorBody) -> Self {
        let message = body
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_message(status).to_string());

        match status {
            401 => Self::Auth { message, error_code: body.error_code },
            404 => Self::NotFound { message },
            422 => {
                let errors = body.validation_errors();
                Self::Validation { message, errors }
            }
            500..=599 => Self::Server { status, message, error_code: body.error_code },
            _ => Self::Unknown { status, message, error_code: body.error_code },
        }
    }

    /// Failure where no response was received (connect error, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        let message =
            if message.is_empty() { "Internal Server Error".to_string() } else { message };
        Self::Network { message }
    }

    /// HTTP status of the failure; network failures report 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::Auth { .. } | Self::SessionExpired { .. } => 401,
            Self::NotFound { .. } => 404,
            Self::RefreshUnavailable { .. } | Self::Network { .. } => NETWORK_FAILURE_STATUS,
            Self::Server { status, .. } | Self::Unknown { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Auth { message, .. }
            | Self::SessionExpired { message }
            | Self::RefreshUnavailable { message }
            | Self::Network { message }
            | Self::Server { message, .. }
            | Self::NotFound { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Auth { error_code, .. }
            | Self::Server { error_code, .. }
            | Self::Unknown { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Field errors; empty for everything but `Validation`.
    pub fn validation_errors(&self) -> &ValidationErrors {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &NO_VALIDATION_ERRORS,
        }
    }

    pub fn has_validation_errors(&self) -> bool {
        self.status() == 422
    }

    /// The access token used by the request is no longer accepted.
    pub fn is_expired_token(&self) -> bool {
        matches!(
            self,
            Self::Auth { error_code: Some(code), .. } if code == EXPIRED_TOKEN_ERROR_CODE
        )
    }

    /// Credentials themselves were rejected: any 401 or an `auth_*` error code.
    pub fn is_auth_kind(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::SessionExpired { .. })
            || self.error_code().is_some_and(|code| code.starts_with(AUTH_ERROR_CODE_PREFIX))
    }

    pub fn shape(&self) -> ErrorShape {
        ErrorShape {
            status: self.status(),
            message: self.message().to_string(),
            validation_errors: self.validation_errors().clone(),
            has_validation_errors: self.has_validation_errors(),
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        401 => "Unauthenticated",
        404 => "Not Found",
        422 => "The given data was invalid",
        500..=599 => "Internal Server Error",
        _ => "Request failed",
    }
}
