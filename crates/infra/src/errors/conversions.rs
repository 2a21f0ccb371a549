//! Conversions from external infrastructure errors into domain errors.

use postline_common::StorageError;
use postline_domain::{ApiError, PostlineError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PostlineError);

impl From<InfraError> for PostlineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PostlineError> for InfraError {
    fn from(value: PostlineError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let message = describe_http_error(&err);
        if err.is_builder() {
            InfraError(PostlineError::Config(message))
        } else {
            InfraError(PostlineError::Network(message))
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        InfraError(PostlineError::Storage(err.to_string()))
    }
}

impl From<StorageError> for InfraError {
    fn from(err: StorageError) -> Self {
        InfraError(PostlineError::Storage(err.to_string()))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        InfraError(PostlineError::Config(format!("invalid JSON: {err}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(err: toml::de::Error) -> Self {
        InfraError(PostlineError::Config(format!("invalid TOML: {err}")))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(err: url::ParseError) -> Self {
        InfraError(PostlineError::Config(format!("invalid URL: {err}")))
    }
}

/// A request that produced no response (connect failure, timeout, broken body).
pub fn network_error(err: &HttpError) -> ApiError {
    ApiError::network(describe_http_error(err))
}

fn describe_http_error(err: &HttpError) -> String {
    if err.is_timeout() {
        format!("http request timed out: {err}")
    } else if err.is_connect() {
        format!("http connection failed: {err}")
    } else if err.is_decode() {
        format!("http response decode failed: {err}")
    } else {
        format!("http request failed: {err}")
    }
}
