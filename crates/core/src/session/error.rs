use postline_domain::ApiError;
use thiserror::Error;

use super::state::SessionPhase;

/// Session store error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The remote call failed; the error is also recorded on the store
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Another mutating operation owns the session
    #[error("Session is busy ({0})")]
    Busy(SessionPhase),

    /// A logout happened while the operation was in flight; its result was dropped
    #[error("Session changed while the operation was in flight")]
    Superseded,

    /// The server answered without a user id or access token
    #[error("Malformed authentication result")]
    MalformedResult,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<postline_common::StorageError> for SessionError {
    fn from(err: postline_common::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
