//! Session data and the phase state machine

use std::fmt;

use postline_domain::{ApiError, Identity};
use serde::{Deserialize, Serialize};

/// Identity and credentials, persisted as `{user, accessToken, refreshToken}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    /// A user and a non-empty access token are both present
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Which mutating operation currently owns the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
    RefreshingToken,
    LoggingOut,
}

impl SessionPhase {
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::{
            Authenticated, Authenticating, LoggingOut, RefreshingToken, Unauthenticated,
        };

        match (self, next) {
            (LoggingOut, Unauthenticated) => true,
            (LoggingOut, _) => false,
            (_, LoggingOut) => true,
            (Unauthenticated, Authenticating)
            | (Authenticating, Authenticated | Unauthenticated)
            | (Authenticated, RefreshingToken | Authenticated)
            | (RefreshingToken, Authenticated | Unauthenticated) => true,
            _ => false,
        }
    }

    /// Phases in which a session result may be applied
    pub fn accepts_credentials(self) -> bool {
        matches!(self, Self::Authenticating | Self::Authenticated | Self::RefreshingToken)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::RefreshingToken => "refreshing_token",
            Self::LoggingOut => "logging_out",
        };
        f.write_str(name)
    }
}

/// Transient errors shown next to the login form / profile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionErrors {
    pub login_error: Option<ApiError>,
    pub fetch_user_error: Option<ApiError>,
}

impl SessionErrors {
    pub fn is_empty(&self) -> bool {
        self.login_error.is_none() && self.fetch_user_error.is_none()
    }
}

/// Point-in-time copy of the whole store
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub session: Session,
    pub phase: SessionPhase,
    pub errors: SessionErrors,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
