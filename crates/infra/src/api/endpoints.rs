//! Endpoint catalog
//!
//! Every remote path the client talks to, resolved against the configured
//! API base URL.

use postline_domain::{ApiError, EntityId, PostlineError};
use url::Url;

use super::request::local_error;
use crate::errors::InfraError;

/// A named remote endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Refresh,
    Logout,
    AuthUser,
    Posts,
    Post(EntityId),
    PostImages(EntityId),
    Like(EntityId),
    Unlike(EntityId),
    ProfilePosts(EntityId),
}

impl Endpoint {
    /// Path relative to the API base
    pub fn path(&self) -> String {
        match self {
            Self::Login => "auth/login".to_string(),
            Self::Register => "auth/register".to_string(),
            Self::Refresh => "auth/refresh".to_string(),
            Self::Logout => "auth/logout".to_string(),
            Self::AuthUser => "auth/user".to_string(),
            Self::Posts => "posts".to_string(),
            Self::Post(id) => format!("posts/{id}"),
            Self::PostImages(id) => format!("posts/{id}/images"),
            Self::Like(id) => format!("likes/like/post/{id}"),
            Self::Unlike(id) => format!("likes/unlike/post/{id}"),
            Self::ProfilePosts(id) => format!("profile/{id}/posts"),
        }
    }
}

/// Endpoint URLs for one API base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// `base_url` must be absolute; a trailing slash is added when missing so
    /// relative paths are appended rather than replacing the last segment.
    pub fn new(base_url: &str) -> Result<Self, PostlineError> {
        let mut base = Url::parse(base_url).map_err(InfraError::from)?;
        if base.cannot_be_a_base() {
            return Err(PostlineError::Config(format!("API base URL cannot be a base: {base_url}")));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        self.resolve(&endpoint.path())
    }

    /// Resolve an absolute URL (e.g. a page cursor) or a base-relative path
    pub fn resolve(&self, target: &str) -> Result<Url, ApiError> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base
                .join(target.trim_start_matches('/'))
                .map_err(|err| local_error(format!("invalid request path '{target}': {err}"))),
            Err(err) => Err(local_error(format!("invalid request URL '{target}': {err}"))),
        }
    }

    /// Login, register and refresh carry credentials in the body and never
    /// get a bearer token.
    pub fn is_credential_exchange(&self, url: &Url) -> bool {
        [Endpoint::Login, Endpoint::Register, Endpoint::Refresh]
            .iter()
            .any(|endpoint| self.matches(url, endpoint))
    }

    pub fn is_logout(&self, url: &Url) -> bool {
        self.matches(url, &Endpoint::Logout)
    }

    fn matches(&self, url: &Url, endpoint: &Endpoint) -> bool {
        let Ok(expected) = self.url(endpoint) else { return false };
        url.scheme() == expected.scheme()
            && url.host_str() == expected.host_str()
            && url.port_or_known_default() == expected.port_or_known_default()
            && url.path().trim_end_matches('/') == expected.path().trim_end_matches('/')
    }
}
