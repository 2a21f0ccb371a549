//! Port interfaces for the remote API
//!
//! These traits define the boundary between the stores in this crate and
//! the HTTP adapters in `postline-infra`. Every method reports failures
//! with the closed [`ApiError`] taxonomy.

use async_trait::async_trait;
use postline_domain::{
    ApiError, AuthResult, Credentials, EntityId, Identity, NewPost, Page, Post, PostImage,
    Registration,
};

/// Authentication endpoints
///
/// Implementations must not route through the authenticated transport:
/// a refresh that itself triggered the refresh protocol would deadlock the
/// coordinator.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResult, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<AuthResult, ApiError>;

    /// Exchange a refresh token for a new session result
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, ApiError>;

    /// Invalidate `access_token` on the server
    async fn revoke(&self, access_token: &str) -> Result<(), ApiError>;
}

/// Current user profile
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn fetch_current_user(&self) -> Result<Identity, ApiError>;
}

/// Turns a remote image URL into a `data:` URL
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load_data_url(&self, url: &str) -> Result<String, ApiError>;
}

/// Which listing a page request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page of the global feed
    Global,
    /// First page of one owner's feed
    Owner(EntityId),
    /// A `next_page_url` taken verbatim from a previous page
    Cursor(String),
}

/// Post endpoints
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list(
        &self,
        request: &PageRequest,
        query: &[(String, String)],
    ) -> Result<Page<Post>, ApiError>;

    async fn get(&self, id: &EntityId) -> Result<Post, ApiError>;

    async fn images(&self, id: &EntityId) -> Result<Vec<PostImage>, ApiError>;

    /// Like a post; returns the post as updated by the server
    async fn like(&self, id: &EntityId) -> Result<Post, ApiError>;

    /// Remove a like; returns the post as updated by the server
    async fn unlike(&self, id: &EntityId) -> Result<Post, ApiError>;

    /// Upload a new post as multipart form data
    async fn create(&self, post: &NewPost) -> Result<Post, ApiError>;
}

/// Notified after the session has been cleared
pub trait SessionListener: Send + Sync {
    fn on_logout(&self);
}
