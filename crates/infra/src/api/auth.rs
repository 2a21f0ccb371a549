//! Authentication adapters
//!
//! [`RemoteAuthApi`] talks to the API through the bare [`ApiClient`]: the
//! refresh call must never re-enter the authenticated transport, and the
//! other auth endpoints either carry credentials in the body or an
//! explicit token.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use postline_core::{AuthApi, ImageLoader, UserApi};
use postline_domain::{ApiError, AuthResult, Credentials, Identity, Registration};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::endpoints::Endpoint;
use super::request::ApiRequest;
use super::transport::AuthenticatedTransport;

/// `auth/*` endpoints
#[derive(Debug, Clone)]
pub struct RemoteAuthApi {
    client: ApiClient,
}

impl RemoteAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for RemoteAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResult, ApiError> {
        let request = ApiRequest::to(Method::POST, &Endpoint::Login).json(credentials)?;
        self.client.execute(&request).await?.json()
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResult, ApiError> {
        let request = ApiRequest::to(Method::POST, &Endpoint::Register).json(registration)?;
        self.client.execute(&request).await?.json()
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, ApiError> {
        debug!("sending request to refresh token");
        let request = ApiRequest::to(Method::POST, &Endpoint::Refresh)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&json!({ "refresh_token": refresh_token }))?;
        self.client.execute(&request).await?.json()
    }

    async fn revoke(&self, access_token: &str) -> Result<(), ApiError> {
        let request = ApiRequest::to(Method::POST, &Endpoint::Logout).bearer(access_token)?;
        self.client.execute(&request).await.map(|_| ())
    }
}

/// `auth/user` through the authenticated transport
#[derive(Debug, Clone)]
pub struct RemoteUserApi {
    transport: Arc<AuthenticatedTransport>,
}

impl RemoteUserApi {
    pub fn new(transport: Arc<AuthenticatedTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl UserApi for RemoteUserApi {
    async fn fetch_current_user(&self) -> Result<Identity, ApiError> {
        self.transport.send_json(ApiRequest::to(Method::GET, &Endpoint::AuthUser)).await
    }
}

/// Downloads images and encodes them as `data:` URLs
#[derive(Debug, Clone)]
pub struct RemoteImageLoader {
    client: ApiClient,
}

impl RemoteImageLoader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageLoader for RemoteImageLoader {
    /// `HEAD` first to check the content type is `image/*`, then `GET` the
    /// bytes. Empty payloads are rejected.
    #[instrument(skip(self))]
    async fn load_data_url(&self, url: &str) -> Result<String, ApiError> {
        let head = self.client.execute(&ApiRequest::head(url).no_auth().raw()).await?;
        let mime = head
            .content_type()
            .map(|value| value.split(';').next().unwrap_or_default().trim().to_string())
            .filter(|mime| mime.starts_with("image/"))
            .ok_or_else(|| not_an_image(url, head.content_type()))?;

        let response = self.client.execute(&ApiRequest::get(url).no_auth().raw()).await?;
        if response.body.is_empty() {
            return Err(ApiError::Unknown {
                status: response.status,
                message: format!("empty image payload from {url}"),
                error_code: None,
            });
        }

        Ok(format!("data:{mime};base64,{}", STANDARD.encode(&response.body)))
    }
}

fn not_an_image(url: &str, content_type: Option<&str>) -> ApiError {
    ApiError::Unknown {
        status: 200,
        message: format!(
            "{url} is not an image (content type {})",
            content_type.unwrap_or("missing")
        ),
        error_code: None,
    }
}
