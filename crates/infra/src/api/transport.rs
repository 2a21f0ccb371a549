//! Authenticated transport
//!
//! Wraps [`ApiClient`] with the session: attaches the bearer token on the
//! way out and, when the server reports an expired access token, obtains a
//! fresh one through the [`RefreshCoordinator`] and sends the request again
//! exactly once. If no fresh token can be had, the original failure is
//! returned unchanged.

use std::sync::Arc;

use postline_core::{RefreshCoordinator, SessionStore};
use postline_domain::ApiError;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};
use url::Url;

use super::client::ApiClient;
use super::request::{ApiRequest, ApiResponse};

/// Request pipeline shared by every session-scoped adapter
pub struct AuthenticatedTransport {
    client: ApiClient,
    session: Arc<SessionStore>,
    refresher: Arc<RefreshCoordinator>,
}

impl AuthenticatedTransport {
    pub fn new(
        client: ApiClient,
        session: Arc<SessionStore>,
        refresher: Arc<RefreshCoordinator>,
    ) -> Self {
        Self { client, session, refresher }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send a request and decode its JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Send a request with session credentials
    #[instrument(skip_all, fields(method = %request.method, target = %request.target))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.client.resolve(&request)?;
        let outbound = self.authorize(&request, &url)?;
        let used_token = outbound.bearer_token().map(str::to_owned);

        let err = match self.client.execute(&outbound).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !err.is_expired_token() || self.client.endpoints().is_logout(&url) {
            return Err(err);
        }
        warn!(%url, "expired access token");

        let session = self.session.session();
        if !session.is_authenticated() {
            return Err(err);
        }
        let Some(refresh_token) = session.refresh_token.clone() else {
            return Err(err);
        };

        let superseded = used_token.is_some() && session.access_token != used_token;
        if !superseded {
            if let Err(refresh_err) = self.refresher.ensure_fresh_token(&refresh_token).await {
                info!(%url, error = %refresh_err, "failed to retry request");
                return Err(err);
            }
        }

        info!(%url, "retrying request");
        let retry = self.authorize(&request, &url)?;
        self.client.execute(&retry).await
    }

    // Attach the current access token unless the request opted out, the
    // session is signed out, or the target is a credential exchange.
    fn authorize(&self, request: &ApiRequest, url: &Url) -> Result<ApiRequest, ApiError> {
        let outbound = request.clone();
        if request.no_auth || self.client.endpoints().is_credential_exchange(url) {
            return Ok(outbound);
        }

        let session = self.session.session();
        match session.access_token.as_deref() {
            Some(token) if session.is_authenticated() => outbound.bearer(token),
            _ => Ok(outbound),
        }
    }
}

impl std::fmt::Debug for AuthenticatedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedTransport")
            .field("base", &self.client.endpoints().base().as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
