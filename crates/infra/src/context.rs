//! Client wiring
//!
//! [`ClientContext`] builds the full object graph from a [`ClientConfig`]:
//! local storage, the session store and its refresh coordinator, the
//! authenticated transport, the remote adapters, and the collection store,
//! which is registered to be cleared on logout.

use std::sync::Arc;

use postline_common::{JsonFileStore, KeyValueStore, MemoryStore};
use postline_core::{CollectionStore, RefreshCoordinator, SessionError, SessionStore};
use postline_domain::{ClientConfig, Identity, PostlineError};
use tracing::info;

use crate::api::{
    ApiClient, AuthenticatedTransport, RemoteAuthApi, RemoteImageLoader, RemotePostsApi,
    RemoteUserApi,
};
use crate::errors::InfraError;

/// Everything a view layer needs to talk to the API
#[derive(Clone)]
pub struct ClientContext {
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionStore>,
    pub refresher: Arc<RefreshCoordinator>,
    pub transport: Arc<AuthenticatedTransport>,
    pub collections: Arc<CollectionStore>,
    user_api: RemoteUserApi,
}

impl ClientContext {
    /// Wire the client from configuration
    ///
    /// The persisted session, if any, is restored before this returns.
    ///
    /// # Errors
    /// Returns `PostlineError::Config` for an invalid base URL and
    /// `PostlineError::Storage` if the storage file cannot be opened.
    pub fn build(config: &ClientConfig) -> Result<Self, PostlineError> {
        let storage: Arc<dyn KeyValueStore> = match config.storage.path.as_deref() {
            Some(path) => Arc::new(JsonFileStore::open(path).map_err(InfraError::from)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Wire the client over an existing store
    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, PostlineError> {
        let client = ApiClient::new(&config.api)?;
        let auth_api = Arc::new(RemoteAuthApi::new(client.clone()));

        let session = Arc::new(
            SessionStore::new(auth_api.clone(), storage.clone(), &config.storage)
                .with_image_loader(Arc::new(RemoteImageLoader::new(client.clone()))),
        );
        let refresher = Arc::new(RefreshCoordinator::new(session.clone(), auth_api));
        let transport =
            Arc::new(AuthenticatedTransport::new(client, session.clone(), refresher.clone()));

        let collections =
            Arc::new(CollectionStore::new(Arc::new(RemotePostsApi::new(transport.clone()))));
        session.add_listener(&collections);

        info!(
            base_url = %transport.client().endpoints().base(),
            restored = session.is_authenticated(),
            "client context ready"
        );

        Ok(Self {
            storage,
            session,
            refresher,
            collections,
            user_api: RemoteUserApi::new(transport.clone()),
            transport,
        })
    }

    /// Reload the signed-in user's profile into the session
    pub async fn fetch_auth_user(&self) -> Result<Identity, SessionError> {
        self.session.fetch_auth_user(&self.user_api).await
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("transport", &self.transport)
            .field("collections", &self.collections)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use postline_domain::{ApiConfig, StorageConfig};

    use super::*;

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ClientConfig {
            api: ApiConfig { base_url: "not a url".into(), ..ApiConfig::default() },
            storage: StorageConfig::default(),
        };

        assert!(matches!(ClientContext::build(&config), Err(PostlineError::Config(_))));
    }

    #[test]
    fn restores_session_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "auth": serde_json::json!({
                    "user": {"id": 1},
                    "accessToken": "t1",
                    "refreshToken": "r1"
                })
                .to_string()
            })
            .to_string(),
        )
        .unwrap();

        let config = ClientConfig {
            api: ApiConfig::default(),
            storage: StorageConfig {
                path: Some(path.display().to_string()),
                ..StorageConfig::default()
            },
        };
        let context = ClientContext::build(&config).unwrap();

        assert!(context.session.is_authenticated());
        assert_eq!(context.session.access_token().as_deref(), Some("t1"));
    }
}
