//! Single-flight token refresh
//!
//! The first caller of [`RefreshCoordinator::ensure_fresh_token`] starts a
//! refresh and parks it in a slot as a [`Shared`] future; every caller that
//! arrives before it settles awaits the same future. The future clears the
//! slot itself once it has a result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use postline_domain::ApiError;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::store::SessionStore;
use crate::ports::AuthApi;

type RefreshFuture = Shared<BoxFuture<'static, Result<String, ApiError>>>;
type RefreshSlot = Arc<Mutex<Option<(u64, RefreshFuture)>>>;

/// Coordinates token refreshes for one session
pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    auth_api: Arc<dyn AuthApi>,
    in_flight: RefreshSlot,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(session: Arc<SessionStore>, auth_api: Arc<dyn AuthApi>) -> Self {
        Self {
            session,
            auth_api,
            in_flight: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Obtain a fresh access token, joining an in-flight refresh if any
    ///
    /// Succeeds with the new access token. Fails with
    /// [`ApiError::SessionExpired`] when the server rejected the refresh
    /// token (the session has been logged out), or
    /// [`ApiError::RefreshUnavailable`] for any other failure (the session
    /// is left as it was).
    pub async fn ensure_fresh_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let refresh = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some((id, refresh)) => {
                    debug!(refresh_id = id, "joining in-flight token refresh");
                    refresh.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let refresh = Self::run(
                        id,
                        Arc::clone(&self.session),
                        Arc::clone(&self.auth_api),
                        refresh_token.to_owned(),
                        Arc::clone(&self.in_flight),
                    )
                    .boxed()
                    .shared();
                    *slot = Some((id, refresh.clone()));
                    refresh
                }
            }
        };

        refresh.await
    }

    async fn run(
        id: u64,
        session: Arc<SessionStore>,
        auth_api: Arc<dyn AuthApi>,
        refresh_token: String,
        slot: RefreshSlot,
    ) -> Result<String, ApiError> {
        let outcome = Self::refresh(&session, auth_api.as_ref(), &refresh_token).await;

        let mut slot = slot.lock();
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            *slot = None;
        }
        outcome
    }

    async fn refresh(
        session: &Arc<SessionStore>,
        auth_api: &dyn AuthApi,
        refresh_token: &str,
    ) -> Result<String, ApiError> {
        let epoch = session.begin_refresh().map_err(unavailable)?;

        info!("attempting token refresh");
        match auth_api.refresh(refresh_token).await {
            Ok(result) => match session.complete_refresh(epoch, &result) {
                Ok(token) => {
                    info!("token refresh succeeded");
                    Ok(token)
                }
                Err(SessionError::Superseded) => Err(ApiError::SessionExpired {
                    message: "Session ended during token refresh".to_string(),
                }),
                Err(err) => {
                    warn!(error = %err, "token refresh returned an unusable result");
                    session.abort_refresh(epoch);
                    Err(unavailable(err))
                }
            },
            Err(err) if err.is_auth_kind() => {
                warn!(status = err.status(), error = %err, "refresh token rejected, logging out");
                session.logout_if_current(epoch, false).await;
                Err(ApiError::SessionExpired { message: err.message().to_string() })
            }
            Err(err) => {
                warn!(status = err.status(), error = %err, "token refresh failed");
                session.abort_refresh(epoch);
                Err(ApiError::RefreshUnavailable { message: err.message().to_string() })
            }
        }
    }
}

fn unavailable(err: SessionError) -> ApiError {
    ApiError::RefreshUnavailable { message: err.to_string() }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}
