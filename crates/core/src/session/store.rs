//! Session store
//!
//! Holds the session behind a synchronous lock and drives the phase state
//! machine. Remote calls happen between two short critical sections; an
//! epoch counter, bumped on every login attempt and every logout, lets the
//! second section detect that the session moved on while it was awaiting.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use postline_common::{KeyValueStore, KeyValueStoreExt};
use postline_domain::{
    ApiError, AuthResult, Credentials, Identity, Registration, StorageConfig,
};
use tracing::{debug, info, instrument, warn};

use super::error::SessionError;
use super::state::{Session, SessionErrors, SessionPhase, SessionSnapshot};
use crate::ports::{AuthApi, ImageLoader, SessionListener, UserApi};

#[derive(Debug, Default)]
struct SessionState {
    session: Session,
    phase: SessionPhase,
    epoch: u64,
    errors: SessionErrors,
}

impl SessionState {
    fn transition(&mut self, next: SessionPhase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(next) {
            return Err(SessionError::Busy(self.phase));
        }
        debug!(from = %self.phase, to = %next, "session phase transition");
        self.phase = next;
        Ok(())
    }
}

/// Owner of the current identity and credentials
pub struct SessionStore {
    state: RwLock<SessionState>,
    auth_api: Arc<dyn AuthApi>,
    image_loader: Option<Arc<dyn ImageLoader>>,
    storage: Arc<dyn KeyValueStore>,
    storage_key: String,
    preserved_keys: Vec<String>,
    listeners: RwLock<Vec<Weak<dyn SessionListener>>>,
}

impl SessionStore {
    /// Create a store and rehydrate it from `storage`
    ///
    /// A persisted session that is not authenticated (or cannot be parsed)
    /// is ignored and the store starts empty.
    pub fn new(
        auth_api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStore>,
        config: &StorageConfig,
    ) -> Self {
        let store = Self {
            state: RwLock::new(SessionState::default()),
            auth_api,
            image_loader: None,
            storage,
            storage_key: config.session_key.clone(),
            preserved_keys: config.preserved_keys.clone(),
            listeners: RwLock::new(Vec::new()),
        };
        store.restore();
        store
    }

    /// Materialize profile pictures as data URLs after authentication
    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.image_loader = Some(loader);
        self
    }

    /// Register a logout listener
    ///
    /// Only a weak reference is kept, so a listener that holds this store
    /// does not keep itself alive.
    pub fn add_listener<L: SessionListener + 'static>(&self, listener: &Arc<L>) {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn SessionListener> = weak;
        self.listeners.write().push(weak);
    }

    fn restore(&self) {
        let restored = match self.storage.get_json::<Session>(&self.storage_key) {
            Ok(Some(session)) if session.is_authenticated() => session,
            Ok(_) => return,
            Err(err) => {
                warn!(
                    key = %self.storage_key,
                    error = %err,
                    "discarding unreadable persisted session"
                );
                return;
            }
        };

        let mut state = self.state.write();
        state.session = restored;
        state.phase = SessionPhase::Authenticated;
        info!("restored persisted session");
    }

    // Called with the write lock held so storage order matches state order.
    fn persist(&self, session: &Session) {
        if let Err(err) = self.storage.set_json(&self.storage_key, session, false) {
            warn!(key = %self.storage_key, error = %err, "failed to persist session");
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            session: state.session.clone(),
            phase: state.phase,
            errors: state.errors.clone(),
        }
    }

    pub fn session(&self) -> Session {
        self.state.read().session.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn errors(&self) -> SessionErrors {
        self.state.read().errors.clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.state.read().session.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().session.access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().session.refresh_token.clone()
    }

    /// Monotonic counter identifying the current login/logout cycle
    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    pub fn clear_errors(&self) {
        self.state.write().errors = SessionErrors::default();
    }

    /// Log in with email and password
    ///
    /// Only allowed while unauthenticated. A remote failure is recorded in
    /// `login_error` and returned.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn begin_login(
        self: &Arc<Self>,
        credentials: &Credentials,
    ) -> Result<Session, SessionError> {
        let epoch = self.begin_authenticating()?;
        let result = self.auth_api.login(credentials).await;
        self.finish_authenticating(epoch, result)
    }

    /// Create an account; the server answers with a session like login does
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(
        self: &Arc<Self>,
        registration: &Registration,
    ) -> Result<Session, SessionError> {
        let epoch = self.begin_authenticating()?;
        let result = self.auth_api.register(registration).await;
        self.finish_authenticating(epoch, result)
    }

    fn begin_authenticating(&self) -> Result<u64, SessionError> {
        let mut state = self.state.write();
        state.transition(SessionPhase::Authenticating)?;
        state.errors = SessionErrors::default();
        state.epoch += 1;
        Ok(state.epoch)
    }

    fn finish_authenticating(
        self: &Arc<Self>,
        epoch: u64,
        result: Result<AuthResult, ApiError>,
    ) -> Result<Session, SessionError> {
        let session = {
            let mut state = self.state.write();
            if state.epoch != epoch {
                return Err(SessionError::Superseded);
            }

            match result {
                Ok(result) if result.is_well_formed() => {
                    self.apply_locked(&mut state, &result);
                    state.session.clone()
                }
                Ok(_) => {
                    state.phase = SessionPhase::Unauthenticated;
                    warn!("authentication response carried no user id or access token");
                    return Err(SessionError::MalformedResult);
                }
                Err(err) => {
                    state.phase = SessionPhase::Unauthenticated;
                    state.errors.login_error = Some(err.clone());
                    info!(status = err.status(), "authentication failed");
                    return Err(SessionError::Api(err));
                }
            }
        };

        info!("authenticated");
        self.schedule_profile_picture(epoch, &session);
        Ok(session)
    }

    /// Store a login or refresh result
    ///
    /// Returns `false` without touching anything when the result lacks a
    /// user id or access token, or when the session is not in a phase that
    /// accepts credentials (signed out, or logging out).
    pub fn apply_authentication_result(self: &Arc<Self>, result: &AuthResult) -> bool {
        if !result.is_well_formed() {
            return false;
        }

        let (epoch, session) = {
            let mut state = self.state.write();
            if !state.phase.accepts_credentials() {
                return false;
            }
            self.apply_locked(&mut state, result);
            (state.epoch, state.session.clone())
        };

        self.schedule_profile_picture(epoch, &session);
        true
    }

    fn apply_locked(&self, state: &mut SessionState, result: &AuthResult) {
        let user =
            result.user.clone().map(|user| Identity { profile_picture_base64: None, ..user });
        let refresh_token = result
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| state.session.refresh_token.take());

        state.session =
            Session { user, access_token: result.access_token.clone(), refresh_token };
        state.phase = SessionPhase::Authenticated;
        self.persist(&state.session);
    }

    fn schedule_profile_picture(self: &Arc<Self>, epoch: u64, session: &Session) {
        let Some(loader) = self.image_loader.clone() else { return };
        let Some(user) = session.user.as_ref() else { return };
        let Some(url) = user.profile_picture.clone().filter(|u| !u.is_empty()) else { return };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, skipping profile picture");
            return;
        };

        let store = Arc::clone(self);
        let user_id = user.id.clone();
        runtime.spawn(async move {
            match loader.load_data_url(&url).await {
                Ok(data_url) => store.set_profile_picture(epoch, user_id.as_ref(), data_url),
                Err(err) => warn!(error = %err, "profile picture unavailable"),
            }
        });
    }

    fn set_profile_picture(
        &self,
        epoch: u64,
        user_id: Option<&postline_domain::EntityId>,
        data_url: String,
    ) {
        let mut state = self.state.write();
        if state.epoch != epoch {
            return;
        }
        let state = &mut *state;
        let Some(user) = state.session.user.as_mut() else { return };
        if user.id.as_ref() != user_id {
            return;
        }
        user.profile_picture_base64 = Some(data_url);
        self.persist(&state.session);
    }

    /// Reload the signed-in user's profile
    ///
    /// The stored identity is replaced only when the response carries an
    /// id. Failures are recorded in `fetch_user_error`.
    pub async fn fetch_auth_user(&self, api: &dyn UserApi) -> Result<Identity, SessionError> {
        let epoch = {
            let mut state = self.state.write();
            state.errors = SessionErrors::default();
            state.epoch
        };

        let result = api.fetch_current_user().await;

        let mut state = self.state.write();
        match result {
            Ok(identity) => {
                if state.epoch == epoch && state.session.is_authenticated() && identity.has_id() {
                    let previous = state.session.user.take();
                    let mut user = identity.clone();
                    if let Some(previous) = previous {
                        if previous.profile_picture == user.profile_picture {
                            user.profile_picture_base64 = previous.profile_picture_base64;
                        }
                    }
                    state.session.user = Some(user);
                    self.persist(&state.session);
                }
                Ok(identity)
            }
            Err(err) => {
                state.errors.fetch_user_error = Some(err.clone());
                Err(SessionError::Api(err))
            }
        }
    }

    /// Enter `RefreshingToken`; returns the epoch the refresh belongs to
    pub fn begin_refresh(&self) -> Result<u64, SessionError> {
        let mut state = self.state.write();
        state.transition(SessionPhase::RefreshingToken)?;
        Ok(state.epoch)
    }

    /// Apply a refresh result and return the new access token
    pub fn complete_refresh(
        self: &Arc<Self>,
        epoch: u64,
        result: &AuthResult,
    ) -> Result<String, SessionError> {
        let (token, session) = {
            let mut state = self.state.write();
            if state.epoch != epoch || state.phase != SessionPhase::RefreshingToken {
                return Err(SessionError::Superseded);
            }
            if !result.is_well_formed() {
                state.phase = SessionPhase::Authenticated;
                return Err(SessionError::MalformedResult);
            }
            self.apply_locked(&mut state, result);
            (state.session.access_token.clone().unwrap_or_default(), state.session.clone())
        };

        self.schedule_profile_picture(epoch, &session);
        Ok(token)
    }

    /// Leave `RefreshingToken` with the session intact
    pub fn abort_refresh(&self, epoch: u64) {
        let mut state = self.state.write();
        if state.epoch == epoch && state.phase == SessionPhase::RefreshingToken {
            state.phase = SessionPhase::Authenticated;
        }
    }

    /// Sign out locally, optionally revoking the access token remotely
    ///
    /// Always succeeds: a failing revoke or storage backend is logged and
    /// the local state is cleared regardless. A logout already in progress
    /// makes this a no-op.
    #[instrument(skip(self))]
    pub async fn logout(&self, revoke_remote: bool) {
        self.logout_inner(None, revoke_remote).await;
    }

    /// Logout that only runs if no login/logout happened since `epoch`
    pub(crate) async fn logout_if_current(&self, epoch: u64, revoke_remote: bool) -> bool {
        self.logout_inner(Some(epoch), revoke_remote).await
    }

    async fn logout_inner(&self, expected_epoch: Option<u64>, revoke_remote: bool) -> bool {
        let token = {
            let mut state = self.state.write();
            if expected_epoch.is_some_and(|epoch| epoch != state.epoch) {
                return false;
            }
            if state.transition(SessionPhase::LoggingOut).is_err() {
                debug!("logout already in progress");
                return false;
            }
            state.epoch += 1;
            state.session.access_token.clone()
        };

        if revoke_remote {
            if let Some(token) = token.as_deref() {
                if let Err(err) = self.auth_api.revoke(token).await {
                    warn!(error = %err, "remote token revoke failed");
                }
            }
        }

        let keep: Vec<&str> = self.preserved_keys.iter().map(String::as_str).collect();
        if let Err(err) = self.storage.clear_all_except(&keep) {
            warn!(error = %err, "failed to clear persisted state on logout");
        }

        {
            let mut state = self.state.write();
            state.session = Session::default();
            state.errors = SessionErrors::default();
            state.phase = SessionPhase::Unauthenticated;
        }
        info!("logged out");

        let listeners: Vec<_> = {
            let mut registered = self.listeners.write();
            registered.retain(|listener| listener.strong_count() > 0);
            registered.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in listeners {
            listener.on_logout();
        }
        true
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionStore")
            .field("phase", &state.phase)
            .field("epoch", &state.epoch)
            .field("authenticated", &state.session.is_authenticated())
            .finish_non_exhaustive()
    }
}
