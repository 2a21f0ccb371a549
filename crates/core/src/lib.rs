//! # Postline Core
//!
//! Session and feed state for the Postline client. No HTTP, no files.
//!
//! This crate contains:
//! - Port interfaces (traits) for the remote API and logout notification
//! - The session store and its phase state machine
//! - The single-flight token refresh coordinator
//! - The paginated collection store
//!
//! ## Architecture Principles
//! - Only depends on `postline-domain` and `postline-common`
//! - All remote calls go through the traits in [`ports`]
//! - Shared state lives behind short synchronous locks that are never held
//!   across an `.await`

pub mod collections;
pub mod ports;
pub mod session;

pub use collections::{
    Collection, CollectionStore, FeedAction, FeedKind, FetchOptions, FetchOutcome,
};
pub use ports::{AuthApi, ImageLoader, PageRequest, PostsApi, SessionListener, UserApi};
pub use session::{
    RefreshCoordinator, Session, SessionError, SessionErrors, SessionPhase, SessionSnapshot,
    SessionStore,
};
