//! Session state and token refresh
//!
//! [`SessionStore`] owns the current identity and credentials and is the
//! only place they change. [`RefreshCoordinator`] guarantees that any number
//! of concurrently expiring requests share a single refresh call.

mod error;
mod refresh;
mod state;
mod store;

pub use error::SessionError;
pub use refresh::RefreshCoordinator;
pub use state::{Session, SessionErrors, SessionPhase, SessionSnapshot};
pub use store::SessionStore;
