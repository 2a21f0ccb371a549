//! # Postline Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The retrying HTTP client and the API client built on it
//! - The authenticated transport (bearer injection, refresh and retry once)
//! - HTTP adapters for the auth, user, image and post ports
//! - Configuration loading and logging setup
//! - [`ClientContext`], which wires all of the above together
//!
//! ## Architecture
//! - Implements traits defined in `postline-core`
//! - Depends on `postline-domain`, `postline-common` and `postline-core`
//! - Contains all "impure" code (network, files, environment)

pub mod api;
pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiRequest, ApiResponse, AuthenticatedTransport};
pub use context::ClientContext;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_logging, LogFormat};
