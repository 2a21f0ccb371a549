//! Remote API client for Postline
//!
//! HTTP adapters implementing the ports of `postline-core`.
//!
//! # Architecture
//!
//! - [`ApiClient`] sends one request over the retrying [`crate::http::HttpClient`]
//!   and normalizes failures into `ApiError`
//! - [`AuthenticatedTransport`] adds the session's bearer token and the
//!   refresh-and-retry-once protocol on top of it
//! - `auth/*` adapters use the bare client; everything session-scoped goes
//!   through the transport

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod posts;
pub mod request;
pub mod transport;

pub use auth::{RemoteAuthApi, RemoteImageLoader, RemoteUserApi};
pub use client::ApiClient;
pub use endpoints::{Endpoint, Endpoints};
pub use posts::RemotePostsApi;
pub use request::{ApiRequest, ApiResponse, FormPart, RequestBody};
pub use transport::AuthenticatedTransport;
