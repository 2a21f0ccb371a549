//! Observability infrastructure
//!
//! Everything in the workspace logs through `tracing` with key/value
//! fields. This module installs the subscriber that renders those events.

pub mod logging;

pub use logging::{init_logging, LogFormat};
