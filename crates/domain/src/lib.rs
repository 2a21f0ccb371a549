//! # Postline Domain
//!
//! Wire and domain types shared by every Postline crate.
//!
//! This crate contains:
//! - Identity, session result and post types as the remote API serves them
//! - The pagination envelope and the identity contract used for merging
//! - The closed API error taxonomy and the crate-wide error type
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Postline crates
//! - Only serialization and error derive dependencies
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use types::*;
