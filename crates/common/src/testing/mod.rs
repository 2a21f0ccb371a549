//! Testing utilities and helpers
//!
//! - **[`mocks`]**: stores that fail or record on demand
//! - **[`temp`]**: file-backed storage in a self-cleaning directory

pub mod mocks;
pub mod temp;

pub use mocks::{FailingStore, StoreOp};
pub use temp::TempStorage;
