//! Infrastructure error conversions

mod conversions;

pub use conversions::{network_error, InfraError};
