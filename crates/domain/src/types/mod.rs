//! Domain types and models
//!
//! Shapes mirror the remote API's JSON so they round-trip through the
//! session storage and the wire without translation layers.

pub mod identity;
pub mod page;
pub mod post;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use identity::{AuthResult, Credentials, Identity, Registration};
pub use page::{Identified, Page, PageLink, PageMeta};
pub use post::{LikeResponse, NewPost, Post, PostImage, UploadFile};

/// Identifier of a remote entity; the API serves numbers, but strings are
/// tolerated for opaque ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl EntityId {
    /// Zero and empty ids are treated as missing, like the API does.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
