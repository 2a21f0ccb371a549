//! Posts, their images, and the create payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page::Identified;
use super::EntityId;

/// A feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Author, image and comment payloads kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Post {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            caption: None,
            is_liked: false,
            likes_count: 0,
            created_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Identified for Post {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Image attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    pub id: EntityId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `{post}` returned by the like/unlike endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub post: Post,
}

/// File part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Payload for creating a post; sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPost {
    pub caption: Option<String>,
    pub images: Vec<UploadFile>,
}

impl NewPost {
    pub fn with_caption(caption: impl Into<String>) -> Self {
        Self { caption: Some(caption.into()), images: Vec::new() }
    }

    pub fn image(mut self, file: UploadFile) -> Self {
        self.images.push(file);
        self
    }
}
