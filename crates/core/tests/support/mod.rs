//! Shared test helpers for `postline-core` integration tests.
//!
//! Scriptable port implementations so tests can focus on store behaviour
//! instead of HTTP plumbing.

#![allow(dead_code)]

pub mod ports;

use postline_domain::{AuthResult, Page, PageMeta, Post};
use serde_json::json;

/// Session result for user 1 with the given tokens.
pub fn auth_result(access_token: &str, refresh_token: &str) -> AuthResult {
    serde_json::from_value(json!({
        "user": {"id": 1, "name": "Ann", "profile_picture": "https://cdn.test/ann.png"},
        "access_token": access_token,
        "refresh_token": refresh_token,
    }))
    .expect("valid auth result")
}

/// A page of bare posts with an optional next cursor.
pub fn page(ids: &[u64], next_page_url: Option<&str>) -> Page<Post> {
    Page {
        data: ids.iter().map(|id| Post::new(*id)).collect(),
        meta: PageMeta {
            current_page: Some(1),
            next_page_url: next_page_url.map(str::to_string),
            ..PageMeta::default()
        },
    }
}

pub fn item_ids(items: &[Post]) -> Vec<String> {
    items.iter().map(|post| post.id.to_string()).collect()
}
