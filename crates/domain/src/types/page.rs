//! Pagination envelope shared by every listing endpoint.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Items that can be merged by identity.
pub trait Identified {
    fn id(&self) -> &EntityId;
}

/// One entry of the envelope's `links` array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Server pagination metadata. Replaced wholesale on every fetch.
///
/// `next_page_url` and `prev_page_url` are opaque cursors: the collection
/// store follows them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: Option<u64>,
    #[serde(default)]
    pub first_page_url: Option<String>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub last_page: Option<u64>,
    #[serde(default)]
    pub last_page_url: Option<String>,
    #[serde(default)]
    pub links: Vec<PageLink>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl PageMeta {
    pub fn has_more_pages(&self) -> bool {
        self.next_page_url.is_some()
    }

    /// True once a page has been received and no further cursor exists.
    pub fn is_last_page(&self) -> bool {
        self.current_page.is_some() && self.next_page_url.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.total == Some(0)
    }
}

/// `{data, meta}` listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn derived_flags_follow_cursors() {
        let initial = PageMeta::default();
        assert!(!initial.has_more_pages());
        assert!(!initial.is_last_page());
        assert!(!initial.is_empty());

        let middle: PageMeta = serde_json::from_value(json!({
            "current_page": 2,
            "next_page_url": "https://api.test/posts?page=3",
            "total": 40
        }))
        .unwrap();
        assert!(middle.has_more_pages());
        assert!(!middle.is_last_page());

        let last: PageMeta = serde_json::from_value(json!({
            "current_page": 1,
            "next_page_url": null,
            "total": 0
        }))
        .unwrap();
        assert!(last.is_last_page());
        assert!(last.is_empty());
    }

    #[test]
    fn envelope_tolerates_extra_server_flags() {
        let meta: PageMeta = serde_json::from_value(json!({
            "current_page": 1,
            "is_last_page": true,
            "has_more_pages": false,
            "links": [{"url": null, "label": "&laquo; Previous", "active": false}]
        }))
        .unwrap();

        assert_eq!(meta.links.len(), 1);
        assert!(meta.is_last_page());
    }
}
