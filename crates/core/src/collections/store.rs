//! Collection store
//!
//! One [`Collection`] per feed behind a synchronous mutex. A fetch plans
//! under the lock, awaits the remote call with the lock released, then
//! applies the response under the lock again, provided the feed's
//! generation has not moved in the meantime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use postline_domain::{ApiError, EntityId, NewPost, Post, PostImage};
use tracing::{debug, instrument, warn};

use super::collection::Collection;
use crate::ports::{PageRequest, PostsApi, SessionListener};

/// The feeds kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedKind {
    Global,
    ByOwner,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Global, FeedKind::ByOwner];
}

/// Named fetch action, as issued by views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    FetchGlobal,
    FetchByOwner,
}

impl FeedAction {
    /// Parse an action name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "fetch_posts" | "fetch_global" => Some(Self::FetchGlobal),
            "fetch_user_posts" | "fetch_by_owner" => Some(Self::FetchByOwner),
            _ => None,
        }
    }

    pub fn kind(self) -> FeedKind {
        match self {
            Self::FetchGlobal => FeedKind::Global,
            Self::FetchByOwner => FeedKind::ByOwner,
        }
    }

    fn requires_owner(self) -> bool {
        matches!(self, Self::FetchByOwner)
    }
}

type ErrorCallback = Box<dyn FnOnce(&ApiError) + Send>;

/// Parameters of [`CollectionStore::fetch_page`]
#[derive(Default)]
pub struct FetchOptions {
    /// Follow `next_page_url` and append instead of loading page one
    pub paginate: bool,
    /// Extra query parameters sent with the listing request
    pub query: Vec<(String, String)>,
    pub owner_id: Option<EntityId>,
    /// Invoked with the failure, after the collection has recorded it
    pub on_error: Option<ErrorCallback>,
}

impl FetchOptions {
    pub fn first_page() -> Self {
        Self::default()
    }

    pub fn next_page() -> Self {
        Self { paginate: true, ..Self::default() }
    }

    pub fn owner(mut self, owner_id: impl Into<EntityId>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&ApiError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("paginate", &self.paginate)
            .field("query", &self.query)
            .field("owner_id", &self.owner_id)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// What a call to [`CollectionStore::fetch_page`] did
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Unknown action, a fetch already running, or no further page
    Skipped,
    /// The collection was emptied and no request was made
    Reset,
    /// A page was applied; `added` counts new items
    Loaded { added: usize },
    /// A newer fetch or a reset superseded this one; the response was dropped
    Stale,
    Failed(ApiError),
}

#[derive(Debug, Default)]
struct FeedSlot {
    collection: Collection<Post>,
    generation: u64,
}

impl FeedSlot {
    fn reset(&mut self) {
        self.collection = Collection::default();
        self.generation += 1;
    }
}

enum Plan {
    FirstPage(Option<EntityId>),
    NextPage(String),
}

/// Paginated post feeds
pub struct CollectionStore {
    posts_api: Arc<dyn PostsApi>,
    feeds: Mutex<BTreeMap<FeedKind, FeedSlot>>,
}

impl CollectionStore {
    pub fn new(posts_api: Arc<dyn PostsApi>) -> Self {
        let feeds = FeedKind::ALL.into_iter().map(|kind| (kind, FeedSlot::default())).collect();
        Self { posts_api, feeds: Mutex::new(feeds) }
    }

    /// Snapshot of one feed
    pub fn collection(&self, kind: FeedKind) -> Collection<Post> {
        self.feeds.lock().get(&kind).map(|slot| slot.collection.clone()).unwrap_or_default()
    }

    /// Load the first page of a feed, or the next one when paginating
    ///
    /// Pagination only proceeds when the feed is idle and has a
    /// `next_page_url`. Paginating an owner feed for a different owner
    /// resets it and loads that owner's first page instead.
    #[instrument(skip(self, options), fields(paginate = options.paginate))]
    pub async fn fetch_page(&self, action: &str, options: FetchOptions) -> FetchOutcome {
        let Some(action) = FeedAction::parse(action) else {
            debug!("ignoring unknown feed action");
            return FetchOutcome::Skipped;
        };
        let kind = action.kind();
        let FetchOptions { paginate, query, owner_id, on_error } = options;

        let (plan, generation) = {
            let mut feeds = self.feeds.lock();
            let slot = feeds.entry(kind).or_default();

            let plan = if paginate {
                if slot.collection.is_fetching {
                    return FetchOutcome::Skipped;
                }
                let Some(next) = slot.collection.page_meta.next_page_url.clone() else {
                    return FetchOutcome::Skipped;
                };

                let owner_changed = action.requires_owner()
                    && slot.collection.owner_id.is_some()
                    && slot.collection.owner_id != owner_id;
                if owner_changed {
                    debug!(
                        from = ?slot.collection.owner_id,
                        to = ?owner_id,
                        "owner changed, restarting feed"
                    );
                    slot.reset();
                    match owner_id {
                        Some(owner) => Plan::FirstPage(Some(owner)),
                        None => return FetchOutcome::Reset,
                    }
                } else {
                    Plan::NextPage(next)
                }
            } else if action.requires_owner() {
                match owner_id {
                    Some(owner) => Plan::FirstPage(Some(owner)),
                    None => {
                        slot.reset();
                        return FetchOutcome::Reset;
                    }
                }
            } else {
                Plan::FirstPage(None)
            };

            if let Plan::FirstPage(owner) = &plan {
                slot.generation += 1;
                slot.collection.owner_id = owner.clone();
            }
            slot.collection.is_fetching = true;
            (plan, slot.generation)
        };

        let request = match &plan {
            Plan::FirstPage(Some(owner)) => PageRequest::Owner(owner.clone()),
            Plan::FirstPage(None) => PageRequest::Global,
            Plan::NextPage(url) => PageRequest::Cursor(url.clone()),
        };
        let result = self.posts_api.list(&request, &query).await;

        let error = {
            let mut feeds = self.feeds.lock();
            let slot = feeds.entry(kind).or_default();
            if slot.generation != generation {
                debug!(generation, current = slot.generation, "discarding stale page");
                return FetchOutcome::Stale;
            }

            let collection = &mut slot.collection;
            collection.is_fetching = false;
            collection.initial_fetch_done = true;

            match result {
                Ok(page) => {
                    collection.last_error = None;
                    let added = match plan {
                        Plan::FirstPage(_) => collection.replace_page(page),
                        Plan::NextPage(_) => collection.merge_page(page),
                    };
                    return FetchOutcome::Loaded { added };
                }
                Err(err) => {
                    collection.last_error = Some(err.clone());
                    err
                }
            }
        };

        warn!(status = error.status(), error = %error, "feed fetch failed");
        if let Some(callback) = on_error {
            callback(&error);
        }
        FetchOutcome::Failed(error)
    }

    /// Replace every copy of `item` in every feed; returns how many feeds changed
    pub fn apply_item_update(&self, item: &Post) -> usize {
        if item.id.is_blank() {
            return 0;
        }
        let mut feeds = self.feeds.lock();
        feeds
            .values_mut()
            .map(|slot| slot.collection.replace_item(item))
            .filter(|changed| *changed)
            .count()
    }

    /// Upload a new post and put it at the top of the global feed
    #[instrument(skip_all, fields(images = payload.images.len()))]
    pub async fn create_item(&self, payload: &NewPost) -> Result<Post, ApiError> {
        let post = self.posts_api.create(payload).await?;

        let mut feeds = self.feeds.lock();
        feeds.entry(FeedKind::Global).or_default().collection.prepend(post.clone());
        Ok(post)
    }

    /// Fetch one post and refresh its copies in every feed
    pub async fn get_item(&self, id: &EntityId) -> Result<Post, ApiError> {
        let post = self.posts_api.get(id).await?;
        self.apply_item_update(&post);
        Ok(post)
    }

    pub async fn get_item_images(&self, id: &EntityId) -> Result<Vec<PostImage>, ApiError> {
        self.posts_api.images(id).await
    }

    /// Like or unlike depending on the post's current `is_liked`
    pub async fn toggle_like(&self, post: &Post) -> Result<Post, ApiError> {
        let updated = if post.is_liked {
            self.posts_api.unlike(&post.id).await?
        } else {
            self.posts_api.like(&post.id).await?
        };
        self.apply_item_update(&updated);
        Ok(updated)
    }

    pub fn clear_errors(&self) {
        for slot in self.feeds.lock().values_mut() {
            slot.collection.last_error = None;
        }
    }

    /// Empty every feed; in-flight fetches become stale
    pub fn reset_all(&self) {
        for slot in self.feeds.lock().values_mut() {
            slot.reset();
        }
    }
}

impl SessionListener for CollectionStore {
    fn on_logout(&self) {
        debug!("session ended, resetting feeds");
        self.reset_all();
    }
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feeds = self.feeds.lock();
        let mut debug = f.debug_struct("CollectionStore");
        for (kind, slot) in feeds.iter() {
            debug.field(&format!("{kind:?}"), &slot.collection.items.len());
        }
        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(FeedAction::parse("fetch_posts"), Some(FeedAction::FetchGlobal));
        assert_eq!(
            FeedAction::parse("fetch_user_posts").map(FeedAction::kind),
            Some(FeedKind::ByOwner)
        );
        assert_eq!(FeedAction::parse("fetch_comments"), None);
    }

    #[test]
    fn options_builder() {
        let options = FetchOptions::next_page().owner(3u64).query("per_page", "10");
        assert!(options.paginate);
        assert_eq!(options.owner_id, Some(EntityId::Number(3)));
        assert_eq!(options.query, vec![("per_page".to_string(), "10".to_string())]);
    }
}
