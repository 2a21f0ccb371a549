//! Mock implementations of the core ports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use postline_core::{AuthApi, ImageLoader, PageRequest, PostsApi, SessionListener, UserApi};
use postline_domain::{
    ApiError, AuthResult, Credentials, EntityId, Identity, NewPost, Page, Post, PostImage,
    Registration,
};
use tokio::sync::Semaphore;

/// `AuthApi` with scripted results and call counters.
pub struct MockAuthApi {
    login: Mutex<Result<AuthResult, ApiError>>,
    refreshes: Mutex<VecDeque<Result<AuthResult, ApiError>>>,
    refresh_delay: Duration,
    revoke: Result<(), ApiError>,
    pub refresh_calls: AtomicUsize,
    pub revoke_calls: AtomicUsize,
    pub revoked_tokens: Mutex<Vec<String>>,
}

impl MockAuthApi {
    pub fn new(login: Result<AuthResult, ApiError>) -> Self {
        Self {
            login: Mutex::new(login),
            refreshes: Mutex::new(VecDeque::new()),
            refresh_delay: Duration::from_millis(0),
            revoke: Ok(()),
            refresh_calls: AtomicUsize::new(0),
            revoke_calls: AtomicUsize::new(0),
            revoked_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn with_refresh(self, result: Result<AuthResult, ApiError>) -> Self {
        self.refreshes.lock().push_back(result);
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_failing_revoke(mut self) -> Self {
        self.revoke = Err(ApiError::network("connection reset"));
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn revoke_count(&self) -> usize {
        self.revoke_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthResult, ApiError> {
        self.login.lock().clone()
    }

    async fn register(&self, _registration: &Registration) -> Result<AuthResult, ApiError> {
        self.login.lock().clone()
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AuthResult, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.refresh_delay).await;
        self.refreshes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("no scripted refresh")))
    }

    async fn revoke(&self, access_token: &str) -> Result<(), ApiError> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        self.revoked_tokens.lock().push(access_token.to_string());
        self.revoke.clone()
    }
}

/// `ImageLoader` returning a fixed data URL.
pub struct StaticImageLoader(pub Result<String, ApiError>);

#[async_trait]
impl ImageLoader for StaticImageLoader {
    async fn load_data_url(&self, _url: &str) -> Result<String, ApiError> {
        self.0.clone()
    }
}

/// `UserApi` returning a fixed identity.
pub struct StaticUserApi(pub Result<Identity, ApiError>);

#[async_trait]
impl UserApi for StaticUserApi {
    async fn fetch_current_user(&self) -> Result<Identity, ApiError> {
        self.0.clone()
    }
}

/// `PostsApi` serving scripted pages.
///
/// When gated, every `list` call waits for [`MockPostsApi::release`].
pub struct MockPostsApi {
    pages: Mutex<VecDeque<Result<Page<Post>, ApiError>>>,
    gate: Semaphore,
    pub requests: Mutex<Vec<(PageRequest, Vec<(String, String)>)>>,
    pub posts: Mutex<Vec<Post>>,
    next_id: AtomicUsize,
}

impl MockPostsApi {
    pub fn new() -> Self {
        Self::with_permits(Semaphore::MAX_PERMITS)
    }

    pub fn gated() -> Self {
        Self::with_permits(0)
    }

    fn with_permits(permits: usize) -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            gate: Semaphore::new(permits),
            requests: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(100),
        }
    }

    pub fn push_page(&self, page: Result<Page<Post>, ApiError>) -> &Self {
        self.pages.lock().push_back(page);
        self
    }

    pub fn with_post(self, post: Post) -> Self {
        self.posts.lock().push(post);
        self
    }

    /// Let one gated `list` call proceed.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().iter().map(|(request, _)| request.clone()).collect()
    }

    fn find(&self, id: &EntityId) -> Result<Post, ApiError> {
        self.posts
            .lock()
            .iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound { message: "Not Found".into() })
    }
}

#[async_trait]
impl PostsApi for MockPostsApi {
    async fn list(
        &self,
        request: &PageRequest,
        query: &[(String, String)],
    ) -> Result<Page<Post>, ApiError> {
        self.requests.lock().push((request.clone(), query.to_vec()));
        let permit = self.gate.acquire().await.map_err(|e| ApiError::network(e.to_string()))?;
        permit.forget();
        self.pages.lock().pop_front().unwrap_or_else(|| Err(ApiError::network("no scripted page")))
    }

    async fn get(&self, id: &EntityId) -> Result<Post, ApiError> {
        self.find(id)
    }

    async fn images(&self, id: &EntityId) -> Result<Vec<PostImage>, ApiError> {
        let post = self.find(id)?;
        Ok(vec![PostImage {
            id: EntityId::Number(1),
            url: Some(format!("https://cdn.test/{}.png", post.id)),
            extra: serde_json::Map::new(),
        }])
    }

    async fn like(&self, id: &EntityId) -> Result<Post, ApiError> {
        let mut post = self.find(id)?;
        post.is_liked = true;
        post.likes_count += 1;
        Ok(post)
    }

    async fn unlike(&self, id: &EntityId) -> Result<Post, ApiError> {
        let mut post = self.find(id)?;
        post.is_liked = false;
        post.likes_count = post.likes_count.saturating_sub(1);
        Ok(post)
    }

    async fn create(&self, payload: &NewPost) -> Result<Post, ApiError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
        let mut post = Post::new(id);
        post.caption = payload.caption.clone();
        Ok(post)
    }
}

/// Counts logout notifications.
#[derive(Default)]
pub struct CountingListener(pub AtomicUsize);

impl CountingListener {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SessionListener for CountingListener {
    fn on_logout(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
