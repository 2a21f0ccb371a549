#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use postline_common::{KeyValueStore, MemoryStore};
use postline_domain::{ApiConfig, ClientConfig, Credentials, StorageConfig};
use postline_infra::ClientContext;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const THEME_KEY: &str = "themeMode";

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api: ApiConfig { base_url: format!("{}/api", server.uri()), ..ApiConfig::default() },
        storage: StorageConfig::default(),
    }
}

pub fn session_body(access: &str, refresh: &str) -> Value {
    json!({
        "user": {"id": 1, "name": "Ann", "email": "ann@example.test"},
        "access_token": access,
        "refresh_token": refresh
    })
}

pub fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401)
        .set_body_json(json!({"message": "Token expired", "error_code": "auth_expired_token"}))
}

pub fn page_body(ids: &[u64], next: Option<String>) -> Value {
    let data: Vec<Value> =
        ids.iter().map(|id| json!({"id": id, "caption": format!("post {id}")})).collect();
    json!({
        "data": data,
        "meta": {"current_page": 1, "next_page_url": next, "total": ids.len()}
    })
}

pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(access, refresh)))
        .mount(server)
        .await;
}

/// Context over in-memory storage that already holds a theme preference.
pub fn context(server: &MockServer) -> (ClientContext, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    storage.set(THEME_KEY, "dark").unwrap();
    let context = ClientContext::with_storage(&config(server), storage.clone()).unwrap();
    (context, storage)
}

/// Context signed in with access token `t1` and refresh token `r1`.
pub async fn signed_in(server: &MockServer) -> (ClientContext, Arc<MemoryStore>) {
    mount_login(server, "t1", "r1").await;
    let (context, storage) = context(server);
    context.session.begin_login(&Credentials::new("ann@example.test", "secret")).await.unwrap();
    (context, storage)
}

/// Poll `check` until it holds or a second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
