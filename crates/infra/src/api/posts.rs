//! Post endpoints through the authenticated transport

use std::sync::Arc;

use async_trait::async_trait;
use postline_core::{PageRequest, PostsApi};
use postline_domain::{ApiError, EntityId, LikeResponse, NewPost, Page, Post, PostImage};
use reqwest::Method;

use super::endpoints::Endpoint;
use super::request::{ApiRequest, FormPart};
use super::transport::AuthenticatedTransport;

/// Form field carrying each uploaded image
const IMAGE_FIELD: &str = "images[]";

#[derive(Debug, Clone)]
pub struct RemotePostsApi {
    transport: Arc<AuthenticatedTransport>,
}

impl RemotePostsApi {
    pub fn new(transport: Arc<AuthenticatedTransport>) -> Self {
        Self { transport }
    }
}

fn listing(request: &PageRequest) -> ApiRequest {
    match request {
        PageRequest::Global => ApiRequest::to(Method::GET, &Endpoint::Posts),
        PageRequest::Owner(owner) => {
            ApiRequest::to(Method::GET, &Endpoint::ProfilePosts(owner.clone()))
        }
        PageRequest::Cursor(url) => ApiRequest::get(url.as_str()),
    }
}

fn create_form(post: &NewPost) -> Vec<FormPart> {
    let caption = post.caption.clone().unwrap_or_default();
    std::iter::once(FormPart::Text { name: "caption".into(), value: caption })
        .chain(
            post.images
                .iter()
                .map(|file| FormPart::File { name: IMAGE_FIELD.into(), file: file.clone() }),
        )
        .collect()
}

#[async_trait]
impl PostsApi for RemotePostsApi {
    async fn list(
        &self,
        request: &PageRequest,
        query: &[(String, String)],
    ) -> Result<Page<Post>, ApiError> {
        self.transport.send_json(listing(request).query(query)).await
    }

    async fn get(&self, id: &EntityId) -> Result<Post, ApiError> {
        self.transport.send_json(ApiRequest::to(Method::GET, &Endpoint::Post(id.clone()))).await
    }

    async fn images(&self, id: &EntityId) -> Result<Vec<PostImage>, ApiError> {
        self.transport
            .send_json(ApiRequest::to(Method::GET, &Endpoint::PostImages(id.clone())))
            .await
    }

    async fn like(&self, id: &EntityId) -> Result<Post, ApiError> {
        let response: LikeResponse = self
            .transport
            .send_json(ApiRequest::to(Method::POST, &Endpoint::Like(id.clone())))
            .await?;
        Ok(response.post)
    }

    async fn unlike(&self, id: &EntityId) -> Result<Post, ApiError> {
        let response: LikeResponse = self
            .transport
            .send_json(ApiRequest::to(Method::DELETE, &Endpoint::Unlike(id.clone())))
            .await?;
        Ok(response.post)
    }

    async fn create(&self, post: &NewPost) -> Result<Post, ApiError> {
        let request = ApiRequest::to(Method::POST, &Endpoint::Posts).multipart(create_form(post));
        self.transport.send_json(request).await
    }
}
