//! Base API client
//!
//! Sends [`ApiRequest`]s over the [`HttpClient`], applying the client-wide
//! request defaults, and normalizes every failure into [`ApiError`]. It
//! knows nothing about sessions; bearer injection and the refresh protocol
//! live in [`super::transport`].

use std::time::Duration;

use postline_domain::{
    ApiConfig, ApiError, ErrorBody, PostlineError, NGROK_HOST_SUFFIX, NGROK_SKIP_WARNING_HEADER,
};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

use super::endpoints::Endpoints;
use super::request::{ApiRequest, ApiResponse, RequestBody};
use crate::errors::network_error;
use crate::http::HttpClient;

const JSON: &str = "application/json";

/// HTTP client bound to one API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    endpoints: Endpoints,
    skip_ngrok_warning: bool,
}

impl ApiClient {
    /// Build a client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, PostlineError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_attempts)
            .user_agent(concat!("postline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http(http, &config.base_url)
    }

    pub fn with_http(http: HttpClient, base_url: &str) -> Result<Self, PostlineError> {
        let endpoints = Endpoints::new(base_url)?;
        let skip_ngrok_warning =
            endpoints.base().host_str().is_some_and(|host| host.ends_with(NGROK_HOST_SUFFIX));
        Ok(Self { http, endpoints, skip_ngrok_warning })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn resolve(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        self.endpoints.resolve(&request.target)
    }

    /// Send a request once
    ///
    /// Non-2xx responses become [`ApiError::from_response`]; a missing
    /// response becomes a network error with status 500.
    #[instrument(skip_all, fields(method = %request.method, target = %request.target))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(request)?;
        let request_id = Uuid::new_v4();

        let mut headers = request.headers.clone();
        if request.body.is_multipart() {
            headers.remove(CONTENT_TYPE);
        } else if !request.raw && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        if !request.raw && !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        }
        if self.skip_ngrok_warning {
            headers.insert(
                HeaderName::from_static(NGROK_SKIP_WARNING_HEADER),
                HeaderValue::from_static("true"),
            );
        }

        let mut builder = self.http.request(request.method.clone(), url.clone()).headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(
                serde_json::to_vec(value)
                    .map_err(|err| super::request::local_error(err.to_string()))?,
            ),
            RequestBody::Multipart(parts) => builder.multipart(RequestBody::to_form(parts)?),
        };

        debug!(%request_id, %url, "sending request");
        let response = self.http.send(builder).await.inspect_err(|err| {
            info!(%request_id, %url, error = %err, "request failed without response");
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| network_error(&err))?.to_vec();

        if (200..300).contains(&status) {
            debug!(%request_id, status, "request fulfilled");
            return Ok(ApiResponse { status, headers, body });
        }

        let err = ApiError::from_response(status, ErrorBody::parse(&body));
        info!(
            %request_id,
            %url,
            status,
            error_code = err.error_code().unwrap_or_default(),
            "request failed"
        );
        Err(err)
    }
}
