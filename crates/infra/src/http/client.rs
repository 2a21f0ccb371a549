use std::time::Duration;

use postline_domain::{ApiError, PostlineError, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS};
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response};
use tracing::debug;

use crate::errors::{network_error, InfraError};

/// HTTP client with built-in retry and timeout support.
///
/// Only idempotent requests (`GET`, `HEAD`) are retried, and only on 5xx
/// responses or connection-level failures. Everything else is sent once.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, PostlineError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Any response, including 4xx/5xx, is returned as `Ok`; `Err` means no
    /// response was received.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|err| network_error(&err))?;
        let attempts = if is_idempotent(request.method()) { self.max_attempts.max(1) } else { 1 };

        let mut pending = Some(request);
        for attempt in 1..=attempts {
            let Some(request) = pending.take() else { break };
            let (request, spare) = split_for_retry(request, attempt < attempts);

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && spare.is_some() {
                        pending = spare;
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    if spare.is_some() && should_retry_error(&err) {
                        pending = spare;
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Err(network_error(&err));
                }
            }
        }

        Err(ApiError::network("http client exhausted retries without producing a result"))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

// Keep an untouched copy for the next attempt when the body can be cloned.
fn split_for_retry(request: Request, retry_possible: bool) -> (Request, Option<Request>) {
    if !retry_possible {
        return (request, None);
    }
    match request.try_clone() {
        Some(copy) => (copy, Some(request)),
        None => (request, None),
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, PostlineError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| PostlineError::from(InfraError::from(err)))?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}
