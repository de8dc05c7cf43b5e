//! HTTP transport seam between the fetcher and the network.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use crate::error::{FxError, FxResult};

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a new response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for issuing GET requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a single GET request. Non-success statuses are returned as
    /// responses; only failures to obtain a response are errors.
    async fn get(&self, url: &str) -> FxResult<HttpResponse>;
}

/// Transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with an explicit per-request timeout.
    pub fn new(timeout: Duration, user_agent: &str) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FxError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FxResult<HttpResponse> {
        let transport_error = |e: reqwest::Error| FxError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        trace!(url, status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse { status, body })
    }
}

/// Canned response for [`MockTransport`].
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer with this status and body.
    Reply(HttpResponse),
    /// Fail as if the connection broke.
    NetworkError,
}

/// Mock transport for testing.
///
/// Unregistered URLs answer 404. Every request is recorded.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MockTransport {
    responses: dashmap::DashMap<String, MockResponse>,
    requests: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 200 and the given body.
    pub fn respond_ok(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses
            .insert(url.into(), MockResponse::Reply(HttpResponse::new(200, body)));
    }

    /// Answer `url` with the given status and an empty body.
    pub fn respond_status(&self, url: impl Into<String>, status: u16) {
        self.responses
            .insert(url.into(), MockResponse::Reply(HttpResponse::new(status, "")));
    }

    /// Fail requests to `url` with a transport error.
    pub fn fail(&self, url: impl Into<String>) {
        self.responses.insert(url.into(), MockResponse::NetworkError);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests issued so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> FxResult<HttpResponse> {
        self.requests.lock().push(url.to_string());

        match self.responses.get(url).map(|r| r.clone()) {
            Some(MockResponse::Reply(response)) => Ok(response),
            Some(MockResponse::NetworkError) => Err(FxError::Transport {
                url: url.to_string(),
                message: "connection reset".to_string(),
            }),
            None => Ok(HttpResponse::new(404, "Not Found")),
        }
    }
}
