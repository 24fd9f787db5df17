//! HTTP exchange layer.
//!
//! [`HttpTransport`] performs one bounded request/response exchange. The
//! default implementation, [`ReqwestTransport`], uses a pooled `reqwest`
//! client, so one transport may be shared by several drivers.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::trace;

use crate::error::Result;
use crate::protocol::Method;

// ============================================================================
// Constants
// ============================================================================

/// Default per-exchange timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Content type sent with every request body.
const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

// ============================================================================
// HttpRequest / HttpReply
// ============================================================================

/// One outgoing exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// JSON body for POST requests.
    pub body: Option<Vec<u8>>,
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Returns `true` for 2xx statuses.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Performs HTTP exchanges against the agent.
///
/// Implementations must bound every exchange with a timeout and surface
/// network failures as errors. They must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one exchange.
    ///
    /// Non-2xx statuses are returned as replies, not errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply>;
}

// ============================================================================
// ReqwestTransport
// ============================================================================

/// [`HttpTransport`] backed by a `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a transport with the given per-exchange timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`](crate::Error::Http) if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Returns the per-exchange timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        let builder = match request.body {
            Some(body) => builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        trace!(status, len = body.len(), url = %request.url, "HTTP exchange completed");

        Ok(HttpReply { status, body })
    }
}

// ============================================================================
// Tests
// ============================================================================
