//! HTTP transport for the control API.
//!
//! The client never talks to `reqwest` directly; it hands a fully prepared
//! [`TransportRequest`] to a [`Transport`] and gets back either the raw HTTP
//! reply or a [`TransportError`] when no response was obtained.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, ClientBuilder, Method};
use std::fmt;
use std::time::Duration;
use tracing::warn;

// Connection pool settings

/// Default idle timeout for pooled connections (seconds)
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Transport error codes, numbered like libcurl's

/// Generic request failure
pub const TRANSPORT_REQUEST_FAILED: i64 = 2;

/// The request URL could not be used
pub const TRANSPORT_URL_MALFORMED: i64 = 3;

/// Could not connect to the host
pub const TRANSPORT_CONNECT_FAILED: i64 = 7;

/// The operation timed out
pub const TRANSPORT_TIMED_OUT: i64 = 28;

/// Too many redirects
pub const TRANSPORT_TOO_MANY_REDIRECTS: i64 = 47;

/// Failure while receiving the response
pub const TRANSPORT_RECEIVE_FAILED: i64 = 56;

/// HTTP methods used by the control API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A single outbound request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Fully-qualified target URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// JSON-encoded body, sent for every method
    pub body: Vec<u8>,
    /// Overall request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

/// Raw HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Create a reply from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain an HTTP response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error {code}: {message}")]
pub struct TransportError {
    /// Transport error number
    pub code: i64,
    /// Transport error description
    pub message: String,
}

impl TransportError {
    /// Create a transport error.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            TRANSPORT_TIMED_OUT
        } else if err.is_connect() {
            TRANSPORT_CONNECT_FAILED
        } else if err.is_builder() {
            TRANSPORT_URL_MALFORMED
        } else if err.is_redirect() {
            TRANSPORT_TOO_MANY_REDIRECTS
        } else if err.is_body() || err.is_decode() {
            TRANSPORT_RECEIVE_FAILED
        } else {
            TRANSPORT_REQUEST_FAILED
        };

        Self::new(code, err.to_string())
    }
}

/// Executes requests against the control API.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw reply.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response could be obtained.
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<HttpReply, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport with the default pool settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(tls_verify: bool) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT))
            .pool_max_idle_per_host(DEFAULT_POOL_MAX_IDLE_PER_HOST)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));

        if !tls_verify {
            warn!("TLS verification disabled for VDS API transport");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<HttpReply, TransportError> {
        let response = self
            .http
            .request(request.method.into(), request.url.as_str())
            .timeout(request.timeout)
            .header(USER_AGENT, request.user_agent)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpReply::new(status, body.to_vec()))
    }
}
