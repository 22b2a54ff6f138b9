//! Configuration structures for VDS clients.
//!
//! A client talks to exactly one control API endpoint, addressed by host and
//! port. The request timeout set here is the initial value; the client allows
//! changing it afterwards.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::{Validate, ValidationError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Upper bound accepted for the request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Configuration for a VDS client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VdsClientConfig {
    /// Control API host name or address
    #[validate(length(min = 1), custom(function = "validate_host"))]
    pub host: String,

    /// Control API port
    #[validate(range(min = 1))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = MAX_TIMEOUT_SECS))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional User-Agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_tls_verify() -> bool {
    true
}

fn validate_host(host: &str) -> Result<(), ValidationError> {
    Url::parse(&format!("https://{host}/"))
        .ok()
        .filter(|url| url.host_str().is_some() && url.port().is_none() && url.path() == "/")
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("host"))
}

impl VdsClientConfig {
    /// Create a new client configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or port is invalid.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, Error> {
        let config = Self {
            host: host.into(),
            port,
            timeout_secs: default_timeout_secs(),
            tls_verify: default_tls_verify(),
            user_agent: None,
        };

        config.check()?;

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every invalid field.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        Ok(())
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Override the User-Agent sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
