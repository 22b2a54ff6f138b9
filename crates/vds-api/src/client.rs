//! Asynchronous VDS control API client implementation.

use crate::models::{
    AddVdsParams, ModifyVdsRequest, ReinstallVdsParams, RequestParams, ServiceResponse, VdsQuota,
};
use crate::Result;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, error};
use vds_core::config::MAX_TIMEOUT_SECS;
use vds_core::transport::ReqwestTransport;
use vds_core::{
    Error, HttpMethod, HttpReply, OperationError, Transport, TransportError, TransportRequest,
    VdsClientConfig,
};

const USER_AGENT: &str = concat!("vds-api/", env!("CARGO_PKG_VERSION"));

/// Label used when an HTTP 500 carries no usable error body.
const HTTP_ERROR: &str = "HTTP Error";

/// Compose the endpoint URL for a command path.
///
/// The parts are concatenated verbatim; `command` is not escaped or normalized.
#[must_use]
pub fn build_request_url(host: &str, port: u16, command: &str) -> String {
    format!("https://{host}:{port}/api/{command}")
}

/// Builder for [`VdsClient`].
pub struct VdsClientBuilder {
    config: VdsClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl VdsClientBuilder {
    /// Create a builder from a client configuration.
    #[must_use]
    pub fn new(config: VdsClientConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Use a custom transport instead of the default `reqwest` one.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VdsClient> {
        self.config.check()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.tls_verify)?),
        };

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        Ok(VdsClient {
            host: self.config.host.clone(),
            port: self.config.port,
            user_agent,
            timeout: Arc::new(RwLock::new(self.config.timeout())),
            transport,
        })
    }
}

/// Asynchronous client for the VDS control API.
///
/// Every method issues exactly one request. Clones share the transport and the
/// timeout setting; [`VdsClient::set_timeout`] only affects requests dispatched
/// after it returns.
#[derive(Clone)]
pub struct VdsClient {
    host: String,
    port: u16,
    user_agent: String,
    timeout: Arc<RwLock<Duration>>,
    transport: Arc<dyn Transport>,
}

impl VdsClient {
    /// Create a client for the given endpoint with default settings.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::from_config(&VdsClientConfig::new(host, port)?)
    }

    /// Construct a client directly from the configuration.
    pub fn from_config(config: &VdsClientConfig) -> Result<Self> {
        VdsClientBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: VdsClientConfig) -> VdsClientBuilder {
        VdsClientBuilder::new(config)
    }

    /// Control API host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Control API port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Timeout applied to the next dispatched request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        match self.timeout.read() {
            Ok(timeout) => *timeout,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Change the request timeout.
    ///
    /// Requests already in flight keep the timeout they were dispatched with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] unless the timeout is greater than zero
    /// and at most [`MAX_TIMEOUT_SECS`] seconds.
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        if timeout.is_zero() || timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(Error::ConfigError(format!(
                "request timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {timeout:?}"
            )));
        }

        match self.timeout.write() {
            Ok(mut current) => *current = timeout,
            Err(poisoned) => *poisoned.into_inner() = timeout,
        }
        Ok(())
    }

    /// Full URL for a command path on this client's endpoint.
    #[must_use]
    pub fn request_url(&self, command: &str) -> String {
        build_request_url(&self.host, self.port, command)
    }

    /// Poll the state of an asynchronous operation by its task identifier.
    pub async fn status(&self, id: &str) -> Result<Value> {
        let command = format!("task/status/{id}");
        self.send(&command, HttpMethod::Get, RequestParams::new().with_async(false)).await
    }

    /// Create a new VDS.
    ///
    /// `arch` is accepted but not sent: the add request carries no architecture field.
    pub async fn add(
        &self,
        name: &str,
        description: &str,
        distributive: &str,
        arch: &str,
        quota: &VdsQuota,
    ) -> Result<Value> {
        debug!(name, arch, "arch is not transmitted with vds/add");
        let command = format!("vds/add/base/{name}");
        let params =
            RequestParams::from_serialize(&AddVdsParams::new(description, distributive, quota))?;
        self.send(&command, HttpMethod::Post, params).await
    }

    /// Reinstall a VDS with another distributive.
    pub async fn reinstall(&self, name: &str, distributive: &str, arch: &str) -> Result<Value> {
        let command = format!("vds/reinstall/{name}");
        let params = RequestParams::from_serialize(&ReinstallVdsParams { distributive, arch })?;
        self.send(&command, HttpMethod::Put, params).await
    }

    /// Change resources or passwords of a VDS.
    pub async fn modify(&self, name: &str, request: &ModifyVdsRequest) -> Result<Value> {
        let command = format!("vds/modify/{name}");
        let params = RequestParams::from_serialize(request)?;
        self.send(&command, HttpMethod::Put, params).await
    }

    /// Start a VDS.
    pub async fn start(&self, name: &str) -> Result<Value> {
        let command = format!("vds/start/{name}");
        self.send(&command, HttpMethod::Put, RequestParams::new()).await
    }

    /// Stop a VDS.
    pub async fn stop(&self, name: &str) -> Result<Value> {
        let command = format!("vds/stop/{name}");
        self.send(&command, HttpMethod::Put, RequestParams::new()).await
    }

    /// Restart a VDS, optionally forcing it.
    pub async fn restart(&self, name: &str, force: bool) -> Result<Value> {
        let command = format!("vds/restart/{name}");
        self.send(&command, HttpMethod::Put, RequestParams::new().with("force", force)).await
    }

    /// Delete a VDS.
    ///
    /// Deleting a VDS that does not exist succeeds with `None`.
    pub async fn delete(&self, name: &str) -> Result<Option<Value>> {
        let command = format!("vds/delete/{name}");
        match self.send(&command, HttpMethod::Delete, RequestParams::new()).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.is_not_exists() => {
                debug!(name, "VDS already absent, nothing to delete");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch details of a VDS, or `None` if it does not exist.
    pub async fn show(&self, name: &str) -> Result<Option<Value>> {
        let command = format!("vds/show/{name}");
        match self.send(&command, HttpMethod::Get, RequestParams::new().with_async(false)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.is_not_exists() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Dispatch a command and return the `data` field of the response.
    ///
    /// `async` defaults to `true` unless `params` sets it. The parameters are
    /// sent as a JSON body for every method, `GET` and `DELETE` included.
    pub async fn send(
        &self,
        command: &str,
        method: HttpMethod,
        mut params: RequestParams,
    ) -> Result<Value> {
        params.default_async();

        let request = TransportRequest {
            url: self.request_url(command),
            method,
            body: params.to_json()?,
            timeout: self.timeout(),
            user_agent: self.user_agent.clone(),
        };

        debug!(command, %method, timeout = ?request.timeout, "Sending VDS API request");

        match self.transport.execute(request).await {
            Ok(reply) if reply.status == 200 => {
                let body: Value = serde_json::from_slice(&reply.body).map_err(|err| {
                    Error::ParseError(format!(
                        "Failed to parse VDS API response for `{command}`: {err}"
                    ))
                })?;
                Ok(ServiceResponse::from_value(body).data)
            }
            Ok(reply) => Err(report_failure(error_from_reply(&reply), command, &params)),
            Err(err) => Err(report_failure(error_from_transport(err), command, &params)),
        }
    }
}

/// Extract the failure from a non-200 reply.
///
/// A decodable `error` object wins; otherwise a 500 becomes a generic HTTP
/// error. Any other reply had no transport-level error, so the code is `0`.
fn error_from_reply(reply: &HttpReply) -> OperationError {
    let reported = serde_json::from_slice::<Value>(&reply.body)
        .ok()
        .and_then(|body| ServiceResponse::from_value(body).error);

    let error = match reported {
        Some(reported) => {
            let error =
                OperationError::from_code(reported.code, reported.message.unwrap_or_default());
            match reported.name {
                Some(name) => error.with_name(name),
                None => error,
            }
        }
        None if reply.status == 500 => {
            OperationError::from_code(500, HTTP_ERROR).with_name(HTTP_ERROR)
        }
        None => OperationError::from_code(0, String::new()),
    };

    error.with_http_status(reply.status)
}

fn error_from_transport(err: TransportError) -> OperationError {
    OperationError::transport(err.code, err.message)
}

fn report_failure(err: OperationError, command: &str, params: &RequestParams) -> Error {
    let err = err.with_command(command);

    error!(
        kind = %err.kind,
        code = err.code,
        name = err.name.as_deref().unwrap_or_default(),
        message = %err.message,
        http_status = err.http_status,
        "VDS API request failed"
    );
    error!(command, "Failed VDS API command");
    error!(params = ?params.redacted(), "Failed VDS API request parameters");

    Error::Operation(err)
}
