//! Request and response models for the VDS control API.

use crate::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use vds_core::Error;

/// Key of the remote execution-mode flag carried by every request.
pub const ASYNC_KEY: &str = "async";

const REDACTED: &str = "[REDACTED]";

/// Parameters sent as the JSON body of a request.
///
/// Every dispatched request carries an `async` flag; when the caller leaves it
/// unset the dispatcher defaults it to `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build parameters from any value that serializes to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if the value cannot be encoded or
    /// is not a JSON object.
    pub fn from_serialize<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(Error::SerializationError(format!(
                "request parameters must be a JSON object, got `{other}`"
            ))),
            Err(err) => Err(Error::SerializationError(err.to_string())),
        }
    }

    /// Insert a parameter, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`RequestParams::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Explicitly set the `async` flag.
    #[must_use]
    pub fn with_async(self, value: bool) -> Self {
        self.with(ASYNC_KEY, value)
    }

    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the `async` flag if it has been set to a boolean.
    #[must_use]
    pub fn async_flag(&self) -> Option<bool> {
        self.get(ASYNC_KEY).and_then(Value::as_bool)
    }

    /// Default the `async` flag to `true` unless the key is already present.
    pub fn default_async(&mut self) {
        self.0.entry(ASYNC_KEY).or_insert(Value::Bool(true));
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the parameters as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(|err| Error::SerializationError(err.to_string()))
    }

    /// Copy of the parameters safe to write to logs.
    ///
    /// Values under any key containing `password` are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let map = self
            .0
            .iter()
            .map(|(key, value)| {
                let value = if key.to_ascii_lowercase().contains("password") {
                    Value::String(REDACTED.to_string())
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect();
        Self(map)
    }
}

/// Resource quota of a new VDS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdsQuota {
    /// Number of virtual CPUs
    pub cpu_count: u32,
    /// Disk size in bytes
    pub hdd_quota: u64,
    /// Memory size in bytes
    pub memory: u64,
}

/// Body of `vds/add/base/{name}`.
#[derive(Debug, Serialize)]
pub(crate) struct AddVdsParams<'a> {
    pub description: &'a str,
    pub distributive: &'a str,
    #[serde(rename = "cpu-count")]
    pub cpu_count: u32,
    #[serde(rename = "hdd-quota")]
    pub hdd_quota: u64,
    pub memory: u64,
}

impl<'a> AddVdsParams<'a> {
    pub(crate) fn new(description: &'a str, distributive: &'a str, quota: &VdsQuota) -> Self {
        Self {
            description,
            distributive,
            cpu_count: quota.cpu_count,
            hdd_quota: quota.hdd_quota,
            memory: quota.memory,
        }
    }
}

/// Body of `vds/reinstall/{name}`.
#[derive(Debug, Serialize)]
pub(crate) struct ReinstallVdsParams<'a> {
    pub distributive: &'a str,
    pub arch: &'a str,
}

/// Changes applied by `vds/modify/{name}`.
///
/// Only the fields that are set are sent; any combination is accepted.
#[derive(Debug, Default, Serialize)]
pub struct ModifyVdsRequest {
    /// Memory size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Disk size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdd_quota: Option<u64>,
    /// Number of virtual CPUs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u32>,
    /// New root password
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub root_password: Option<SecretString>,
    /// New VNC console password
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub vnc_password: Option<SecretString>,
}

impl ModifyVdsRequest {
    /// Create an empty modification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the memory size in bytes.
    #[must_use]
    pub const fn with_memory(mut self, bytes: u64) -> Self {
        self.memory = Some(bytes);
        self
    }

    /// Set the disk size in bytes.
    #[must_use]
    pub const fn with_hdd_quota(mut self, bytes: u64) -> Self {
        self.hdd_quota = Some(bytes);
        self
    }

    /// Set the number of virtual CPUs.
    #[must_use]
    pub const fn with_cpu_count(mut self, count: u32) -> Self {
        self.cpu_count = Some(count);
        self
    }

    /// Set a new root password.
    #[must_use]
    pub fn with_root_password(mut self, password: impl Into<String>) -> Self {
        self.root_password = Some(SecretString::from(password.into()));
        self
    }

    /// Set a new VNC password.
    #[must_use]
    pub fn with_vnc_password(mut self, password: impl Into<String>) -> Self {
        self.vnc_password = Some(SecretString::from(password.into()));
        self
    }
}

fn serialize_secret<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Decoded response body.
///
/// Read leniently from an arbitrary JSON value: `data` is taken as-is and only
/// an object under `error` counts as a reported failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceResponse {
    /// Operation payload; `null` when absent
    pub data: Value,
    /// Error description, present on failure
    pub error: Option<ServiceError>,
}

impl ServiceResponse {
    /// Split a decoded body into its payload and reported error.
    #[must_use]
    pub fn from_value(mut body: Value) -> Self {
        let error = body.get("error").and_then(ServiceError::from_value);
        let data = body.get_mut("data").map(Value::take).unwrap_or_default();
        Self { data, error }
    }
}

/// Error object reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    /// Error code coerced to an integer
    pub code: i64,
    /// Error name
    pub name: Option<String>,
    /// Error message
    pub message: Option<String>,
}

impl ServiceError {
    /// Read an `error` object. Returns `None` unless `value` is an object.
    ///
    /// The code is coerced with [`coerce_code`]; `name` and `message` are
    /// taken verbatim when they are strings and rendered as JSON otherwise.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let error = value.as_object()?;
        Some(Self {
            code: error.get("code").map_or(0, coerce_code),
            name: error.get("name").and_then(lenient_text),
            message: error.get("message").and_then(lenient_text),
        })
    }
}

/// Coerce a raw error code to an integer.
///
/// Numeric strings are parsed, fractional numbers truncated, booleans become
/// `0`/`1`; anything else yields `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_code(code: &Value) -> i64 {
    match code {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(text) => text.trim().parse().unwrap_or_default(),
        Value::Bool(flag) => i64::from(*flag),
        _ => 0,
    }
}

fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
