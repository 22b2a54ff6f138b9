//! Error types for VDS control API operations.
//!
//! The remote service reports failures as small integer codes. This module
//! maps those codes onto a stable [`ErrorKind`] taxonomy and carries the
//! normalized failure as an [`OperationError`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Stable classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Unrecoverable failure on the provider side (code 1)
    Critical,
    /// The request parameters were rejected (code 2)
    Validation,
    /// The target does not exist (code 3)
    NotExists,
    /// The target already exists (code 4)
    AlreadyExists,
    /// The provider gave up waiting on a backend process (code 5)
    ProcessTimeout,
    /// The provider could not decode the request body (code 7)
    JsonDecode,
    /// Failure while managing the system user of the VDS (code 8)
    SystemUser,
    /// The provider is temporarily unavailable (code 9)
    Unavailable,
    /// Any code outside the known table; the raw code is kept on the error
    Unknown,
    /// No HTTP response was obtained at all
    Transport,
}

impl ErrorKind {
    /// Maps a raw provider error code to its kind.
    ///
    /// Codes outside the known table map to [`ErrorKind::Unknown`].
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Critical,
            2 => Self::Validation,
            3 => Self::NotExists,
            4 => Self::AlreadyExists,
            5 => Self::ProcessTimeout,
            7 => Self::JsonDecode,
            8 => Self::SystemUser,
            9 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }

    /// Returns the kind as an upper-case identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Validation => "VALIDATION",
            Self::NotExists => "NOT_EXISTS",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::ProcessTimeout => "PROCESS_TIMEOUT",
            Self::JsonDecode => "JSON_DECODE",
            Self::SystemUser => "SYSTEM_USER",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unknown => "UNKNOWN",
            Self::Transport => "TRANSPORT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to the control API, normalized into the local taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind} ({code}): {message}")]
pub struct OperationError {
    /// Classification of the failure
    pub kind: ErrorKind,
    /// Raw numeric code (provider code, HTTP status or transport code)
    pub code: i64,
    /// Provider error name, when one was reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message
    pub message: String,
    /// HTTP status of the response, when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Command path that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl OperationError {
    /// Builds an error from a provider code, mapping it through [`ErrorKind::from_code`].
    #[must_use]
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::from_code(code),
            code,
            name: None,
            message: message.into(),
            http_status: None,
            command: None,
        }
    }

    /// Builds an error for a request that never produced an HTTP response.
    ///
    /// The transport's code is kept as-is and never mapped through the provider table.
    #[must_use]
    pub fn transport(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            code,
            name: None,
            message: message.into(),
            http_status: None,
            command: None,
        }
    }

    /// Attach the provider error name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the HTTP status of the response.
    #[must_use]
    pub const fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Attach the command path that failed.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Returns true if the provider reported that the target does not exist.
    #[must_use]
    pub fn is_not_exists(&self) -> bool {
        self.kind == ErrorKind::NotExists
    }
}

/// Main error type for VDS client operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The control API (or the transport reaching it) reported a failure
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A successful response carried a body that is not valid JSON
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request parameters could not be encoded
    #[error("Failed to serialize request: {0}")]
    SerializationError(String),
}

/// Specialized result type for VDS client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Operation errors report their [`ErrorKind`] identifier.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Operation(err) => err.kind.as_str(),
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns the taxonomy kind when this is an operation error.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_operation().map(|err| err.kind)
    }

    /// Borrow the inner [`OperationError`], if any.
    #[must_use]
    pub fn as_operation(&self) -> Option<&OperationError> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the provider reported that the target does not exist.
    #[must_use]
    pub fn is_not_exists(&self) -> bool {
        self.as_operation().is_some_and(OperationError::is_not_exists)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(format!("Invalid configuration: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_kinds() {
        let table = [
            (1, ErrorKind::Critical),
            (2, ErrorKind::Validation),
            (3, ErrorKind::NotExists),
            (4, ErrorKind::AlreadyExists),
            (5, ErrorKind::ProcessTimeout),
            (7, ErrorKind::JsonDecode),
            (8, ErrorKind::SystemUser),
            (9, ErrorKind::Unavailable),
        ];

        for (code, kind) in table {
            assert_eq!(ErrorKind::from_code(code), kind, "code {code}");
        }
    }

    #[test]
    fn test_unlisted_codes_are_unknown() {
        for code in [0, 6, 10, 99, 500, -1] {
            assert_eq!(ErrorKind::from_code(code), ErrorKind::Unknown, "code {code}");
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let err = OperationError::from_code(99, "boom");
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.code, 99);
    }

    #[test]
    fn test_transport_error_is_not_mapped() {
        // 7 is JSON_DECODE for the provider, but a transport code must stay unmapped.
        let err = OperationError::transport(7, "Failed to connect");
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.code, 7);
    }

    #[test]
    fn test_operation_error_display() {
        let err = OperationError::from_code(3, "vds not found").with_name("NotExists");
        assert_eq!(err.to_string(), "NOT_EXISTS (3): vds not found");
    }

    #[test]
    fn test_error_codes() {
        let op: Error = OperationError::from_code(2, "bad").into();
        assert_eq!(op.error_code(), "VALIDATION");
        assert_eq!(Error::ConfigError("x".into()).error_code(), "CONFIG_ERROR");
        assert_eq!(Error::ParseError("x".into()).error_code(), "PARSE_ERROR");
        assert_eq!(
            Error::SerializationError("x".into()).error_code(),
            "SERIALIZATION_ERROR"
        );
    }

    #[test]
    fn test_error_kind_accessors() {
        let err: Error = OperationError::from_code(3, "gone").into();
        assert_eq!(err.kind(), Some(ErrorKind::NotExists));
        assert!(err.is_not_exists());

        let err = Error::ConfigError("bad".into());
        assert_eq!(err.kind(), None);
        assert!(!err.is_not_exists());
    }

    #[test]
    fn test_operation_error_builders() {
        let err = OperationError::from_code(4, "taken")
            .with_name("AlreadyExists")
            .with_http_status(409)
            .with_command("vds/add/base/web-1");

        assert_eq!(err.name.as_deref(), Some("AlreadyExists"));
        assert_eq!(err.http_status, Some(409));
        assert_eq!(err.command.as_deref(), Some("vds/add/base/web-1"));
    }

    #[test]
    fn test_operation_error_serialization() {
        let err = OperationError::from_code(9, "maintenance");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "UNAVAILABLE");
        assert_eq!(json["code"], 9);
        assert!(json.get("name").is_none());
        assert!(json.get("http_status").is_none());
    }
}
