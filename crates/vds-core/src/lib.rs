//! # vds-core
//!
//! Core types and utilities for talking to the VDS hosting control API.
//!
//! This crate provides the stable error taxonomy, client configuration and the
//! HTTP transport seam used by the `vds-api` client.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and provider code mapping
//! - [`config`] - Validated client configuration
//! - [`transport`] - Transport trait and the default `reqwest` implementation

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use config::VdsClientConfig;
pub use error::{Error, ErrorKind, OperationError, Result};
pub use transport::{HttpMethod, HttpReply, Transport, TransportError, TransportRequest};
