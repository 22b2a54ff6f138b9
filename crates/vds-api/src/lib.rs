//! Client and request models for the VDS hosting control API.
//!
//! Provides an asynchronous client for the VDS lifecycle operations (add,
//! reinstall, modify, start, stop, restart, delete, show) and task status
//! polling. Failures are normalized into [`vds_core::ErrorKind`].

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{build_request_url, VdsClient, VdsClientBuilder};
pub use models::{ModifyVdsRequest, RequestParams, ServiceError, ServiceResponse, VdsQuota};
pub use vds_core::{Error, ErrorKind, HttpMethod, OperationError, VdsClientConfig};

/// Convenient result alias that reuses the shared VDS error type.
pub type Result<T> = vds_core::Result<T>;
