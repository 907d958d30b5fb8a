//! # API gRPC
//!
//! gRPC server implementation for Casedesk.
//!
//! Handles:
//! - gRPC service setup and authentication
//! - Service implementations using `casedesk-core` for letter operations
//! - gRPC-specific concerns (interceptors, status mapping)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub use service::{auth_interceptor, pb, status_from_error, CasedeskService};

pub mod service;
