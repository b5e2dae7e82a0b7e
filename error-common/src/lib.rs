//! Common error handling utilities for the Certify portal client
//!
//! This crate provides the error types, error codes and context records shared
//! by every crate in the workspace. Failures are classified once, carry a
//! stable code, and are reported through `tracing`.
//!
//! # Error Categories
//!
//! - **NetworkError** / **Timeout** / **UnexpectedStatus**: transport failures
//! - **AuthError** / **SessionExpired**: missing or rejected session credentials
//! - **AccessDenied**: the signed-in role may not read the certificate
//! - **NotFound** / **MissingId**: certificate record or stored file missing
//! - **Rejected**: the server refused the request as invalid
//! - **PayloadError** / **EmptyBody**: unusable response bodies
//! - **ConfigError**: invalid client configuration
//! - **IoError** / **Other**: local failures
//!
//! # Example
//!
//! ```rust
//! use error_common::{CertifyError, ErrorContext, ErrorReporter};
//!
//! let reporter = ErrorReporter::new("certify-cli");
//! let error = CertifyError::NotFound("certificate c42".to_string());
//! let context = ErrorContext::new().with_certificate_id("c42").with_role("STAFF");
//! reporter.report(&error, &context);
//! assert_eq!(error.code(), error_common::codes::resource::NOT_FOUND);
//! ```

pub mod types;
pub mod context;
pub mod codes;
pub mod reporting;

pub use types::*;
pub use context::*;
pub use reporting::*;
