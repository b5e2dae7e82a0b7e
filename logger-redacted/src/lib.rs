//! Logging for the Certify portal client with automatic credential redaction
//!
//! Every component of the client logs through `tracing`. Messages that may
//! contain request details (URLs, headers, server error bodies) are passed
//! through a [`CredentialRedactor`] first so that bearer tokens and other
//! session material never reach a log sink.
//!
//! # Detected Data Types
//!
//! - **Bearer headers**: `Bearer eyJ...` → `Bearer [hash]`
//! - **JWTs**: standalone `header.payload.signature` triples
//! - **Token query parameters**: `?token=...` → `?token=[REDACTED]`
//! - **Email Addresses**: `jane@example.com` → `EMAIL[hash]`
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_tracing, LoggerConfig};
//!
//! init_tracing(&LoggerConfig::default().verbose(true)).expect("logger");
//! logger_redacted::redacted_warn!("retrying with Authorization: Bearer {}", "abc");
//! ```

pub mod redactor;
pub mod macros;
pub mod config;

pub use redactor::*;
pub use config::*;

#[doc(hidden)]
pub use tracing;

use lazy_static::lazy_static;
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

lazy_static! {
    static ref DEFAULT_REDACTOR: CredentialRedactor = CredentialRedactor::default();
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Redact `text` with the default configuration
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives())
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_output {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_redact() {
        let out = redact("Authorization: Bearer top-secret");
        assert!(!out.contains("top-secret"));
    }

    #[test]
    fn test_second_init_reports_error() {
        let config = LoggerConfig::default();
        // Whichever call wins, the other must fail instead of panicking
        let first = init_tracing(&config);
        let second = init_tracing(&config);
        assert!(first.is_err() || second.is_err());
    }
}
