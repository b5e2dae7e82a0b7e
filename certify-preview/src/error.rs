//! Error types for certificate fetching

use error_common::{codes, CertifyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request against the certificate API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Access to the certificate is forbidden")]
    Forbidden,

    #[error("Certificate not found: {}", .0.as_deref().unwrap_or("no detail from server"))]
    NotFound(Option<String>),

    #[error("Certificate id is empty")]
    MissingId,

    #[error("Server returned an empty body")]
    EmptyBody,

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),
}

/// Failure class reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Connection failures, timeouts, 5xx, 408 and 429; always retried
    Network,
    /// Any other 4xx; never retried
    Rejected,
    Forbidden,
    NotFound,
    EmptyBody,
    Malformed,
    Unauthenticated,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Network => "NETWORK",
            FailureKind::Rejected => "REJECTED",
            FailureKind::Forbidden => "FORBIDDEN",
            FailureKind::NotFound => "NOT_FOUND",
            FailureKind::EmptyBody => "EMPTY_BODY",
            FailureKind::Malformed => "MALFORMED",
            FailureKind::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) | FetchError::Status(_) => {
                FailureKind::Network
            }
            FetchError::Rejected { .. } => FailureKind::Rejected,
            FetchError::Forbidden => FailureKind::Forbidden,
            FetchError::NotFound(_) | FetchError::MissingId => FailureKind::NotFound,
            FetchError::EmptyBody => FailureKind::EmptyBody,
            FetchError::Malformed(_) => FailureKind::Malformed,
            FetchError::Unauthenticated(_) => FailureKind::Unauthenticated,
        }
    }

    /// Whether the fetcher may schedule another attempt for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::Network | FailureKind::EmptyBody)
    }

    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Network(_) => codes::network::CONNECTION_FAILED,
            FetchError::Timeout(_) => codes::network::TIMEOUT,
            FetchError::Status(_) => codes::network::UNEXPECTED_STATUS,
            FetchError::Rejected { .. } => codes::request::REJECTED,
            FetchError::Forbidden => codes::authorization::ACCESS_DENIED,
            FetchError::NotFound(_) => codes::resource::NOT_FOUND,
            FetchError::MissingId => codes::resource::MISSING_ID,
            FetchError::EmptyBody => codes::payload::EMPTY_BODY,
            FetchError::Malformed(_) => codes::payload::MALFORMED,
            FetchError::Unauthenticated(_) => codes::authentication::SESSION_EXPIRED,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else if err.is_timeout() {
            FetchError::Network(format!("request timed out: {}", err))
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<FetchError> for CertifyError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        match err {
            FetchError::Network(_) => CertifyError::NetworkError(message),
            FetchError::Timeout(_) => CertifyError::Timeout(message),
            FetchError::Status(_) => CertifyError::UnexpectedStatus(message),
            FetchError::Rejected { .. } => CertifyError::Rejected(message),
            FetchError::Forbidden => CertifyError::AccessDenied(message),
            FetchError::NotFound(_) => CertifyError::NotFound(message),
            FetchError::MissingId => CertifyError::MissingId(message),
            FetchError::EmptyBody => CertifyError::EmptyBody(message),
            FetchError::Malformed(_) => CertifyError::PayloadError(message),
            FetchError::Unauthenticated(_) => CertifyError::SessionExpired(message),
        }
    }
}

/// Serialized as its display message
impl Serialize for FetchError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
