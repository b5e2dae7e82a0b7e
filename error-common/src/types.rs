use crate::codes;
use thiserror::Error;

/// Workspace-wide error for the Certify portal client
#[derive(Error, Debug)]
pub enum CertifyError {
    /// Connection failures, timeouts and unexpected server statuses
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(String),

    /// Missing or expired session credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The server no longer accepts the session token
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The signed-in role may not access the resource
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Certificate or its backing file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing identifier: {0}")]
    MissingId(String),

    /// The server refused the request as invalid
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Server answered but the payload is unusable
    #[error("Payload error: {0}")]
    PayloadError(String),

    #[error("Empty response: {0}")]
    EmptyBody(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Local file system errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CertifyError {
    /// Stable code for this error class
    pub fn code(&self) -> &'static str {
        match self {
            CertifyError::NetworkError(_) => codes::network::CONNECTION_FAILED,
            CertifyError::Timeout(_) => codes::network::TIMEOUT,
            CertifyError::UnexpectedStatus(_) => codes::network::UNEXPECTED_STATUS,
            CertifyError::AuthError(_) => codes::authentication::SESSION_MISSING,
            CertifyError::SessionExpired(_) => codes::authentication::SESSION_EXPIRED,
            CertifyError::AccessDenied(_) => codes::authorization::ACCESS_DENIED,
            CertifyError::NotFound(_) => codes::resource::NOT_FOUND,
            CertifyError::MissingId(_) => codes::resource::MISSING_ID,
            CertifyError::Rejected(_) => codes::request::REJECTED,
            CertifyError::PayloadError(_) => codes::payload::MALFORMED,
            CertifyError::EmptyBody(_) => codes::payload::EMPTY_BODY,
            CertifyError::ConfigError(_) => codes::configuration::INVALID_CONFIG,
            CertifyError::IoError(_) => codes::local::IO_FAILED,
            CertifyError::Other(_) => codes::local::INTERNAL,
        }
    }
}

/// Result type alias for Certify operations
pub type Result<T> = std::result::Result<T, CertifyError>;
