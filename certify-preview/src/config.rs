//! Client configuration
//!
//! Defaults match the portal frontend: two retries one second apart and a
//! thirty second bound on every request.

use crate::classification::ClassifierPolicy;
use error_common::CertifyError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_SERVER_URL: &str = "CERTIFY_SERVER_URL";
pub const ENV_RETRY_CAP: &str = "CERTIFY_RETRY_CAP";
pub const ENV_RETRY_DELAY_MS: &str = "CERTIFY_RETRY_DELAY_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CERTIFY_REQUEST_TIMEOUT_SECS";
pub const ENV_PDF_EXTENSION_FALLBACK: &str = "CERTIFY_PDF_EXTENSION_FALLBACK";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigLoadError> for CertifyError {
    fn from(err: ConfigLoadError) -> Self {
        CertifyError::ConfigError(err.to_string())
    }
}

/// Preview client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Backend origin, e.g. `https://certify.example.edu`
    pub server_url: String,
    /// Retries after the first attempt
    pub retry_cap: u32,
    /// Fixed delay before each retry (milliseconds)
    pub retry_delay_ms: u64,
    /// Upper bound for a single attempt (seconds)
    pub request_timeout_secs: u64,
    /// Classify MIME-less `.pdf` uploads as documents
    pub pdf_extension_fallback: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            retry_cap: 2,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            pdf_extension_fallback: true,
        }
    }
}

impl PreviewConfig {
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn classifier_policy(&self) -> ClassifierPolicy {
        ClassifierPolicy {
            pdf_extension_fallback: self.pdf_extension_fallback,
        }
    }

    /// Defaults overridden by `CERTIFY_*` environment variables
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; unparsable values are ignored
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL).filter(|u| !u.trim().is_empty()) {
            self.server_url = url;
        }
        self.retry_cap = lookup(ENV_RETRY_CAP)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.retry_cap);
        self.retry_delay_ms = lookup(ENV_RETRY_DELAY_MS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.retry_delay_ms);
        self.request_timeout_secs = lookup(ENV_REQUEST_TIMEOUT_SECS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.request_timeout_secs);
        self.pdf_extension_fallback = lookup(ENV_PDF_EXTENSION_FALLBACK)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.pdf_extension_fallback);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PreviewConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| ConfigLoadError::Invalid(format!("server_url '{}': {}", self.server_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigLoadError::Invalid(format!(
                "server_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigLoadError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
