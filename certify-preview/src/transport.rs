//! Authenticated binary retrieval
//!
//! [`BlobTransport`] is the seam between the fetcher and the network. The
//! production implementation is [`HttpTransport`]; tests substitute scripted
//! transports.

use crate::config::PreviewConfig;
use crate::error::FetchError;
use crate::models::CertificateRef;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// One authenticated GET
pub struct BlobRequest {
    pub segments: Vec<String>,
    pub token: SecretString,
}

impl BlobRequest {
    pub fn view(certificate: &CertificateRef, token: SecretString) -> Self {
        Self {
            segments: certificate.segments("view"),
            token,
        }
    }

    pub fn download(certificate: &CertificateRef, token: SecretString) -> Self {
        Self {
            segments: certificate.segments("download"),
            token,
        }
    }

    /// Request path, e.g. `/api/staff/certificates/c1/view`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl fmt::Debug for BlobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRequest")
            .field("path", &self.path())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Successful (2xx) response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResponse {
    pub content_type: Option<String>,
    /// File name from `Content-Disposition`, when present
    pub file_name: Option<String>,
    pub body: Bytes,
}

impl BlobResponse {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            file_name: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Perform the request; non-2xx statuses map to `FetchError`
    async fn fetch(&self, request: BlobRequest) -> Result<BlobResponse, FetchError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    server_url: String,
}

impl HttpTransport {
    pub fn new(config: &PreviewConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.server_url))
    }

    pub fn with_client(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl BlobTransport for HttpTransport {
    async fn fetch(&self, request: BlobRequest) -> Result<BlobResponse, FetchError> {
        let url = endpoint_url(&self.server_url, &request.segments)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(request.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let content_type = header_value(&response, CONTENT_TYPE);
        let file_name = header_value(&response, CONTENT_DISPOSITION)
            .as_deref()
            .and_then(disposition_file_name);
        let body = response.bytes().await?;

        tracing::debug!(
            path = %request.path(),
            bytes = body.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "Blob received"
        );

        Ok(BlobResponse {
            content_type,
            file_name,
            body,
        })
    }
}

/// `server_url` with `segments` appended, each percent-encoded
pub fn endpoint_url<S: AsRef<str>>(server_url: &str, segments: &[S]) -> Result<Url, FetchError> {
    let mut url = Url::parse(server_url)
        .map_err(|e| FetchError::Malformed(format!("invalid server url '{}': {}", server_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| FetchError::Malformed(format!("server url '{}' cannot be a base", server_url)))?
        .pop_if_empty()
        .extend(segments.iter().map(|s| s.as_ref()));

    Ok(url)
}

/// Map a non-2xx status to the failure taxonomy
pub fn status_error(status: u16, body: &str) -> FetchError {
    match status {
        401 => FetchError::Unauthenticated(
            server_message(body).unwrap_or_else(|| "server rejected the session token".to_string()),
        ),
        403 => FetchError::Forbidden,
        404 => FetchError::NotFound(server_message(body)),
        408 | 429 => FetchError::Status(status),
        400..=499 => FetchError::Rejected {
            status,
            message: server_message(body).unwrap_or_else(|| "request rejected by server".to_string()),
        },
        other => FetchError::Status(other),
    }
}

/// `message`, falling back to `error`, from a JSON error body
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `attachment; filename="cert.pdf"` -> `cert.pdf`
pub fn disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
