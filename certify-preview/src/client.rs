//! Client for the certificate records, upload and dashboard endpoints

use crate::config::PreviewConfig;
use crate::error::{FetchError, FetchResult};
use crate::models::{Certificate, CertificateMetadata, CertificateStatus, DashboardStats, Role};
use crate::session::CredentialProvider;
use crate::transport::{endpoint_url, status_error};
use bytes::Bytes;
use logger_redacted::redacted_info;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    remarks: &'a str,
}

/// A certificate file submitted by the signed-in student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateUpload {
    pub certificate_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub metadata: CertificateMetadata,
}

impl CertificateUpload {
    pub fn new(certificate_name: impl Into<String>, file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            certificate_name: certificate_name.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
            metadata: CertificateMetadata::default(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_metadata(mut self, metadata: CertificateMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    fn validate(&self) -> FetchResult<()> {
        if self.certificate_name.trim().is_empty() {
            return Err(FetchError::Malformed("certificate name is required".to_string()));
        }
        if self.bytes.is_empty() {
            return Err(FetchError::Malformed(format!("file '{}' is empty", self.file_name)));
        }
        Ok(())
    }

    /// `file` and `certificateName`, plus whichever metadata fields are set
    fn into_form(self) -> FetchResult<Form> {
        let mut file = Part::bytes(self.bytes.to_vec()).file_name(self.file_name);
        if let Some(content_type) = self.content_type {
            file = file
                .mime_str(&content_type)
                .map_err(|e| FetchError::Malformed(format!("invalid content type '{}': {}", content_type, e)))?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("certificateName", self.certificate_name);

        let metadata = self.metadata;
        let fields = [
            ("certificateType", metadata.certificate_type),
            ("issuingOrganization", metadata.issuing_organization),
            ("issueYear", metadata.issue_year),
            ("department", metadata.department),
        ];
        for (name, value) in fields {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                form = form.text(name, value);
            }
        }
        Ok(form)
    }
}

/// Certificate records API; no automatic retry
pub struct CertificateClient {
    client: reqwest::Client,
    server_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl CertificateClient {
    pub fn new(config: &PreviewConfig, credentials: Arc<dyn CredentialProvider>) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Every certificate visible to `role`
    pub async fn list(&self, role: Role) -> FetchResult<Vec<Certificate>> {
        let url = self.url(&["api", role.segment(), "certificates"])?;
        self.fetch_json(Method::GET, url).await
    }

    /// The signed-in student's own uploads
    pub async fn list_mine(&self) -> FetchResult<Vec<Certificate>> {
        let url = self.url(&["api", "student", "certificates", "my"])?;
        self.fetch_json(Method::GET, url).await
    }

    pub async fn by_status(&self, role: Role, status: CertificateStatus) -> FetchResult<Vec<Certificate>> {
        let url = self.url(&["api", role.segment(), "certificates", "status", status.as_str()])?;
        self.fetch_json(Method::GET, url).await
    }

    pub async fn search(&self, role: Role, student_name: &str) -> FetchResult<Vec<Certificate>> {
        let mut url = self.url(&["api", role.segment(), "certificates", "search"])?;
        url.query_pairs_mut().append_pair("studentName", student_name);
        self.fetch_json(Method::GET, url).await
    }

    /// Dashboard counters for `role`
    pub async fn analytics(&self, role: Role) -> FetchResult<DashboardStats> {
        let url = self.url(&["api", "analytics", role.segment(), "dashboard"])?;
        self.fetch_json(Method::GET, url).await
    }

    /// Upload a certificate file as the signed-in student
    pub async fn upload(&self, upload: CertificateUpload) -> FetchResult<Certificate> {
        upload.validate()?;
        let url = self.url(&["api", "student", "certificates", "upload"])?;
        let size = upload.bytes.len();

        let request = self.authorized(Method::POST, url)?.multipart(upload.into_form()?);
        let certificate: Certificate = decode(dispatch(request).await?).await?;

        tracing::info!(
            certificate_id = %certificate.certificate_id,
            bytes = size,
            "Certificate uploaded"
        );
        Ok(certificate)
    }

    pub async fn verify(&self, certificate_id: &str, remarks: &str) -> FetchResult<Certificate> {
        self.review(certificate_id, "verify", remarks).await
    }

    pub async fn reject(&self, certificate_id: &str, remarks: &str) -> FetchResult<Certificate> {
        self.review(certificate_id, "reject", remarks).await
    }

    pub async fn delete(&self, certificate_id: &str) -> FetchResult<()> {
        let url = self.certificate_url(Role::Student, certificate_id, None)?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        tracing::info!(certificate_id = %certificate_id, "Certificate deleted");
        Ok(())
    }

    async fn review(&self, certificate_id: &str, action: &str, remarks: &str) -> FetchResult<Certificate> {
        let url = self.certificate_url(Role::Staff, certificate_id, Some(action))?;
        let response = self
            .send(Method::PUT, url, Some(&ReviewRequest { remarks }))
            .await?;
        let certificate: Certificate = decode(response).await?;

        redacted_info!(
            "Certificate {} marked {} with remarks '{}'",
            certificate.certificate_id,
            certificate.status,
            remarks
        );
        Ok(certificate)
    }

    fn certificate_url(&self, role: Role, certificate_id: &str, action: Option<&str>) -> FetchResult<Url> {
        if certificate_id.trim().is_empty() {
            return Err(FetchError::MissingId);
        }
        let mut segments = vec!["api", role.segment(), "certificates", certificate_id];
        segments.extend(action);
        self.url(&segments)
    }

    fn url(&self, segments: &[&str]) -> FetchResult<Url> {
        endpoint_url(&self.server_url, segments)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, method: Method, url: Url) -> FetchResult<T> {
        let response = self.send(method, url, None::<&()>).await?;
        decode(response).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> FetchResult<reqwest::Response> {
        let mut request = self.authorized(method, url)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        dispatch(request).await
    }

    fn authorized(&self, method: Method, url: Url) -> FetchResult<RequestBuilder> {
        let token = self.credentials.bearer_token()?;
        tracing::debug!(method = %method, path = %url.path(), "Certificate API request");

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret()))
    }
}

async fn dispatch(request: RequestBuilder) -> FetchResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status.as_u16(), &body));
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> FetchResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(format!("invalid JSON response: {}", e)))
}

impl std::fmt::Debug for CertificateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateClient")
            .field("server_url", &self.server_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticToken;

    fn client(url: &str) -> CertificateClient {
        let config = PreviewConfig::default().with_server_url(url);
        CertificateClient::new(&config, Arc::new(StaticToken::new("tok"))).unwrap()
    }

    #[test]
    fn test_certificate_url() {
        let client = client("http://localhost:8080/");
        assert_eq!(
            client.certificate_url(Role::Staff, "c1", Some("verify")).unwrap().as_str(),
            "http://localhost:8080/api/staff/certificates/c1/verify"
        );
        assert_eq!(
            client.certificate_url(Role::Student, "c1", None).unwrap().path(),
            "/api/student/certificates/c1"
        );
        assert_eq!(
            client.certificate_url(Role::Staff, " ", Some("verify")).unwrap_err(),
            FetchError::MissingId
        );
    }

    #[test]
    fn test_review_body() {
        let body = serde_json::to_value(ReviewRequest { remarks: "Looks good" }).unwrap();
        assert_eq!(body, serde_json::json!({ "remarks": "Looks good" }));
    }

    #[test]
    fn test_upload_validation() {
        let missing_name = CertificateUpload::new("  ", "aws.pdf", &b"%PDF"[..]);
        assert!(matches!(missing_name.validate(), Err(FetchError::Malformed(_))));

        let empty_file = CertificateUpload::new("AWS", "aws.pdf", Bytes::new());
        assert!(matches!(empty_file.validate(), Err(FetchError::Malformed(_))));

        let upload = CertificateUpload::new("AWS", "aws.pdf", &b"%PDF"[..]).with_content_type("application/pdf");
        assert!(upload.validate().is_ok());
        assert!(upload.into_form().is_ok());
    }

    #[test]
    fn test_upload_rejects_bad_content_type() {
        let upload = CertificateUpload::new("AWS", "aws.pdf", &b"%PDF"[..]).with_content_type("not a mime");
        assert!(matches!(upload.into_form(), Err(FetchError::Malformed(_))));
    }
}
