//! Viewer rendering
//!
//! Turns a fetched [`PreviewResource`] into HTML: an inline fragment for an
//! embedding page, or a standalone viewer document that owns the resource
//! for as long as the window is open.

use crate::classification::{ClassifierPolicy, PreviewKind};
use crate::error::FailureKind;
use crate::fetcher::PreviewFailure;
use crate::models::{CertificateRef, Role};
use crate::resource::PreviewResource;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use handlebars::Handlebars;
use serde_json::json;
use thiserror::Error;

pub const NOT_FOUND_GUIDANCE: &str =
    "File not found. This certificate does not have an associated file; it may be a sample record.";
pub const STUDENT_FORBIDDEN_GUIDANCE: &str = "You do not have permission to view this certificate.";
pub const STAFF_FORBIDDEN_GUIDANCE: &str = "Your staff account is not permitted to review this certificate.";
pub const SESSION_GUIDANCE: &str = "Your session has expired. Please sign in again.";
pub const FALLBACK_GUIDANCE: &str = "Preview unavailable. Please try downloading instead.";
pub const UNSUPPORTED_GUIDANCE: &str = "Preview not available for this file type. Please download to view.";

const INLINE_IMAGE: &str = "inline_image";
const INLINE_DOCUMENT: &str = "inline_document";
const INLINE_UNSUPPORTED: &str = "inline_unsupported";
const PLACEHOLDER: &str = "placeholder";
const LOADING: &str = "loading";
const WINDOW: &str = "window";

const TEMPLATES: [(&str, &str); 6] = [
    (
        INLINE_IMAGE,
        r#"<img class="certificate-preview" src="{{src}}" alt="{{title}}">"#,
    ),
    (
        INLINE_DOCUMENT,
        r#"<iframe class="certificate-preview" src="{{src}}" title="{{title}}" width="100%" height="600"></iframe>"#,
    ),
    (
        INLINE_UNSUPPORTED,
        r#"<div class="file-fallback">
  <div class="file-icon">{{icon}}</div>
  <p class="file-name">{{file_name}}</p>
  <p class="guidance">{{guidance}}</p>
  <a class="download-link" href="{{src}}" download="{{file_name}}">Download file</a>
</div>"#,
    ),
    (
        PLACEHOLDER,
        r#"<div class="file-placeholder" data-kind="{{kind}}">
  <div class="file-icon">{{icon}}</div>
  <p class="file-name">{{file_name}}</p>
  <p class="guidance">{{guidance}}</p>
</div>"#,
    ),
    (
        LOADING,
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{title}}</title></head>
<body><p class="loading">Loading certificate…</p></body>
</html>"#,
    ),
    (
        WINDOW,
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{title}}</title>
  <style>
    body { margin: 0; font-family: sans-serif; background: #f4f4f4; }
    header { padding: 12px 20px; background: #fff; border-bottom: 1px solid #ddd; }
    main { display: flex; justify-content: center; padding: 20px; }
    img.certificate-preview { max-width: 100%; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.15); }
    iframe.certificate-preview { border: none; min-height: 90vh; }
  </style>
</head>
<body>
  <header>
    <h1>{{title}}</h1>
    {{#if file_name}}<p class="file-name">{{file_name}}</p>{{/if}}
  </header>
  <main>{{{body}}}</main>
</body>
</html>"#,
    ),
];

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// How a viewer document references the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Embedding {
    /// The resource's `blob:` URL; valid only while the resource is live
    #[default]
    ObjectUrl,
    /// A base64 `data:` URI; the document is self-contained
    Inline,
}

/// Guidance shown in place of a preview
pub fn guidance(role: Role, failure: Option<FailureKind>) -> &'static str {
    match (failure, role) {
        (Some(FailureKind::NotFound), _) => NOT_FOUND_GUIDANCE,
        (Some(FailureKind::Forbidden), Role::Student) => STUDENT_FORBIDDEN_GUIDANCE,
        (Some(FailureKind::Forbidden), Role::Staff) => STAFF_FORBIDDEN_GUIDANCE,
        (Some(FailureKind::Unauthenticated), _) => SESSION_GUIDANCE,
        (Some(_), _) => FALLBACK_GUIDANCE,
        (None, _) => UNSUPPORTED_GUIDANCE,
    }
}

pub struct ViewerPresenter {
    templates: Handlebars<'static>,
    policy: ClassifierPolicy,
    embedding: Embedding,
}

impl ViewerPresenter {
    pub fn new() -> Result<Self, PresenterError> {
        let mut templates = Handlebars::new();
        for (name, source) in TEMPLATES {
            templates.register_template_string(name, source)?;
        }
        Ok(Self {
            templates,
            policy: ClassifierPolicy::default(),
            embedding: Embedding::default(),
        })
    }

    pub fn with_policy(mut self, policy: ClassifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = embedding;
        self
    }

    /// Fragment for `resource`: `<img>`, `<iframe>` or a download fallback
    pub fn render_inline(
        &self,
        resource: &PreviewResource,
        certificate: &CertificateRef,
        title: &str,
    ) -> Result<String, PresenterError> {
        let src = self.source(resource);
        let kind = resource.kind();
        let template = match kind {
            PreviewKind::Image => INLINE_IMAGE,
            PreviewKind::Document => INLINE_DOCUMENT,
            PreviewKind::Unsupported => INLINE_UNSUPPORTED,
        };

        let data = json!({
            "src": src,
            "title": title,
            "icon": kind.icon(),
            "file_name": display_file_name(certificate),
            "guidance": UNSUPPORTED_GUIDANCE,
        });
        Ok(self.templates.render(template, &data)?)
    }

    /// Icon, file name and guidance for a certificate without a preview
    pub fn render_placeholder(
        &self,
        certificate: &CertificateRef,
        failure: Option<&PreviewFailure>,
    ) -> Result<String, PresenterError> {
        let kind = self
            .policy
            .classify(certificate.mime_type.as_deref(), certificate.file_name.as_deref());

        let data = json!({
            "kind": kind,
            "icon": kind.icon(),
            "file_name": display_file_name(certificate),
            "guidance": guidance(certificate.role, failure.map(PreviewFailure::kind)),
        });
        Ok(self.templates.render(PLACEHOLDER, &data)?)
    }

    pub fn render_loading(&self, title: &str) -> Result<String, PresenterError> {
        Ok(self.templates.render(LOADING, &json!({ "title": title }))?)
    }

    /// Standalone viewer that takes ownership of `resource`
    pub fn open_window(
        &self,
        resource: PreviewResource,
        certificate: &CertificateRef,
        title: &str,
    ) -> Result<ViewerWindow, PresenterError> {
        let body = self.render_inline(&resource, certificate, title)?;
        let data = json!({
            "title": title,
            "file_name": certificate.file_name,
            "body": body,
        });
        let document = self.templates.render(WINDOW, &data)?;

        tracing::debug!(
            certificate_id = %certificate.id,
            url = %resource.url(),
            embedding = ?self.embedding,
            "Viewer window opened"
        );

        Ok(ViewerWindow {
            document,
            resource: Some(resource),
        })
    }

    fn source(&self, resource: &PreviewResource) -> String {
        match self.embedding {
            Embedding::ObjectUrl => resource.url().to_string(),
            Embedding::Inline => data_uri(resource),
        }
    }
}

fn display_file_name(certificate: &CertificateRef) -> String {
    certificate
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("certificate-{}", certificate.id))
}

fn data_uri(resource: &PreviewResource) -> String {
    format!(
        "data:{};base64,{}",
        resource.content_type().unwrap_or("application/octet-stream"),
        STANDARD.encode(resource.bytes())
    )
}

/// Open viewer; the resource stays live until `close` or drop
pub struct ViewerWindow {
    document: String,
    resource: Option<PreviewResource>,
}

impl ViewerWindow {
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn resource(&self) -> Option<&PreviewResource> {
        self.resource.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.resource.is_some()
    }

    pub fn close(&mut self) {
        if let Some(resource) = self.resource.take() {
            tracing::debug!(url = %resource.url(), "Viewer window closed");
            resource.release();
        }
    }
}

impl std::fmt::Debug for ViewerWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerWindow")
            .field("open", &self.is_open())
            .field("document_len", &self.document.len())
            .finish()
    }
}
