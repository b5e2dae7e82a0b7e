//! Content-type classification
//!
//! Decides whether a payload is shown as an image, an embedded document or a
//! download-only placeholder, from the declared MIME type and file name.

use serde::{Deserialize, Serialize};

/// How a fetched certificate payload is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviewKind {
    /// Rendered with an image element
    Image,
    /// Rendered in an embedded document frame (PDF)
    Document,
    /// Textual fallback with a download link
    Unsupported,
}

impl PreviewKind {
    /// Glyph shown on file placeholders
    pub fn icon(&self) -> &'static str {
        match self {
            PreviewKind::Document => "📄",
            PreviewKind::Image => "🖼️",
            PreviewKind::Unsupported => "📎",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PreviewKind::Image => "Image",
            PreviewKind::Document => "PDF Document",
            PreviewKind::Unsupported => "File",
        }
    }

    pub fn is_previewable(&self) -> bool {
        !matches!(self, PreviewKind::Unsupported)
    }
}

const IMAGE_MIME_MARKERS: [&str; 4] = ["image", "jpeg", "jpg", "png"];
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];
const DOCUMENT_MIME_MARKERS: [&str; 1] = ["pdf"];
const DOCUMENT_EXTENSIONS: [&str; 1] = [".pdf"];

/// Classification rules
///
/// Images always fall back to the file extension. Documents do so only when
/// `pdf_extension_fallback` is set; with it cleared a MIME-less `.pdf` upload
/// is `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierPolicy {
    pub pdf_extension_fallback: bool,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            pdf_extension_fallback: true,
        }
    }
}

impl ClassifierPolicy {
    /// Document detection from the declared MIME type only
    pub fn mime_only_documents() -> Self {
        Self {
            pdf_extension_fallback: false,
        }
    }

    pub fn classify(&self, mime_type: Option<&str>, file_name: Option<&str>) -> PreviewKind {
        let mime = normalize(mime_type);
        let name = normalize(file_name);

        let image_by_mime = IMAGE_MIME_MARKERS.iter().any(|m| mime.contains(m));
        let image_by_name = IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext));
        if image_by_mime || image_by_name {
            return PreviewKind::Image;
        }

        let document_by_mime = DOCUMENT_MIME_MARKERS.iter().any(|m| mime.contains(m));
        let document_by_name = self.pdf_extension_fallback
            && DOCUMENT_EXTENSIONS.iter().any(|ext| name.ends_with(ext));
        if document_by_mime || document_by_name {
            return PreviewKind::Document;
        }

        PreviewKind::Unsupported
    }
}

/// Classify with the default policy
pub fn classify(mime_type: Option<&str>, file_name: Option<&str>) -> PreviewKind {
    ClassifierPolicy::default().classify(mime_type, file_name)
}

fn normalize(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_by_mime_and_name() {
        assert_eq!(classify(Some("image/png"), Some("cert.png")), PreviewKind::Image);
    }

    #[test]
    fn test_image_by_extension_when_mime_is_wrong() {
        assert_eq!(
            classify(Some("application/octet-stream"), Some("Scan.JPEG")),
            PreviewKind::Image
        );
        assert_eq!(classify(None, Some("badge.gif")), PreviewKind::Image);
    }

    #[test]
    fn test_image_mime_markers() {
        assert_eq!(classify(Some("IMAGE/WEBP"), None), PreviewKind::Image);
        assert_eq!(classify(Some("application/jpg"), None), PreviewKind::Image);
    }

    #[test]
    fn test_pdf_by_mime() {
        assert_eq!(
            classify(Some("application/pdf"), Some("certificate")),
            PreviewKind::Document
        );
    }

    #[test]
    fn test_mimeless_pdf_follows_policy() {
        assert_eq!(classify(Some(""), Some("cert.PDF")), PreviewKind::Document);
        assert_eq!(
            ClassifierPolicy::mime_only_documents().classify(Some(""), Some("cert.PDF")),
            PreviewKind::Unsupported
        );
    }

    #[test]
    fn test_image_wins_over_document() {
        assert_eq!(
            classify(Some("application/pdf"), Some("scan.png")),
            PreviewKind::Image
        );
    }

    #[test]
    fn test_both_hints_empty_is_unsupported() {
        assert_eq!(classify(Some(""), Some("")), PreviewKind::Unsupported);
        assert_eq!(classify(None, None), PreviewKind::Unsupported);
        assert_eq!(classify(Some("   "), None), PreviewKind::Unsupported);
    }

    #[test]
    fn test_other_formats_unsupported() {
        assert_eq!(
            classify(
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                Some("cert.docx")
            ),
            PreviewKind::Unsupported
        );
    }

    #[test]
    fn test_deterministic() {
        let first = classify(Some("image/png"), Some("cert.png"));
        for _ in 0..10 {
            assert_eq!(classify(Some("image/png"), Some("cert.png")), first);
        }
    }

    #[test]
    fn test_icons() {
        assert_eq!(PreviewKind::Document.icon(), "📄");
        assert_eq!(PreviewKind::Unsupported.icon(), "📎");
        assert!(!PreviewKind::Unsupported.is_previewable());
    }
}
