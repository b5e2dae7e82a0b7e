use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error context information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    pub certificate_id: Option<String>,
    pub role: Option<String>,
    pub attempts: Option<u32>,
    pub endpoint: Option<String>,
    pub additional: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificate_id(mut self, certificate_id: impl Into<String>) -> Self {
        self.certificate_id = Some(certificate_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let ctx = ErrorContext::new()
            .with_certificate_id("c1")
            .with_role("STAFF")
            .with_attempts(3)
            .add_context("file_name", "cert.pdf");

        assert_eq!(ctx.certificate_id.as_deref(), Some("c1"));
        assert_eq!(ctx.role.as_deref(), Some("STAFF"));
        assert_eq!(ctx.attempts, Some(3));
        assert_eq!(ctx.additional.get("file_name").map(String::as_str), Some("cert.pdf"));
        assert!(ctx.endpoint.is_none());
    }
}
