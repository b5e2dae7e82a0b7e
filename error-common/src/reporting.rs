// Error reporting utilities
// Writes terminal failures to the tracing pipeline together with their context

use crate::context::ErrorContext;
use crate::types::CertifyError;

#[derive(Debug, Default)]
pub struct ErrorReporter {
    service: String,
}

impl ErrorReporter {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn report(&self, error: &CertifyError, context: &ErrorContext) {
        let context_json = serde_json::to_string(context).unwrap_or_default();
        tracing::error!(
            service = %self.service,
            error_code = error.code(),
            certificate_id = context.certificate_id.as_deref().unwrap_or("-"),
            context = %context_json,
            "Error reported: {}",
            error
        );
    }
}
