use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref BEARER_REGEX: Regex = Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+").unwrap();
    static ref JWT_REGEX: Regex = Regex::new(r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").unwrap();
    static ref TOKEN_PARAM_REGEX: Regex = Regex::new(r"(?i)\b(access_token|token)=([^&\s]+)").unwrap();
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
}

/// Credential redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_bearer_tokens: bool,
    pub redact_jwts: bool,
    pub redact_token_params: bool,
    pub redact_emails: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_bearer_tokens: true,
            redact_jwts: true,
            redact_token_params: true,
            redact_emails: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// Scrubs credentials out of text before it reaches a log sink
#[derive(Debug, Clone, Default)]
pub struct CredentialRedactor {
    config: RedactionConfig,
}

impl CredentialRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // Bearer headers first so the token inside is not matched twice
        if self.config.redact_bearer_tokens {
            result = self.redact_bearer_tokens(&result);
        }

        if self.config.redact_jwts {
            result = self.redact_jwts(&result);
        }

        if self.config.redact_token_params {
            result = self.redact_token_params(&result);
        }

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn redact_bearer_tokens(&self, text: &str) -> String {
        BEARER_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("Bearer [{}]", self.hash_value(&caps[0]))
                } else {
                    "Bearer [REDACTED]".to_string()
                }
            })
            .to_string()
    }

    fn redact_jwts(&self, text: &str) -> String {
        JWT_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("JWT[{}]", self.hash_value(&caps[0]))
                } else {
                    "JWT[REDACTED]".to_string()
                }
            })
            .to_string()
    }

    fn redact_token_params(&self, text: &str) -> String {
        TOKEN_PARAM_REGEX
            .replace_all(text, |caps: &regex::Captures| format!("{}=[REDACTED]", &caps[1]))
            .to_string()
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = &caps[0];
                if self.config.hash_for_correlation {
                    format!("EMAIL[{}]", self.hash_value(email))
                } else {
                    match email.split_once('@') {
                        Some((local, domain)) => format!(
                            "{}***@{}***",
                            local.chars().next().unwrap_or('*'),
                            domain.chars().next().unwrap_or('*')
                        ),
                        None => "***@***".to_string(),
                    }
                }
            })
            .to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD_NO_PAD.encode(&result[..6])
    }
}
