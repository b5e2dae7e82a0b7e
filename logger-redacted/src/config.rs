// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub redaction_enabled: bool,
    pub log_level: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json_output: bool,
    /// Extra `target=level` directives appended to the default filter
    pub directives: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            log_level: "info".to_string(),
            json_output: false,
            directives: vec!["reqwest=info".to_string(), "hyper=warn".to_string()],
        }
    }
}

impl LoggerConfig {
    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.log_level = "debug".to_string();
        }
        self
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    /// Filter string used when `RUST_LOG` is not set
    pub fn filter_directives(&self) -> String {
        let mut parts = vec![
            format!("certify_preview={}", self.log_level),
            format!("certify_cli={}", self.log_level),
        ];
        parts.extend(self.directives.iter().cloned());
        parts.join(",")
    }
}
