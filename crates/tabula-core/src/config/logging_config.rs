//! Logging configuration

use serde::{Deserialize, Serialize};

use crate::error::{TabulaError, TabulaResult};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> TabulaResult<()> {
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(TabulaError::config_with_context(
                format!("Unknown log level '{}'", self.level),
                format!("expected one of: {}", LEVELS.join(", ")),
            ));
        }
        if !FORMATS.contains(&self.format.as_str()) {
            return Err(TabulaError::config_with_context(
                format!("Unknown log format '{}'", self.format),
                format!("expected one of: {}", FORMATS.join(", ")),
            ));
        }
        Ok(())
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}
