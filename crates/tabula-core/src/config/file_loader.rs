//! File-based loading for configuration and definitions
//!
//! The format follows the file extension: `.toml`, `.yaml`/`.yml`, and JSON
//! for everything else. JSON files may contain `//` and `/* */` comments.

use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;

use super::engine_config::EngineConfig;
use crate::error::{TabulaError, TabulaResult};

/// Serialization format of a definition or configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
    Toml,
}

impl DefinitionFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => DefinitionFormat::Toml,
            Some("yaml") | Some("yml") => DefinitionFormat::Yaml,
            _ => DefinitionFormat::Json,
        }
    }

    /// Deserialize `content` in this format
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            DefinitionFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DefinitionFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DefinitionFormat::Json => {
                serde_json::from_str(&strip_json_comments(content)).map_err(|e| e.to_string())
            }
        }
    }
}

impl fmt::Display for DefinitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionFormat::Json => write!(f, "JSON"),
            DefinitionFormat::Yaml => write!(f, "YAML"),
            DefinitionFormat::Toml => write!(f, "TOML"),
        }
    }
}

/// Load engine configuration from a file
///
/// Returns the default configuration if the file does not exist.
pub fn load_from_file(path: &Path) -> TabulaResult<EngineConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        TabulaError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let format = DefinitionFormat::from_path(path);
    format.parse(&content).map_err(|e| {
        TabulaError::config_with_context(
            format!("Failed to parse {} config: {}", format, e),
            format!("Deserializing configuration from '{}'", path.display()),
        )
    })
}

/// Load a rules, formulas or rows file
pub fn load_definitions<T: DeserializeOwned>(path: impl AsRef<Path>) -> TabulaResult<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        TabulaError::io_with_path(format!("Failed to read file: {}", e), path.display().to_string())
    })?;

    let format = DefinitionFormat::from_path(path);
    let parsed = format.parse(&content).map_err(|e| {
        TabulaError::parse_with_path(
            format!("Failed to parse {}: {}", format, e),
            path.display().to_string(),
        )
    })?;
    tracing::debug!(path = %path.display(), format = %format, "Loaded definitions");
    Ok(parsed)
}

/// Strip JSON comments (// and /* */) outside string literals
fn strip_json_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if in_string {
            if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            result.push(c);
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                while chars.next_if(|&ch| ch != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for ch in chars.by_ref() {
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
            }
            _ => result.push(c),
        }
    }

    result
}
