//! Top-level engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::env_loader::apply_env_overrides;
use super::file_loader::load_from_file;
use super::logging_config::LoggingConfig;
use crate::error::TabulaResult;
use crate::formula::DEFAULT_CACHE_CAPACITY;

/// Formula result cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaCacheConfig {
    /// Maximum cached results, `0` for unbounded
    pub capacity: usize,
}

impl Default for FormulaCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub formula_cache: FormulaCacheConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load from a file (defaults if it does not exist), then apply
    /// environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> TabulaResult<Self> {
        let mut config = load_from_file(path.as_ref())?;
        apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TabulaResult<()> {
        self.logging.validate()
    }
}
