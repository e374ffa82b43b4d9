//! Environment variable overrides

use std::env;

use super::engine_config::EngineConfig;
use crate::error::{TabulaError, TabulaResult};

/// Overrides `formula_cache.capacity`
pub const CACHE_CAPACITY_ENV: &str = "TABULA_CACHE_CAPACITY";
/// Overrides `logging.level`
pub const LOG_LEVEL_ENV: &str = "TABULA_LOG_LEVEL";

/// Apply `TABULA_*` variables from the process environment
pub fn apply_env_overrides(config: &mut EngineConfig) -> TabulaResult<()> {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides from an arbitrary variable source
pub fn apply_overrides_from(
    config: &mut EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> TabulaResult<()> {
    if let Some(raw) = lookup(CACHE_CAPACITY_ENV) {
        let capacity: usize = raw.trim().parse().map_err(|_| {
            TabulaError::config(format!("Invalid {} value '{}'", CACHE_CAPACITY_ENV, raw))
        })?;
        tracing::debug!(capacity, "Formula cache capacity overridden from environment");
        config.formula_cache.capacity = capacity;
    }

    if let Some(level) = lookup(LOG_LEVEL_ENV) {
        if !level.trim().is_empty() {
            config.logging.level = level.trim().to_string();
        }
    }

    Ok(())
}
