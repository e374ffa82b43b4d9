//! Engine configuration
//!
//! Settings come from a JSON, YAML or TOML file chosen by extension, then
//! `TABULA_*` environment variables override individual values.

mod engine_config;
mod env_loader;
mod file_loader;
mod logging_config;

pub use engine_config::{EngineConfig, FormulaCacheConfig};
pub use env_loader::{
    CACHE_CAPACITY_ENV, LOG_LEVEL_ENV, apply_env_overrides, apply_overrides_from,
};
pub use file_loader::{DefinitionFormat, load_definitions, load_from_file};
pub use logging_config::LoggingConfig;
