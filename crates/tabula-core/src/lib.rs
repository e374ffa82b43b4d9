//! Tabula Core Library
//!
//! This crate provides the evaluation core of the Tabula table service:
//! rule-based permission checks, formula columns with a result cache, the
//! expression language both are written in, and configuration loading.

pub mod config;
pub mod error;
pub mod expr;
pub mod formula;
pub mod permission;
pub mod value;

// Re-export commonly used types
pub use config::{EngineConfig, FormulaCacheConfig, LoggingConfig};
pub use error::{TabulaError, TabulaResult};
pub use formula::{CacheStats, FieldType, Formula, FormulaDefinitions, FormulaEngine, Row};
pub use permission::{
    Action, Effect, PermissionEngine, PermissionEvaluation, PermissionRule, PermissionRulesConfig,
};
pub use value::{Attributes, Value};
