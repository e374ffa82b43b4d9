//! Core error type for Tabula

use thiserror::Error;

use crate::expr::ExprError;

/// Result type alias for Tabula operations
pub type TabulaResult<T> = Result<T, TabulaError>;

/// Main error type for Tabula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabulaError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Definition or data files that could not be deserialized
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        path: Option<String>,
    },

    /// Expression compile errors, tagged with what was being compiled
    #[error("Expression error in {origin}: {source}")]
    Expression {
        origin: String,
        #[source]
        source: ExprError,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },
}

impl TabulaError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TabulaError::Config { .. } => "TABULA_CONFIG",
            TabulaError::Io { .. } => "TABULA_IO",
            TabulaError::Parse { .. } => "TABULA_PARSE",
            TabulaError::Expression { .. } => "TABULA_EXPRESSION",
            TabulaError::InvalidInput { .. } => "TABULA_INVALID_INPUT",
        }
    }
}
