//! Constructor methods for TabulaError

use super::types::TabulaError;
use crate::expr::ExprError;

impl TabulaError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an IO error with a path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a parse error with a path
    pub fn parse_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Wrap an expression error
    pub fn expression(origin: impl Into<String>, source: ExprError) -> Self {
        Self::Expression {
            origin: origin.into(),
            source,
        }
    }

    /// Create an invalid input error for a specific field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}
