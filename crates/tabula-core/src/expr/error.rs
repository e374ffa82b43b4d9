//! Expression errors

use thiserror::Error;

/// Result type alias for expression compilation and evaluation
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors raised while lexing, parsing or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number `{text}` at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("only named functions can be called (offset {offset})")]
    InvalidCallee { offset: usize },

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("type error: {0}")]
    Type(String),
}

impl ExprError {
    /// Check an argument count against an exact expectation
    pub fn check_arity(function: &str, expected: usize, found: usize) -> ExprResult<()> {
        if expected == found {
            Ok(())
        } else {
            Err(ExprError::Arity {
                function: function.to_string(),
                expected: expected.to_string(),
                found,
            })
        }
    }
}
