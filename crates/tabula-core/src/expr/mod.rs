//! Sandboxed expression language
//!
//! Permission conditions and formula columns are written in a small
//! expression language instead of being executed as host code:
//! - Literals: `12`, `3.5`, `'text'`, `"text"`, `true`, `false`, `null`, `[1, 2]`
//! - Identifiers and property access: `subject.role`, `data["A1"]`, `tags.length`
//! - Arithmetic: `+ - * / %` (`+` concatenates when either side is a string)
//! - Comparison and logic: `== != === !== < <= > >= && || !`
//! - Conditionals: `cond ? a : b`
//! - Function calls: `SUM('amount')`, `hourOfDay()`
//!
//! A single leading `=` is accepted so spreadsheet-style `=A1+B1` parses.
//! Which identifiers and functions exist is decided entirely by the
//! [`Scope`] an expression is evaluated against.
//!
//! # Example
//!
//! ```rust
//! use tabula_core::expr::{self, MapScope};
//! use tabula_core::Value;
//!
//! let program = expr::parse("price * qty > 100 ? 'bulk' : 'retail'").unwrap();
//! let scope = MapScope::new()
//!     .with_value("price", 12.5)
//!     .with_value("qty", 10);
//! assert_eq!(expr::evaluate(&program, &scope).unwrap(), Value::from("bulk"));
//! ```

mod ast;
mod error;
mod interpreter;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{ExprError, ExprResult};
pub use interpreter::{MapScope, Scope, evaluate, loose_eq};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{MAX_DEPTH, parse};
