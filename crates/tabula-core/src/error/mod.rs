//! Error types for Tabula
//!
//! Fallible operations outside of evaluation (compiling expressions, loading
//! configuration, reading definition files) return [`TabulaResult`].
//! Evaluation itself never fails outward: the engines degrade to a safe
//! default and report through `tracing`.

mod constructors;
mod types;

pub use types::{TabulaError, TabulaResult};
