//! Computed columns
//!
//! Formulas are expressions over a row's data cells with a few built-in
//! functions, including aggregates across the whole table. Results are
//! memoized per row version in a bounded LRU cache.

mod cache;
mod engine;
mod functions;
mod row;
mod scope;
mod types;

pub use cache::{CacheKey, CacheStats, DEFAULT_CACHE_CAPACITY, FormulaCache};
pub use engine::FormulaEngine;
pub use functions::BuiltinFunctions;
pub use row::Row;
pub use types::{FieldType, Formula, FormulaDefinitions};
