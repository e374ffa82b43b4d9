//! Formula engine for computed columns

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

use super::cache::{CacheKey, CacheStats, DEFAULT_CACHE_CAPACITY, FormulaCache};
use super::row::Row;
use super::scope::FormulaScope;
use super::types::{Formula, FormulaDefinitions};
use crate::config::FormulaCacheConfig;
use crate::error::{TabulaError, TabulaResult};
use crate::expr::{self, Expr, ExprError};
use crate::value::Value;

#[derive(Debug, Clone)]
struct CompiledFormula {
    formula: Formula,
    program: Result<Expr, ExprError>,
}

impl CompiledFormula {
    fn compile(formula: Formula) -> Self {
        let program = expr::parse(&formula.expression);
        Self { formula, program }
    }
}

/// Evaluates computed columns for rows, memoizing results
///
/// Results are cached per `(column, row id, row version)`. A cached result
/// is returned as long as that key is present, even after the column's
/// formula is replaced; use [`invalidate_column`](Self::invalidate_column)
/// when that matters.
#[derive(Debug)]
pub struct FormulaEngine {
    formulas: BTreeMap<String, CompiledFormula>,
    cache: FormulaCache,
}

impl FormulaEngine {
    /// Create an engine with the default cache capacity
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create an engine whose cache holds at most `capacity` results
    /// (`0` for unbounded)
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            formulas: BTreeMap::new(),
            cache: FormulaCache::new(capacity),
        }
    }

    pub fn from_config(config: &FormulaCacheConfig) -> Self {
        Self::with_cache_capacity(config.capacity)
    }

    /// Register or replace the formula for a column
    ///
    /// An expression that does not compile is kept; evaluating that column
    /// then yields null.
    pub fn register_formula(&mut self, column_id: impl Into<String>, formula: Formula) {
        let column_id = column_id.into();
        let compiled = CompiledFormula::compile(formula);
        if let Err(err) = &compiled.program {
            tracing::warn!(
                column = %column_id,
                error = %err,
                "Registered formula does not compile"
            );
        }
        self.formulas.insert(column_id, compiled);
    }

    /// Register a formula only if its expression compiles
    pub fn try_register_formula(
        &mut self,
        column_id: impl Into<String>,
        formula: Formula,
    ) -> TabulaResult<()> {
        let column_id = column_id.into();
        let compiled = CompiledFormula::compile(formula);
        if let Err(err) = &compiled.program {
            return Err(TabulaError::expression(
                format!("formula for column '{}'", column_id),
                err.clone(),
            ));
        }
        self.formulas.insert(column_id, compiled);
        Ok(())
    }

    /// Register every formula of a definition set, stopping at the first
    /// one that does not compile
    pub fn register_definitions(&mut self, definitions: FormulaDefinitions) -> TabulaResult<()> {
        for (column_id, formula) in definitions.formulas {
            self.try_register_formula(column_id, formula)?;
        }
        Ok(())
    }

    /// Formula registered for a column
    pub fn formula(&self, column_id: &str) -> Option<&Formula> {
        self.formulas.get(column_id).map(|compiled| &compiled.formula)
    }

    /// Registered formula columns, sorted by id
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.formulas.keys().map(String::as_str)
    }

    /// Compute a column's value for a row
    ///
    /// Never fails: a missing formula or an evaluation error yields null,
    /// and nothing is cached in either case.
    pub fn evaluate(&self, column_id: &str, row: &Row, all_rows: Option<&[Row]>) -> Value {
        let key = CacheKey::new(column_id, row.id.as_str(), row.version);
        if let Some(value) = self.cache.get(&key) {
            tracing::debug!(
                column = %column_id,
                row = %row.id,
                version = row.version,
                "Formula cache hit"
            );
            return value;
        }

        let Some(compiled) = self.formulas.get(column_id) else {
            return Value::Null;
        };

        let scope = FormulaScope {
            row,
            all_rows,
            now: Utc::now(),
        };
        let outcome = compiled
            .program
            .as_ref()
            .map_err(|err| err.clone())
            .and_then(|program| expr::evaluate(program, &scope));

        match outcome {
            Ok(value) => {
                self.cache.insert(key, value.clone());
                value
            }
            Err(err) => {
                tracing::warn!(
                    column = %column_id,
                    row = %row.id,
                    expression = %compiled.formula.expression,
                    error = %err,
                    "Formula evaluation failed"
                );
                Value::Null
            }
        }
    }

    /// Compute every formula column for a row
    ///
    /// Columns run in dependency order and each one sees the values computed
    /// before it as bare variables. Columns on or behind a dependency cycle
    /// yield null.
    pub fn evaluate_row(&self, row: &Row, all_rows: Option<&[Row]>) -> BTreeMap<String, Value> {
        self.evaluate_in_order(row, all_rows, |_| true)
    }

    /// Compute one column after the formula columns it transitively
    /// depends on
    ///
    /// Yields the same value `evaluate_row` would give that column.
    pub fn evaluate_column(&self, column_id: &str, row: &Row, all_rows: Option<&[Row]>) -> Value {
        let needed = self.dependency_closure(column_id);
        self.evaluate_in_order(row, all_rows, |column| needed.contains(column))
            .remove(column_id)
            .unwrap_or(Value::Null)
    }

    fn evaluate_in_order(
        &self,
        row: &Row,
        all_rows: Option<&[Row]>,
        include: impl Fn(&str) -> bool,
    ) -> BTreeMap<String, Value> {
        let (order, blocked) = self.resolve_order();
        let blocked: Vec<String> = blocked.into_iter().filter(|c| include(c.as_str())).collect();
        if !blocked.is_empty() {
            tracing::warn!(columns = ?blocked, "Formula columns form a dependency cycle");
        }

        let mut working = row.clone();
        let mut results = BTreeMap::new();
        for column_id in order.into_iter().filter(|c| include(c.as_str())) {
            let value = self.evaluate(&column_id, &working, all_rows);
            working.data.insert(column_id.clone(), value.clone());
            results.insert(column_id, value);
        }
        for column_id in blocked {
            results.insert(column_id, Value::Null);
        }
        results
    }

    /// Registered formula columns reachable from `column_id` through
    /// `dependencies`, itself included
    fn dependency_closure<'a>(&'a self, column_id: &'a str) -> BTreeSet<&'a str> {
        let mut needed = BTreeSet::new();
        let mut pending = vec![column_id];
        while let Some(column) = pending.pop() {
            let Some(compiled) = self.formulas.get(column) else {
                continue;
            };
            if needed.insert(column) {
                pending.extend(compiled.formula.dependencies.iter().map(String::as_str));
            }
        }
        needed
    }

    /// Formula columns ordered so each comes after the formula columns it
    /// depends on
    pub fn evaluation_order(&self) -> TabulaResult<Vec<String>> {
        let (order, blocked) = self.resolve_order();
        if blocked.is_empty() {
            Ok(order)
        } else {
            Err(TabulaError::invalid_input_field(
                format!("formula dependency cycle among: {}", blocked.join(", ")),
                "dependencies",
            ))
        }
    }

    /// Split formula columns into a dependency order and the columns that
    /// can never be ordered
    fn resolve_order(&self) -> (Vec<String>, Vec<String>) {
        let mut remaining: BTreeSet<&str> = self.formulas.keys().map(String::as_str).collect();
        let mut order = Vec::with_capacity(remaining.len());

        let mut progress = true;
        while progress {
            progress = false;
            let snapshot: Vec<&str> = remaining.iter().copied().collect();
            for column_id in snapshot {
                let ready = self.formulas[column_id]
                    .formula
                    .dependencies
                    .iter()
                    .all(|dep| !remaining.contains(dep.as_str()));
                if ready {
                    remaining.remove(column_id);
                    order.push(column_id.to_string());
                    progress = true;
                }
            }
        }

        let blocked = remaining.into_iter().map(str::to_string).collect();
        (order, blocked)
    }

    /// Drop every cached result
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop cached results for a row
    pub fn invalidate_row(&self, row_id: &str) -> usize {
        self.cache.invalidate_row(row_id)
    }

    /// Drop cached results for a column
    pub fn invalidate_column(&self, column_id: &str) -> usize {
        self.cache.invalidate_column(column_id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
