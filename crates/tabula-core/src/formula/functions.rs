//! Built-in formula functions
//!
//! Names are matched case-insensitively:
//! - SUM(field), AVG(field), COUNT(field), MAX(field), MIN(field) over all rows
//! - IF(condition, then, else)
//! - CONCAT(values...)
//! - NOW()
//! - DAYS_BETWEEN(from, to)

use chrono::{DateTime, Utc};

use super::row::Row;
use crate::expr::{ExprError, ExprResult};
use crate::value::Value;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Built-in function registry
pub struct BuiltinFunctions;

impl BuiltinFunctions {
    /// Execute a built-in function
    ///
    /// `rows` is the table the aggregates run over; `None` behaves as an
    /// empty table.
    pub fn execute(
        name: &str,
        args: &[Value],
        rows: Option<&[Row]>,
        now: DateTime<Utc>,
    ) -> ExprResult<Value> {
        match name.to_ascii_uppercase().as_str() {
            // Aggregates
            "SUM" => Self::sum(&Self::column(name, args, rows)?),
            "AVG" => Self::avg(&Self::column(name, args, rows)?),
            "COUNT" => Ok(Value::Number(Self::column(name, args, rows)?.len() as f64)),
            "MAX" => Ok(Self::extreme(&Self::column(name, args, rows)?, f64::max)),
            "MIN" => Ok(Self::extreme(&Self::column(name, args, rows)?, f64::min)),

            // Logic and text
            "IF" => Self::if_fn(name, args),
            "CONCAT" => Ok(Self::concat(args)),

            // Dates
            "NOW" => {
                ExprError::check_arity(name, 0, args.len())?;
                Ok(Value::DateTime(now))
            }
            "DAYS_BETWEEN" => Self::days_between(name, args),

            _ => Err(ExprError::UnknownFunction(name.to_string())),
        }
    }

    // Aggregate functions

    /// Non-null values of one data field across the table
    fn column<'a>(
        name: &str,
        args: &[Value],
        rows: Option<&'a [Row]>,
    ) -> ExprResult<Vec<&'a Value>> {
        ExprError::check_arity(name, 1, args.len())?;
        let field = args[0].to_display_string();

        Ok(rows
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row.data.get(&field))
            .filter(|value| !value.is_null())
            .collect())
    }

    fn sum(values: &[&Value]) -> ExprResult<Value> {
        Ok(Value::Number(values.iter().map(|v| v.to_number()).sum()))
    }

    fn avg(values: &[&Value]) -> ExprResult<Value> {
        if values.is_empty() {
            return Ok(Value::Number(0.0));
        }
        let total: f64 = values.iter().map(|v| v.to_number()).sum();
        Ok(Value::Number(total / values.len() as f64))
    }

    /// Largest or smallest value; null for an empty set, NaN if any value
    /// is not numeric
    fn extreme(values: &[&Value], pick: fn(f64, f64) -> f64) -> Value {
        let mut numbers = values.iter().map(|v| v.to_number());
        let Some(first) = numbers.next() else {
            return Value::Null;
        };

        let result = numbers.try_fold(first, |acc, n| {
            if n.is_nan() {
                None
            } else {
                Some(pick(acc, n))
            }
        });
        match result {
            Some(n) if !first.is_nan() => Value::Number(n),
            _ => Value::Number(f64::NAN),
        }
    }

    // Conditional and string functions

    fn if_fn(name: &str, args: &[Value]) -> ExprResult<Value> {
        ExprError::check_arity(name, 3, args.len())?;
        let chosen = if args[0].is_truthy() { &args[1] } else { &args[2] };
        Ok(chosen.clone())
    }

    fn concat(args: &[Value]) -> Value {
        Value::String(args.iter().map(Value::to_display_string).collect())
    }

    // Date functions

    fn days_between(name: &str, args: &[Value]) -> ExprResult<Value> {
        ExprError::check_arity(name, 2, args.len())?;
        let (Some(from), Some(to)) = (args[0].to_datetime(), args[1].to_datetime()) else {
            return Err(ExprError::Type(format!(
                "{} expects two dates, got {} and {}",
                name,
                args[0].type_name(),
                args[1].type_name()
            )));
        };

        let millis = (to - from).num_milliseconds() as f64;
        Ok(Value::Number((millis / MILLIS_PER_DAY).floor()))
    }
}
