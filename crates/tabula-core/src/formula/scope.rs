//! Evaluation scope for formulas

use chrono::{DateTime, Utc};

use super::functions::BuiltinFunctions;
use super::row::Row;
use crate::expr::{ExprResult, Scope};
use crate::value::Value;

/// Data cells as bare variables, then `data`, `ROW` and `ALL_ROWS`
pub(super) struct FormulaScope<'a> {
    pub row: &'a Row,
    pub all_rows: Option<&'a [Row]>,
    pub now: DateTime<Utc>,
}

impl Scope for FormulaScope<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.row.data.get(name) {
            return Some(value.clone());
        }

        match name {
            "data" => Some(Value::Object(self.row.data.clone())),
            "ROW" => Some(self.row.to_value()),
            "ALL_ROWS" => Some(Value::Array(
                self.all_rows
                    .unwrap_or_default()
                    .iter()
                    .map(Row::to_value)
                    .collect(),
            )),
            _ => None,
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> ExprResult<Value> {
        BuiltinFunctions::execute(name, args, self.all_rows, self.now)
    }
}
