//! Evaluation scope for rule conditions
//!
//! Conditions see `subject`, `resource` (an empty object when the check has
//! no resource) and three time helpers computed from the evaluation instant:
//! `now()`, `dayOfWeek()` (0 = Sunday) and `hourOfDay()` (0..23, UTC).

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::expr::{ExprError, ExprResult, Scope};
use crate::value::{Attributes, Value};

pub(super) struct ConditionScope<'a> {
    pub subject: &'a Attributes,
    pub resource: Option<&'a Attributes>,
    pub now: DateTime<Utc>,
}

impl Scope for ConditionScope<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        match name {
            "subject" => Some(Value::Object(self.subject.clone())),
            "resource" => Some(Value::Object(self.resource.cloned().unwrap_or_default())),
            _ => None,
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> ExprResult<Value> {
        let value = match name {
            "now" => Value::DateTime(self.now),
            "dayOfWeek" => Value::Number(self.now.weekday().num_days_from_sunday() as f64),
            "hourOfDay" => Value::Number(self.now.hour() as f64),
            _ => return Err(ExprError::UnknownFunction(name.to_string())),
        };
        ExprError::check_arity(name, 0, args.len())?;
        Ok(value)
    }
}
