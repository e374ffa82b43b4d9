//! Tree-walking evaluator

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::{ExprError, ExprResult};
use crate::value::{Attributes, Value};

/// Identifier and function environment for evaluation
///
/// Everything an expression can observe goes through a scope; there is no
/// other path to host state.
pub trait Scope {
    /// Resolve a bare identifier, `None` if it is not defined
    fn resolve(&self, name: &str) -> Option<Value>;

    /// Invoke a function with already evaluated arguments
    fn call(&self, name: &str, _args: &[Value]) -> ExprResult<Value> {
        Err(ExprError::UnknownFunction(name.to_string()))
    }
}

/// A scope backed by a plain map of variables, with no functions
#[derive(Debug, Clone, Default)]
pub struct MapScope {
    values: Attributes,
}

impl MapScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl From<Attributes> for MapScope {
    fn from(values: Attributes) -> Self {
        Self { values }
    }
}

impl Scope for MapScope {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// Evaluate an expression against a scope
pub fn evaluate(expr: &Expr, scope: &dyn Scope) -> ExprResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate(item, scope))
            .collect::<ExprResult<Vec<_>>>()
            .map(Value::Array),
        Expr::Identifier(name) => scope
            .resolve(name)
            .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
        Expr::Member { object, property } => {
            let object = evaluate(object, scope)?;
            member(&object, property)
        }
        Expr::Index { object, index } => {
            let object = evaluate(object, scope)?;
            let index = evaluate(index, scope)?;
            index_into(&object, &index)
        }
        Expr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope))
                .collect::<ExprResult<Vec<_>>>()?;
            scope.call(function, &args)
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, scope)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
                UnaryOp::Neg => Value::Number(-value.to_number()),
                UnaryOp::Plus => Value::Number(value.to_number()),
            })
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let left = evaluate(left, scope)?;
            if left.is_truthy() {
                evaluate(right, scope)
            } else {
                Ok(left)
            }
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let left = evaluate(left, scope)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                evaluate(right, scope)
            }
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, scope)?;
            let right = evaluate(right, scope)?;
            Ok(apply_binary(*op, &left, &right))
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if evaluate(condition, scope)?.is_truthy() {
                evaluate(then_branch, scope)
            } else {
                evaluate(else_branch, scope)
            }
        }
    }
}

fn member(object: &Value, property: &str) -> ExprResult<Value> {
    match object {
        Value::Null => Err(ExprError::Type(format!(
            "cannot read property `{}` of null",
            property
        ))),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        Value::String(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        _ => Ok(Value::Null),
    }
}

fn index_into(object: &Value, index: &Value) -> ExprResult<Value> {
    match object {
        Value::Null => Err(ExprError::Type(format!(
            "cannot read index `{}` of null",
            index
        ))),
        Value::Array(items) => {
            let position = index.to_number();
            if position.is_finite() && position >= 0.0 && position.fract() == 0.0 {
                Ok(items.get(position as usize).cloned().unwrap_or(Value::Null))
            } else {
                Ok(Value::Null)
            }
        }
        Value::Object(_) | Value::String(_) => member(object, &index.to_display_string()),
        _ => Ok(Value::Null),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Bool(left == right),
        BinaryOp::StrictNotEq => Value::Bool(left != right),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        // short-circuit operators are handled in `evaluate`
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| {
        matches!(
            v,
            Value::String(_) | Value::DateTime(_) | Value::Array(_) | Value::Object(_)
        )
    };
    if concatenates(left) || concatenates(right) {
        Value::String(format!(
            "{}{}",
            left.to_display_string(),
            right.to_display_string()
        ))
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

/// Equality that also matches numerically equal scalars of different types
///
/// `1 == "1"` and `true == 1` hold, `null` only equals `null`, and
/// date-times compare against anything that parses to the same instant.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Value::DateTime(a), other) | (other, Value::DateTime(a)) => {
            other.to_datetime().is_some_and(|b| *a == b)
        }
        (
            Value::Number(_) | Value::String(_) | Value::Bool(_),
            Value::Number(_) | Value::String(_) | Value::Bool(_),
        ) => {
            let (a, b) = (left.to_number(), right.to_number());
            !a.is_nan() && a == b
        }
        _ => false,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(_), _) | (_, Value::DateTime(_)) => {
            Some(left.to_datetime()?.cmp(&right.to_datetime()?))
        }
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
