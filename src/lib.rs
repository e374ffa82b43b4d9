//! Tabula
//!
//! Permission rules and formula columns for table and form backends. This
//! crate re-exports [`tabula_core`]; the `tabula` binary lives in
//! `tabula-cli`.
//!
//! ```
//! use tabula::{Action, Formula, FormulaEngine, PermissionEngine, PermissionRule, Row, Value};
//!
//! let permissions = PermissionEngine::new(vec![
//!     PermissionRule::allow().with_subject("role", "admin").with_priority(1),
//! ]);
//! let admin = [("role".to_string(), Value::from("admin"))].into_iter().collect();
//! assert!(permissions.evaluate(Action::Write, &admin, None));
//!
//! let mut formulas = FormulaEngine::new();
//! formulas.register_formula("total", Formula::new("=price * qty"));
//! let row = Row::new("r1").with_data("price", 4).with_data("qty", 3);
//! assert_eq!(formulas.evaluate("total", &row, None), Value::Number(12.0));
//! ```

pub use tabula_core::*;
