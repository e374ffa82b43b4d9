//! Rule-based access control
//!
//! This module decides whether a subject may act on a resource:
//! - Attribute matching on subject and resource maps
//! - Allow/deny effects ordered by priority, first match wins
//! - Optional condition expressions with time helpers
//! - Default deny when nothing matches

mod condition;
mod engine;
mod rule;
#[cfg(test)]
mod tests;
mod types;

pub use engine::{PermissionEngine, PermissionEvaluation, PermissionRulesConfig};
pub use rule::PermissionRule;
pub use types::{Action, Effect};
