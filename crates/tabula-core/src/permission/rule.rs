//! Permission rule definition

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::Effect;
use crate::value::{Attributes, Value};

/// An attribute-matching access rule
///
/// A rule matches when every attribute in `subject` appears in the checked
/// subject with an identical value, and, when both the rule and the check
/// carry a resource, every attribute in `resource` matches the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Required subject attributes (empty matches any subject)
    #[serde(default)]
    pub subject: Attributes,
    /// Required resource attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Attributes>,
    /// Optional condition expression narrowing when the rule applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// The permission effect
    pub effect: Effect,
    /// Evaluation order, lower first
    #[serde(default)]
    pub priority: i64,
    /// Optional human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PermissionRule {
    /// Create a new rule matching any subject
    pub fn new(effect: Effect) -> Self {
        Self {
            subject: Attributes::new(),
            resource: None,
            condition: None,
            effect,
            priority: 0,
            description: None,
        }
    }

    pub fn allow() -> Self {
        Self::new(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::new(Effect::Deny)
    }

    /// Require a subject attribute
    pub fn with_subject(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.subject.insert(key.into(), value.into());
        self
    }

    /// Require a resource attribute
    pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resource
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the condition expression
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the attribute constraints of this rule (conditions excluded)
    pub fn matches(&self, subject: &Attributes, resource: Option<&Attributes>) -> bool {
        if !attributes_match(&self.subject, subject) {
            return false;
        }

        // Resource constraints only apply when the check names a resource
        match (&self.resource, resource) {
            (Some(required), Some(actual)) => attributes_match(required, actual),
            _ => true,
        }
    }
}

fn attributes_match(required: &Attributes, actual: &Attributes) -> bool {
    required
        .iter()
        .all(|(key, expected)| actual.get(key) == Some(expected))
}

impl fmt::Display for PermissionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (priority: {})", self.effect, self.priority)?;
        if let Some(ref description) = self.description {
            write!(f, " \"{}\"", description)?;
        }
        for (key, value) in &self.subject {
            write!(f, " subject.{}={}", key, value)?;
        }
        if let Some(ref resource) = self.resource {
            for (key, value) in resource {
                write!(f, " resource.{}={}", key, value)?;
            }
        }
        if let Some(ref condition) = self.condition {
            write!(f, " if {}", condition)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_subject_matches_anything() {
        let rule = PermissionRule::allow();
        assert!(rule.matches(&Attributes::new(), None));
        assert!(rule.matches(&attrs(&[("role", "viewer".into())]), None));
    }

    #[test]
    fn test_subject_requires_exact_values() {
        let rule = PermissionRule::allow().with_subject("role", "admin");
        assert!(rule.matches(&attrs(&[("role", "admin".into()), ("id", 7.into())]), None));
        assert!(!rule.matches(&attrs(&[("role", "administrator".into())]), None));
        assert!(!rule.matches(&attrs(&[("id", 7.into())]), None));
    }

    #[test]
    fn test_subject_match_is_type_strict() {
        let rule = PermissionRule::allow().with_subject("level", 1);
        assert!(rule.matches(&attrs(&[("level", 1.into())]), None));
        assert!(!rule.matches(&attrs(&[("level", "1".into())]), None));
    }

    #[test]
    fn test_resource_constraints() {
        let rule = PermissionRule::deny().with_resource("table", "payroll");
        let subject = Attributes::new();

        assert!(rule.matches(&subject, Some(&attrs(&[("table", "payroll".into())]))));
        assert!(!rule.matches(&subject, Some(&attrs(&[("table", "orders".into())]))));
        // no resource given: resource constraints are not checked
        assert!(rule.matches(&subject, None));
    }

    #[test]
    fn test_rule_display() {
        let rule = PermissionRule::allow()
            .with_subject("role", "admin")
            .with_priority(2)
            .with_condition("hourOfDay() < 18");
        assert_eq!(
            rule.to_string(),
            "allow (priority: 2) subject.role=admin if hourOfDay() < 18"
        );
    }

    #[test]
    fn test_rule_deserialize_defaults() {
        let rule: PermissionRule =
            serde_json::from_str(r#"{"subject": {"role": "viewer"}, "effect": "deny"}"#).unwrap();
        assert_eq!(rule.effect, Effect::Deny);
        assert_eq!(rule.priority, 0);
        assert!(rule.resource.is_none());
        assert_eq!(rule.subject.get("role"), Some(&Value::from("viewer")));
    }
}
