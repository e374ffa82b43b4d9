//! Permission engine for evaluating rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::ConditionScope;
use super::rule::PermissionRule;
use super::types::{Action, Effect};
use crate::error::{TabulaError, TabulaResult};
use crate::expr::{self, Expr, ExprError};
use crate::value::Attributes;

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: PermissionRule,
    /// Parsed condition, or the error that prevented parsing it
    condition: Option<Result<Expr, ExprError>>,
}

impl CompiledRule {
    fn compile(rule: PermissionRule) -> Self {
        let condition = rule.condition.as_deref().map(expr::parse);
        Self { rule, condition }
    }
}

/// Permission engine for evaluating rules
///
/// Rules are ordered by ascending priority at construction (stable, so
/// equal priorities keep their input order) and never change afterwards.
/// The first rule whose attributes match and whose condition holds decides;
/// when none does the check is denied.
#[derive(Debug, Clone, Default)]
pub struct PermissionEngine {
    rules: Vec<CompiledRule>,
}

impl PermissionEngine {
    /// Create an engine from an unordered set of rules
    pub fn new(rules: impl IntoIterator<Item = PermissionRule>) -> Self {
        let mut rules: Vec<PermissionRule> = rules.into_iter().collect();
        rules.sort_by_key(|r| r.priority);

        Self {
            rules: rules.into_iter().map(CompiledRule::compile).collect(),
        }
    }

    /// Load rules from configuration
    pub fn from_config(config: &PermissionRulesConfig) -> Self {
        Self::new(config.rules.iter().cloned())
    }

    /// Report the first condition that does not compile
    ///
    /// Such rules are still loaded and simply never apply; this lets
    /// callers reject them up front instead.
    pub fn validate(&self) -> TabulaResult<()> {
        for (position, compiled) in self.rules.iter().enumerate() {
            if let Some(Err(err)) = &compiled.condition {
                return Err(TabulaError::expression(
                    format!("condition of rule #{} ({})", position, compiled.rule),
                    err.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate whether `subject` may perform `action`
    ///
    /// The action is recorded but does not take part in matching: rules
    /// apply to every action.
    pub fn evaluate(
        &self,
        action: Action,
        subject: &Attributes,
        resource: Option<&Attributes>,
    ) -> bool {
        self.evaluate_at(action, subject, resource, Utc::now())
    }

    /// Evaluate with an explicit instant for the condition time helpers
    pub fn evaluate_at(
        &self,
        action: Action,
        subject: &Attributes,
        resource: Option<&Attributes>,
        now: DateTime<Utc>,
    ) -> bool {
        self.explain_at(action, subject, resource, now).allowed
    }

    /// Evaluate and report which rule decided
    pub fn explain(
        &self,
        action: Action,
        subject: &Attributes,
        resource: Option<&Attributes>,
    ) -> PermissionEvaluation {
        self.explain_at(action, subject, resource, Utc::now())
    }

    /// [`explain`](Self::explain) with an explicit instant
    pub fn explain_at(
        &self,
        action: Action,
        subject: &Attributes,
        resource: Option<&Attributes>,
        now: DateTime<Utc>,
    ) -> PermissionEvaluation {
        let scope = ConditionScope {
            subject,
            resource,
            now,
        };

        for (position, compiled) in self.rules.iter().enumerate() {
            if !compiled.rule.matches(subject, resource) {
                continue;
            }

            if let Some(condition) = &compiled.condition {
                let outcome = condition
                    .as_ref()
                    .map_err(|err| err.clone())
                    .and_then(|program| expr::evaluate(program, &scope));
                match outcome {
                    Ok(value) if value.is_truthy() => {}
                    Ok(_) => {
                        tracing::debug!(
                            action = %action,
                            rule = position,
                            "Permission rule matched but condition was not met"
                        );
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(
                            action = %action,
                            rule = position,
                            error = %err,
                            "Permission condition failed, skipping rule"
                        );
                        continue;
                    }
                }
            }

            tracing::debug!(
                action = %action,
                rule = position,
                effect = %compiled.rule.effect,
                "Permission rule decided"
            );
            return PermissionEvaluation {
                allowed: compiled.rule.effect.is_allow(),
                effect: Some(compiled.rule.effect),
                position: Some(position),
                matched_rule: Some(compiled.rule.clone()),
                reason: match &compiled.rule.description {
                    Some(description) => format!("matched rule #{}: {}", position, description),
                    None => format!("matched rule #{}", position),
                },
            };
        }

        tracing::debug!(action = %action, "No permission rule matched, denying");
        PermissionEvaluation {
            allowed: false,
            effect: None,
            position: None,
            matched_rule: None,
            reason: "no matching rule (default deny)".to_string(),
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &PermissionRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Get the number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the engine has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Result of permission evaluation
#[derive(Debug, Clone, Serialize)]
pub struct PermissionEvaluation {
    /// Whether access is granted
    pub allowed: bool,
    /// Effect of the deciding rule, `None` under default deny
    pub effect: Option<Effect>,
    /// Index of the deciding rule in evaluation order
    pub position: Option<usize>,
    /// The deciding rule
    pub matched_rule: Option<PermissionRule>,
    /// Reason for this evaluation
    pub reason: String,
}

impl PermissionEvaluation {
    /// Check if the evaluation allows the operation
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

/// Configuration for permission rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionRulesConfig {
    /// List of permission rules
    #[serde(default)]
    pub rules: Vec<PermissionRule>,
}
