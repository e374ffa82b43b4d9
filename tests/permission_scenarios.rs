//! End-to-end permission checks through the public API

use chrono::{TimeZone, Utc};
use serde_json::json;
use tabula::config::load_definitions;
use tabula::{Action, Attributes, PermissionEngine, PermissionRule, PermissionRulesConfig, Value};

fn attrs(value: serde_json::Value) -> Attributes {
    Value::from(value).into_object().unwrap_or_default()
}

fn workspace_rules() -> PermissionEngine {
    PermissionEngine::new(vec![
        PermissionRule::allow()
            .with_condition("resource.ownerId === subject.id")
            .with_priority(3)
            .with_description("owners manage their records"),
        PermissionRule::allow()
            .with_subject("role", "admin")
            .with_priority(1),
        PermissionRule::deny()
            .with_subject("role", "viewer")
            .with_priority(2),
        PermissionRule::allow()
            .with_subject("role", "viewer")
            .with_priority(4),
    ])
}

#[test]
fn admin_is_allowed() {
    let engine = workspace_rules();
    assert!(engine.evaluate(Action::Delete, &attrs(json!({"role": "admin"})), None));
}

#[test]
fn viewer_deny_wins_over_later_allow() {
    let engine = workspace_rules();
    let viewer = attrs(json!({"id": "v1", "role": "viewer"}));

    let evaluation = engine.explain(Action::Read, &viewer, None);
    assert!(!evaluation.allowed);
    assert_eq!(evaluation.position, Some(1));
}

#[test]
fn owner_condition_grants_access() {
    let engine = workspace_rules();
    let editor = attrs(json!({"id": "u7", "role": "editor"}));

    assert!(engine.evaluate(Action::Write, &editor, Some(&attrs(json!({"ownerId": "u7"})))));
    assert!(!engine.evaluate(Action::Write, &editor, Some(&attrs(json!({"ownerId": "u8"})))));
}

#[test]
fn unknown_subject_is_denied_by_default() {
    let engine = workspace_rules();
    let guest = attrs(json!({"id": "g1", "role": "guest"}));
    let evaluation = engine.explain(Action::Read, &guest, None);

    assert!(!evaluation.allowed);
    assert!(evaluation.matched_rule.is_none());
}

#[test]
fn rules_from_yaml_with_time_window() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("rules.yaml");
    std::fs::write(
        &path,
        r#"
rules:
  - subject: { role: contractor }
    effect: allow
    priority: 1
    condition: "hourOfDay() >= 9 && hourOfDay() < 17"
  - subject: { role: contractor }
    effect: deny
    priority: 2
    description: contractors outside office hours
"#,
    )
    .unwrap();

    let config: PermissionRulesConfig = load_definitions(&path).unwrap();
    let engine = PermissionEngine::from_config(&config);
    assert!(engine.validate().is_ok());

    let contractor = attrs(json!({"role": "contractor"}));
    let morning = Utc.with_ymd_and_hms(2024, 2, 14, 10, 15, 0).unwrap();
    let night = Utc.with_ymd_and_hms(2024, 2, 14, 23, 0, 0).unwrap();

    assert!(engine.evaluate_at(Action::Write, &contractor, None, morning));
    let evaluation = engine.explain_at(Action::Write, &contractor, None, night);
    assert!(!evaluation.allowed);
    assert_eq!(evaluation.reason, "matched rule #1: contractors outside office hours");
}
