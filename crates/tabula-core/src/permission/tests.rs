//! Tests for the permission engine

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::permission::*;
    use crate::value::{Attributes, Value};

    fn attrs(value: serde_json::Value) -> Attributes {
        Value::from(value).into_object().unwrap_or_default()
    }

    #[test]
    fn test_action_parse_and_display() {
        assert_eq!("read".parse::<Action>().unwrap(), Action::Read);
        assert_eq!("WRITE".parse::<Action>().unwrap(), Action::Write);
        assert!("launch".parse::<Action>().is_err());
        assert_eq!(format!("{}", Action::Delete), "delete");
        assert_eq!(format!("{}", Effect::Allow), "allow");
    }

    #[test]
    fn test_empty_engine_denies() {
        let engine = PermissionEngine::new(vec![]);
        assert!(engine.is_empty());
        assert!(!engine.evaluate(Action::Read, &attrs(json!({"role": "admin"})), None));
    }

    #[test]
    fn test_no_matching_rule_denies() {
        let engine =
            PermissionEngine::new(vec![PermissionRule::allow().with_subject("role", "admin")]);
        let evaluation = engine.explain(Action::Read, &attrs(json!({"role": "viewer"})), None);

        assert!(!evaluation.is_allowed());
        assert_eq!(evaluation.effect, None);
        assert_eq!(evaluation.reason, "no matching rule (default deny)");
    }

    #[test]
    fn test_admin_allowed() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow()
                .with_subject("role", "admin")
                .with_priority(1),
        ]);
        assert!(engine.evaluate(Action::Write, &attrs(json!({"role": "admin"})), None));
    }

    #[test]
    fn test_viewer_deny_precedes_catch_all_allow() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::deny()
                .with_subject("role", "viewer")
                .with_priority(1),
            PermissionRule::allow().with_priority(2),
        ]);

        assert!(!engine.evaluate(Action::Read, &attrs(json!({"role": "viewer"})), None));
        assert!(engine.evaluate(Action::Read, &attrs(json!({"role": "editor"})), None));
    }

    #[test]
    fn test_priority_order_ignores_input_order() {
        let allow = PermissionRule::allow().with_priority(5);
        let deny = PermissionRule::deny().with_priority(1);

        let forward = PermissionEngine::new(vec![allow.clone(), deny.clone()]);
        let backward = PermissionEngine::new(vec![deny, allow]);
        let subject = Attributes::new();

        assert!(!forward.evaluate(Action::Read, &subject, None));
        assert!(!backward.evaluate(Action::Read, &subject, None));

        let priorities: Vec<i64> = forward.rules().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 5]);
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow().with_description("first"),
            PermissionRule::deny().with_description("second"),
        ]);
        let evaluation = engine.explain(Action::Read, &Attributes::new(), None);

        assert!(evaluation.allowed);
        assert_eq!(evaluation.position, Some(0));
        assert_eq!(evaluation.reason, "matched rule #0: first");
    }

    #[test]
    fn test_failing_condition_does_not_block_later_rules() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow()
                .with_subject("role", "editor")
                .with_condition("subject.verified")
                .with_priority(1),
            PermissionRule::deny()
                .with_subject("role", "editor")
                .with_priority(2),
        ]);

        let unverified = attrs(json!({"role": "editor", "verified": false}));
        let verified = attrs(json!({"role": "editor", "verified": true}));

        assert!(!engine.evaluate(Action::Write, &unverified, None));
        assert!(engine.evaluate(Action::Write, &verified, None));
    }

    #[test]
    fn test_deny_condition_can_fall_through_to_allow() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::deny()
                .with_condition("resource.locked == true")
                .with_priority(1),
            PermissionRule::allow().with_priority(2),
        ]);
        let subject = attrs(json!({"role": "editor"}));

        assert!(engine.evaluate(Action::Write, &subject, Some(&attrs(json!({"locked": false})))));
        assert!(!engine.evaluate(Action::Write, &subject, Some(&attrs(json!({"locked": true})))));
    }

    #[test]
    fn test_broken_condition_is_skipped() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow()
                .with_condition("subject.role ==")
                .with_priority(1),
            PermissionRule::allow()
                .with_condition("subject.profile.team == 'ops'")
                .with_priority(2),
            PermissionRule::deny().with_priority(3),
        ]);

        // first rule does not compile, second fails at runtime (profile is null)
        let evaluation = engine.explain(Action::Read, &attrs(json!({"role": "ops"})), None);
        assert!(!evaluation.allowed);
        assert_eq!(evaluation.position, Some(2));
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_overlong_condition_is_skipped() {
        let chain = vec!["subject.role == 'admin'"; 20_000].join(" || ");
        let engine = PermissionEngine::new(vec![PermissionRule::allow().with_condition(chain)]);
        let evaluation = engine.explain(Action::Read, &attrs(json!({"role": "admin"})), None);

        assert!(!evaluation.is_allowed());
        assert_eq!(evaluation.effect, None);
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_conditions() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow().with_condition("hourOfDay() >= 9 && hourOfDay() < 17"),
            PermissionRule::deny(),
        ]);
        assert!(engine.validate().is_ok());
    }

    #[test]
    fn test_business_hours_condition() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow()
                .with_subject("role", "contractor")
                .with_condition(
                    "dayOfWeek() >= 1 && dayOfWeek() <= 5 && hourOfDay() >= 9 && hourOfDay() < 17",
                ),
        ]);
        let subject = attrs(json!({"role": "contractor"}));

        // Wednesday 10:00 UTC
        let weekday = Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap();
        // Saturday 10:00 UTC
        let weekend = Utc.with_ymd_and_hms(2024, 6, 8, 10, 0, 0).unwrap();
        // Wednesday 20:00 UTC
        let evening = Utc.with_ymd_and_hms(2024, 6, 5, 20, 0, 0).unwrap();

        assert!(engine.evaluate_at(Action::Write, &subject, None, weekday));
        assert!(!engine.evaluate_at(Action::Write, &subject, None, weekend));
        assert!(!engine.evaluate_at(Action::Write, &subject, None, evening));
    }

    #[test]
    fn test_owner_condition_against_resource() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::allow()
                .with_condition("resource.ownerId === subject.id")
                .with_priority(1),
        ]);
        let subject = attrs(json!({"id": "u-1"}));

        let own = attrs(json!({"ownerId": "u-1"}));
        let other = attrs(json!({"ownerId": "u-2"}));
        assert!(engine.evaluate(Action::Delete, &subject, Some(&own)));
        assert!(!engine.evaluate(Action::Delete, &subject, Some(&other)));
        assert!(!engine.evaluate(Action::Delete, &subject, None));
    }

    #[test]
    fn test_action_does_not_filter_rules() {
        let engine =
            PermissionEngine::new(vec![PermissionRule::allow().with_subject("role", "viewer")]);
        let subject = attrs(json!({"role": "viewer"}));

        assert!(engine.evaluate(Action::Read, &subject, None));
        assert!(engine.evaluate(Action::Write, &subject, None));
        assert!(engine.evaluate(Action::Delete, &subject, None));
    }

    #[test]
    fn test_resource_rules() {
        let engine = PermissionEngine::new(vec![
            PermissionRule::deny()
                .with_resource("table", "payroll")
                .with_priority(1),
            PermissionRule::allow().with_subject("role", "staff").with_priority(2),
        ]);
        let subject = attrs(json!({"role": "staff"}));

        let payroll = attrs(json!({"table": "payroll"}));
        let orders = attrs(json!({"table": "orders"}));
        assert!(!engine.evaluate(Action::Read, &subject, Some(&payroll)));
        assert!(engine.evaluate(Action::Read, &subject, Some(&orders)));
    }

    #[test]
    fn test_from_config() {
        let config: PermissionRulesConfig = serde_json::from_value(json!({
            "rules": [
                {"subject": {}, "effect": "allow", "priority": 10},
                {"subject": {"role": "guest"}, "effect": "deny", "priority": 1,
                 "description": "guests are read-only"}
            ]
        }))
        .unwrap();
        let engine = PermissionEngine::from_config(&config);

        assert_eq!(engine.len(), 2);
        let evaluation = engine.explain(Action::Write, &attrs(json!({"role": "guest"})), None);
        assert!(!evaluation.allowed);
        assert_eq!(evaluation.effect, Some(Effect::Deny));
        assert_eq!(evaluation.reason, "matched rule #0: guests are read-only");
    }

    #[test]
    fn test_evaluation_serializes() {
        let engine = PermissionEngine::new(vec![PermissionRule::allow()]);
        let evaluation = engine.explain(Action::Read, &Attributes::new(), None);
        let json = serde_json::to_value(&evaluation).unwrap();

        assert_eq!(json["allowed"], json!(true));
        assert_eq!(json["effect"], json!("allow"));
        assert_eq!(json["position"], json!(0));
    }
}
