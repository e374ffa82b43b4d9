//! Permission check command

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tabula_core::config::load_definitions;
use tabula_core::{
    Action, Attributes, PermissionEngine, PermissionEvaluation, PermissionRulesConfig, Value,
};

/// Run a permission check; exit code 0 on allow, 1 on deny
pub fn run(
    rules: &Path,
    action: Action,
    subject: &str,
    resource: Option<&str>,
    explain: bool,
) -> Result<ExitCode> {
    let evaluation = check(rules, action, subject, resource)?;

    if explain {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("{}", if evaluation.allowed { "allow" } else { "deny" });
    }

    Ok(if evaluation.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Load rules and evaluate one check
pub fn check(
    rules: &Path,
    action: Action,
    subject: &str,
    resource: Option<&str>,
) -> Result<PermissionEvaluation> {
    let config: PermissionRulesConfig = load_definitions(rules)
        .with_context(|| format!("loading rules from {}", rules.display()))?;
    let engine = PermissionEngine::from_config(&config);
    if let Err(e) = engine.validate() {
        tracing::warn!(error = %e, "Rule with invalid condition will never apply");
    }

    let subject = parse_attributes("--subject", subject)?;
    let resource = resource
        .map(|raw| parse_attributes("--resource", raw))
        .transpose()?;

    tracing::debug!(rules = engine.len(), action = %action, "Evaluating permission check");
    Ok(engine.explain(action, &subject, resource.as_ref()))
}

fn parse_attributes(flag: &str, raw: &str) -> Result<Attributes> {
    let json: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON", flag))?;
    match Value::from(json).into_object() {
        Some(attributes) => Ok(attributes),
        None => bail!("{} must be a JSON object", flag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RULES: &str = r#"{
        "rules": [
            {"subject": {"role": "viewer"}, "effect": "deny", "priority": 1},
            {"effect": "allow", "priority": 2, "description": "everyone else"}
        ]
    }"#;

    fn rules_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("rules.json");
        fs::write(&path, RULES).unwrap();
        path
    }

    #[test]
    fn test_check_decisions() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir);

        let viewer = check(&rules, Action::Read, r#"{"role": "viewer"}"#, None).unwrap();
        assert!(!viewer.allowed);

        let editor = check(&rules, Action::Read, r#"{"role": "editor"}"#, Some("{}")).unwrap();
        assert!(editor.allowed);
        assert_eq!(editor.reason, "matched rule #1: everyone else");
    }

    #[test]
    fn test_run_prints_both_forms() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir);

        assert!(run(&rules, Action::Write, r#"{"role": "editor"}"#, None, false).is_ok());
        assert!(run(&rules, Action::Write, r#"{"role": "viewer"}"#, None, true).is_ok());
    }

    #[test]
    fn test_rejects_non_object_subject() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir);

        assert!(check(&rules, Action::Read, "[1, 2]", None).is_err());
        assert!(check(&rules, Action::Read, "{role", None).is_err());
    }

    #[test]
    fn test_missing_rules_file() {
        let err =
            check(Path::new("/nonexistent/rules.json"), Action::Read, "{}", None).unwrap_err();
        assert!(err.to_string().contains("loading rules"));
    }
}
