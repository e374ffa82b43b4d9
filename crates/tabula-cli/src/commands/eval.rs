//! Formula evaluation command

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tabula_core::config::{EngineConfig, load_definitions};
use tabula_core::{FormulaDefinitions, FormulaEngine, Row};

/// Computed columns for one row
#[derive(Debug, Serialize)]
pub struct RowValues {
    pub id: String,
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Evaluate formulas over a rows file and print the results as JSON
pub fn run(
    config: &EngineConfig,
    formulas: &Path,
    rows: &Path,
    column: Option<&str>,
) -> Result<()> {
    let definitions: FormulaDefinitions = load_definitions(formulas)
        .with_context(|| format!("loading formulas from {}", formulas.display()))?;
    let rows: Vec<Row> = load_definitions(rows)
        .with_context(|| format!("loading rows from {}", rows.display()))?;

    let mut engine = FormulaEngine::from_config(&config.formula_cache);
    engine.register_definitions(definitions)?;

    let results = evaluate_rows(&engine, &rows, column)?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    let stats = engine.cache_stats();
    tracing::debug!(
        rows = rows.len(),
        hits = stats.hits,
        misses = stats.misses,
        "Formula evaluation finished"
    );
    Ok(())
}

/// Evaluate one column, or every formula column, for each row
pub fn evaluate_rows(
    engine: &FormulaEngine,
    rows: &[Row],
    column: Option<&str>,
) -> Result<Vec<RowValues>> {
    if let Some(column) = column {
        if engine.formula(column).is_none() {
            bail!("no formula registered for column '{}'", column);
        }
    }

    Ok(rows
        .iter()
        .map(|row| {
            let values = match column {
                Some(column) => {
                    let value = engine.evaluate_column(column, row, Some(rows));
                    BTreeMap::from([(column.to_string(), value)])
                }
                None => engine.evaluate_row(row, Some(rows)),
            };
            RowValues {
                id: row.id.clone(),
                values: values.into_iter().map(|(k, v)| (k, v.to_json())).collect(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tabula_core::Formula;
    use tempfile::TempDir;

    fn engine() -> FormulaEngine {
        let mut engine = FormulaEngine::new();
        engine.register_formula(
            "total",
            Formula::new("=price * qty").with_dependencies(["price", "qty"]),
        );
        engine.register_formula(
            "share",
            Formula::new("total / SUM('revenue')").with_dependencies(["total"]),
        );
        engine
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("a").with_data("price", 2).with_data("qty", 5).with_data("revenue", 10),
            Row::new("b").with_data("price", 3).with_data("qty", 10).with_data("revenue", 30),
        ]
    }

    #[test]
    fn test_evaluate_all_columns() {
        let results = evaluate_rows(&engine(), &rows(), None).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].values["total"], json!(10.0));
        assert_eq!(results[0].values["share"], json!(0.25));
        assert_eq!(results[1].values["total"], json!(30.0));
    }

    #[test]
    fn test_evaluate_single_column() {
        let results = evaluate_rows(&engine(), &rows(), Some("total")).unwrap();
        assert_eq!(results[1].values.len(), 1);

        assert!(evaluate_rows(&engine(), &rows(), Some("missing")).is_err());
    }

    #[test]
    fn test_evaluate_single_dependent_column() {
        let results = evaluate_rows(&engine(), &rows(), Some("share")).unwrap();

        assert_eq!(results[0].values.len(), 1);
        assert_eq!(results[0].values["share"], json!(0.25));
        assert_eq!(results[1].values["share"], json!(0.75));
    }

    #[test]
    fn test_run_with_files() {
        let dir = TempDir::new().unwrap();
        let formulas = dir.path().join("formulas.yaml");
        fs::write(&formulas, "formulas:\n  total:\n    expression: \"=price * qty\"\n").unwrap();
        let rows = dir.path().join("rows.json");
        fs::write(&rows, r#"[{"id": "r1", "data": {"price": 4, "qty": 2}}]"#).unwrap();

        assert!(run(&EngineConfig::default(), &formulas, &rows, None).is_ok());
    }

    #[test]
    fn test_run_rejects_bad_formula() {
        let dir = TempDir::new().unwrap();
        let formulas = dir.path().join("formulas.json");
        fs::write(&formulas, r#"{"formulas": {"total": {"expression": "price *"}}}"#).unwrap();
        let rows = dir.path().join("rows.json");
        fs::write(&rows, "[]").unwrap();

        assert!(run(&EngineConfig::default(), &formulas, &rows, None).is_err());
    }
}
