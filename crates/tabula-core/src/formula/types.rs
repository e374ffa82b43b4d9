//! Formula definitions and column types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    Text,
    LongText,
    Number,
    Currency,
    Percent,
    Boolean,
    Date,
    DateTime,
    SingleSelect,
    MultiSelect,
    Email,
    Url,
    Formula,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::LongText => "longText",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Percent => "percent",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultiSelect => "multiSelect",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Formula => "formula",
        };
        write!(f, "{}", name)
    }
}

/// A computed column definition
///
/// `return_type` is carried for display; results are not coerced to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    /// Expression source, optionally with a leading `=`
    pub expression: String,
    /// Columns this formula reads
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub return_type: FieldType,
}

impl Formula {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            dependencies: Vec::new(),
            return_type: FieldType::default(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_return_type(mut self, return_type: FieldType) -> Self {
        self.return_type = return_type;
        self
    }
}

/// A set of formulas keyed by column id, as loaded from a definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaDefinitions {
    #[serde(default)]
    pub formulas: BTreeMap<String, Formula>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_deserialize() {
        let formula: Formula = serde_json::from_str(
            r#"{
                "expression": "=price * qty",
                "dependencies": ["price", "qty"],
                "returnType": "currency"
            }"#,
        )
        .unwrap();
        assert_eq!(formula.expression, "=price * qty");
        assert_eq!(formula.dependencies, vec!["price", "qty"]);
        assert_eq!(formula.return_type, FieldType::Currency);
    }

    #[test]
    fn test_formula_defaults() {
        let formula: Formula = serde_json::from_str(r#"{"expression": "1"}"#).unwrap();
        assert!(formula.dependencies.is_empty());
        assert_eq!(formula.return_type, FieldType::Text);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::DateTime.to_string(), "dateTime");
        assert_eq!(
            serde_json::to_string(&FieldType::MultiSelect).unwrap(),
            "\"multiSelect\""
        );
    }
}
