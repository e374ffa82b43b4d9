//! Table rows as seen by formulas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::{Attributes, Value};

fn initial_version() -> u64 {
    1
}

/// A table row
///
/// `version` must change whenever `data` changes: formula results are
/// cached per `(column, row id, version)` and nothing else invalidates them.
/// [`Row::set`] keeps the two in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default = "initial_version")]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Attributes>,
}

impl Row {
    /// Create an empty row at version 1
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            created_by: String::new(),
            updated_by: String::new(),
            version: initial_version(),
            locked: None,
            locked_by: None,
            locked_at: None,
            data: Attributes::new(),
            metadata: None,
        }
    }

    /// Set the author of the row
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        self.created_by = author.clone();
        self.updated_by = author;
        self
    }

    /// Set a data cell without touching the version (construction only)
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Set the version
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Get a data cell
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Write a data cell as a mutation: bumps `version` and `updated_at`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>, by: impl Into<String>) {
        self.data.insert(key.into(), value.into());
        self.touch(by);
    }

    /// Lock the row for editing by `by`
    pub fn lock(&mut self, by: impl Into<String>) {
        let by = by.into();
        self.locked = Some(true);
        self.locked_by = Some(by.clone());
        self.locked_at = Some(Utc::now());
        self.touch(by);
    }

    /// Release a lock
    pub fn unlock(&mut self, by: impl Into<String>) {
        self.locked = Some(false);
        self.locked_by = None;
        self.locked_at = None;
        self.touch(by);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    fn touch(&mut self, by: impl Into<String>) {
        self.version += 1;
        self.updated_at = Utc::now();
        self.updated_by = by.into();
    }

    /// The row as an object value, keyed the way it serializes
    pub fn to_value(&self) -> Value {
        let mut object = Attributes::new();
        object.insert("id".to_string(), Value::from(self.id.as_str()));
        object.insert("createdAt".to_string(), Value::DateTime(self.created_at));
        object.insert("updatedAt".to_string(), Value::DateTime(self.updated_at));
        object.insert("createdBy".to_string(), Value::from(self.created_by.as_str()));
        object.insert("updatedBy".to_string(), Value::from(self.updated_by.as_str()));
        object.insert("version".to_string(), Value::Number(self.version as f64));
        object.insert("locked".to_string(), Value::Bool(self.is_locked()));
        object.insert("lockedBy".to_string(), Value::from(self.locked_by.clone()));
        object.insert("lockedAt".to_string(), Value::from(self.locked_at));
        object.insert("data".to_string(), Value::Object(self.data.clone()));
        object.insert(
            "metadata".to_string(),
            self.metadata.clone().map(Value::Object).unwrap_or(Value::Null),
        );
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bumps_version() {
        let mut row = Row::new("r1").with_data("qty", 2);
        assert_eq!(row.version, 1);

        row.set("qty", 3, "alice");
        assert_eq!(row.version, 2);
        assert_eq!(row.updated_by, "alice");
        assert_eq!(row.get("qty"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_lock_cycle() {
        let mut row = Row::new("r1");
        row.lock("bob");
        assert!(row.is_locked());
        assert_eq!(row.locked_by.as_deref(), Some("bob"));
        assert_eq!(row.version, 2);

        row.unlock("bob");
        assert!(!row.is_locked());
        assert_eq!(row.version, 3);
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let row: Row = serde_json::from_str(r#"{"id": "r9", "data": {"amount": 5}}"#).unwrap();
        assert_eq!(row.id, "r9");
        assert_eq!(row.version, 1);
        assert_eq!(row.get("amount"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let row: Row = serde_json::from_str(
            r#"{"id": "r1", "version": 4, "createdBy": "ann", "lockedBy": "bo", "data": {}}"#,
        )
        .unwrap();
        assert_eq!(row.version, 4);
        assert_eq!(row.created_by, "ann");
        assert_eq!(row.locked_by.as_deref(), Some("bo"));
    }

    #[test]
    fn test_to_value() {
        let row = Row::new("r1").with_author("ann").with_data("a", 1);
        let value = row.to_value();
        assert_eq!(value.get("id"), Some(&Value::from("r1")));
        assert_eq!(value.get("version"), Some(&Value::Number(1.0)));
        assert_eq!(value.get("createdBy"), Some(&Value::from("ann")));
        assert_eq!(
            value.get("data").and_then(|d| d.get("a")),
            Some(&Value::Number(1.0))
        );
    }
}
