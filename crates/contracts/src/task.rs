//! Task records - one unit of work read from an input file
//!
//! A task is an open-ended JSON object. Only `type` (and `name` / `country`
//! for age tasks) is interpreted; everything else is carried through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ContractError;

/// Raw record returned by the age lookup service
pub type AgeRecord = Value;

/// Cache key for age lookups
///
/// The country is always stored uppercased, so keys built from `"gb"` and
/// `"GB"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgeKey {
    pub name: String,
    pub country: String,
}

impl AgeKey {
    /// Create a key, normalizing the country code to uppercase
    pub fn new(name: impl Into<String>, country: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            country: country.as_ref().to_uppercase(),
        }
    }
}

impl fmt::Display for AgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.country)
    }
}

/// The closed set of task variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Age estimate for a name within a country
    Age(AgeKey),
    /// Random joke, all other fields ignored
    Joke,
    /// Any other type: the record itself is the payload
    Passthrough,
}

impl TaskKind {
    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age(_) => "age",
            Self::Joke => "joke",
            Self::Passthrough => "raw",
        }
    }
}

/// A task record read from an input file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRecord(Map<String, Value>);

impl TaskRecord {
    /// Build from any JSON value; only objects are task records
    pub fn from_value(value: Value) -> Result<Self, ContractError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ContractError::invalid_task(format!(
                "task must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Raw field access
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field access; non-string values read as absent
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Lower-cased `type`, empty when missing or not a string
    pub fn task_type(&self) -> String {
        self.get_str("type").unwrap_or_default().to_lowercase()
    }

    /// Classify the record
    pub fn kind(&self) -> TaskKind {
        match self.task_type().as_str() {
            "age" => TaskKind::Age(AgeKey::new(
                self.get_str("name").unwrap_or_default(),
                self.get_str("country").unwrap_or_default(),
            )),
            "joke" => TaskKind::Joke,
            _ => TaskKind::Passthrough,
        }
    }

    /// Age key for age tasks, `None` for every other kind
    pub fn age_key(&self) -> Option<AgeKey> {
        match self.kind() {
            TaskKind::Age(key) => Some(key),
            _ => None,
        }
    }

    /// The record as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for TaskRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> TaskRecord {
        TaskRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_age_key_uppercases_country() {
        assert_eq!(AgeKey::new("Bob", "gb"), AgeKey::new("Bob", "GB"));
        assert_eq!(AgeKey::new("Bob", "gB").country, "GB");
        assert_ne!(AgeKey::new("bob", "GB"), AgeKey::new("Bob", "GB"));
    }

    #[test]
    fn test_kind_is_case_insensitive() {
        let task = record(json!({"type": "AGE", "name": "Bob", "country": "gb"}));
        assert_eq!(task.kind(), TaskKind::Age(AgeKey::new("Bob", "GB")));

        let task = record(json!({"type": "Joke", "name": "ignored"}));
        assert_eq!(task.kind(), TaskKind::Joke);
    }

    #[test]
    fn test_missing_or_odd_type_is_passthrough() {
        assert_eq!(record(json!({"message": "hi"})).kind(), TaskKind::Passthrough);
        assert_eq!(record(json!({"type": 7})).kind(), TaskKind::Passthrough);
        assert_eq!(record(json!({"type": "unknown"})).kind(), TaskKind::Passthrough);
        assert_eq!(record(json!({"type": 7})).task_type(), "");
    }

    #[test]
    fn test_age_without_fields_uses_empty_strings() {
        let key = record(json!({"type": "age"})).age_key().unwrap();
        assert_eq!(key, AgeKey::new("", ""));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = TaskRecord::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"), "got: {err}");
    }

    #[test]
    fn test_deserialize_preserves_fields() {
        let task: TaskRecord =
            serde_json::from_str(r#"{"type":"unknown","message":"Hello","n":1}"#).unwrap();
        assert_eq!(
            task.to_value(),
            json!({"type": "unknown", "message": "Hello", "n": 1})
        );
        assert!(serde_json::from_str::<TaskRecord>("\"text\"").is_err());
    }
}
