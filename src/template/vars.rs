//! Variable map supplied to a render call.
//!
//! Values arrive untyped (CLI flags, JSON/YAML files, the process
//! environment) and stay untyped until a `type` filter coerces them.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a variable map.
#[derive(Debug, Error)]
pub enum VariableError {
    /// A `--var` assignment without a `=`.
    #[error("invalid variable assignment '{0}' (expected key=value)")]
    InvalidAssignment(String),

    /// A variable file that could not be read.
    #[error("failed to read variable file: {0}")]
    Io(#[from] std::io::Error),

    /// A variable file that is not valid JSON.
    #[error("invalid JSON variable file: {0}")]
    Json(#[from] serde_json::Error),

    /// A variable file that is not valid YAML.
    #[error("invalid YAML variable file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A variable file whose top level is not a mapping.
    #[error("variable file must contain a top-level mapping")]
    NotAMapping,
}

/// Mapping from variable name to raw input value.
///
/// Keys are unique; values are one of string, number, boolean, or a nested
/// mapping (for dotted-path lookup). A JSON `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: BTreeMap<String, Value>,
}

impl Variables {
    /// Create an empty variable map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a name, replacing any existing entry.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Whether a top-level name is present (and not null).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(v) if !v.is_null())
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from `key=value` assignments as passed on the command line.
    ///
    /// Values are kept as strings; a `type` filter in the template decides
    /// what they must coerce to.
    pub fn from_assignments(assignments: &[String]) -> Result<Self, VariableError> {
        let mut vars = Self::new();
        for assignment in assignments {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| VariableError::InvalidAssignment(assignment.clone()))?;
            vars.insert(key.trim(), value);
        }
        Ok(vars)
    }

    /// Load from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self, VariableError> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let value: Value =
            if is_yaml { serde_yaml::from_str(&content)? } else { serde_json::from_str(&content)? };

        match value {
            Value::Object(map) => {
                let mut vars = Self::new();
                for (key, value) in map {
                    vars.insert(key, value);
                }
                Ok(vars)
            }
            _ => Err(VariableError::NotAMapping),
        }
    }

    /// Merge entries from another map, keeping existing entries on conflict.
    pub fn merge_missing(&mut self, other: Self) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }

    /// Merge process environment variables for names not already set.
    pub fn merge_env(&mut self) {
        for (key, value) in std::env::vars() {
            self.values.entry(key).or_insert_with(|| Value::String(value));
        }
    }

    /// Resolve a dotted variable path.
    ///
    /// The whole path is tried as a flat key first, then split on `.` and
    /// walked through nested mappings. Absent entries and JSON nulls both
    /// resolve to `None`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(path) {
            return if value.is_null() { None } else { Some(value) };
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl FromIterator<(String, Value)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// Canonical string form of a value, as substituted into rendered output.
///
/// Strings render verbatim with no quoting or escaping; booleans render as
/// lowercase `true`/`false`; numbers render in plain decimal (no scientific
/// notation, no trailing `.0` for integral values). Nested mappings and
/// arrays fall back to compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            // std Display, not serde_json's ryu formatting: ryu emits
            // "42.0" and scientific notation for large magnitudes.
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map_or_else(String::new, |f| f.to_string())
            }
        }
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_assignments() {
        let vars = Variables::from_assignments(&[
            "user_id=42".to_string(),
            "email=a@b.com".to_string(),
            "note=key=value".to_string(),
        ])
        .unwrap();

        assert_eq!(vars.lookup("user_id"), Some(&json!("42")));
        assert_eq!(vars.lookup("email"), Some(&json!("a@b.com")));
        // Only the first '=' splits.
        assert_eq!(vars.lookup("note"), Some(&json!("key=value")));
    }

    #[test]
    fn test_from_assignments_rejects_missing_equals() {
        let result = Variables::from_assignments(&["user_id".to_string()]);
        assert!(matches!(result, Err(VariableError::InvalidAssignment(_))));
    }

    #[test]
    fn test_lookup_flat_key_wins_over_nested() {
        let mut vars = Variables::new();
        vars.insert("user.name", "flat");
        vars.insert("user", json!({"name": "nested"}));

        assert_eq!(vars.lookup("user.name"), Some(&json!("flat")));
    }

    #[test]
    fn test_lookup_nested_path() {
        let mut vars = Variables::new();
        vars.insert("aws", json!({"region": "us-east-1", "account": {"id": 12345}}));

        assert_eq!(vars.lookup("aws.region"), Some(&json!("us-east-1")));
        assert_eq!(vars.lookup("aws.account.id"), Some(&json!(12345)));
        assert_eq!(vars.lookup("aws.missing"), None);
    }

    #[test]
    fn test_null_is_absent() {
        let mut vars = Variables::new();
        vars.insert("gone", Value::Null);

        assert!(!vars.contains("gone"));
        assert_eq!(vars.lookup("gone"), None);
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut vars = Variables::from_assignments(&["region=us-east-1".to_string()]).unwrap();
        let mut fallback = Variables::new();
        fallback.insert("region", "eu-west-1");
        fallback.insert("bucket", "backups");

        vars.merge_missing(fallback);

        assert_eq!(vars.lookup("region"), Some(&json!("us-east-1")));
        assert_eq!(vars.lookup("bucket"), Some(&json!("backups")));
    }

    #[test]
    fn test_stringify_canonical_forms() {
        assert_eq!(stringify(&json!("plain")), "plain");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(false)), "false");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(-7)), "-7");
        assert_eq!(stringify(&json!(42.5)), "42.5");
        assert_eq!(stringify(&Value::Null), "");
    }

    #[test]
    fn test_stringify_integral_float_has_no_trailing_zero() {
        let value: Value = serde_json::from_str("42.0").unwrap();
        assert_eq!(stringify(&value), "42");
    }
}
