//! Frozen runtime environment exposed to payload code.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// A read-only key/value mapping injected at startup.
///
/// Built once from an externally supplied value. Only a plain key/value
/// object is accepted; anything else (arrays, scalars, `null`, absence)
/// yields an empty mapping. There is no mutation API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuntimeEnv {
    values: Arc<Map<String, Value>>,
}

impl RuntimeEnv {
    /// Builds the environment from an injected value.
    pub fn from_injected(injected: Option<Value>) -> Self {
        match injected {
            Some(Value::Object(values)) => Self {
                values: Arc::new(values),
            },
            Some(other) => {
                tracing::warn!(
                    kind = value_kind(&other),
                    "Injected environment is not a key/value object, using empty environment"
                );
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_is_injected() {
        let env = RuntimeEnv::from_injected(Some(json!({ "REGION": "eu", "RETRIES": 3 })));
        assert_eq!(env.len(), 2);
        assert_eq!(env.get_str("REGION"), Some("eu"));
        assert_eq!(env.get("RETRIES"), Some(&json!(3)));
    }

    #[test]
    fn test_non_object_defaults_to_empty() {
        for injected in [json!([1, 2]), json!("text"), json!(null), json!(42)] {
            let env = RuntimeEnv::from_injected(Some(injected));
            assert!(env.is_empty());
        }
        assert!(RuntimeEnv::from_injected(None).is_empty());
    }

    #[test]
    fn test_clones_share_the_same_values() {
        let env = RuntimeEnv::from_injected(Some(json!({ "A": "1" })));
        let clone = env.clone();
        assert_eq!(env, clone);
        assert!(clone.contains("A"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let env = RuntimeEnv::from_injected(Some(json!({ "REGION": "eu", "RETRIES": 3 })));
        let value = serde_json::to_value(&env).expect("serialize");
        assert_eq!(value, json!({ "REGION": "eu", "RETRIES": 3 }));
    }
}
