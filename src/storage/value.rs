//! Stored Values
//!
//! Closed set of payload kinds a cache entry can hold.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Value stored under a key
///
/// Integers and text get their own variants so `increment`/`decrement` can
/// match on `Int` directly. Everything else serializable rides along in
/// `Data` untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
    Data(serde_json::Value),
}

impl Value {
    /// Build a value from arbitrary JSON, promoting integers and strings
    /// to their dedicated variants
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Number(n) if n.is_i64() => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Data(serde_json::Value::Number(n)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Data(other),
        }
    }

    /// Canonical form: a `Data` holding an i64 number or a string becomes
    /// `Int` or `Text`, so values compare the same before and after a
    /// snapshot round trip
    pub fn normalize(self) -> Self {
        match self {
            Value::Data(json) => Value::from_json(json),
            other => other,
        }
    }

    /// Integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Text payload, if this is a `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the payload kind, used in logs and the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::Data(_) => "data",
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Data(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_promotes_scalars() {
        assert_eq!(Value::from(json!(42)), Value::Int(42));
        assert_eq!(Value::from(json!("hi")), Value::Text("hi".into()));
        assert_eq!(Value::from(json!(1.5)), Value::Data(json!(1.5)));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Data(json!(u64::MAX)));
    }

    #[test]
    fn test_serialized_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
        let nested = Value::from(json!({"a": [1, 2]}));
        assert_eq!(serde_json::to_string(&nested).unwrap(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_decode_nested_data() {
        let v: Value = serde_json::from_str(r#"{"user": "ann", "tags": [true, null]}"#).unwrap();
        assert_eq!(v.kind(), "data");
        assert_eq!(v, Value::Data(json!({"user": "ann", "tags": [true, null]})));
    }

    #[test]
    fn test_normalize_data_scalars() {
        assert_eq!(Value::Data(json!(5)).normalize(), Value::Int(5));
        assert_eq!(Value::Data(json!("x")).normalize(), Value::Text("x".into()));
        assert_eq!(Value::Data(json!(2.5)).normalize(), Value::Data(json!(2.5)));
        assert_eq!(Value::Text("y".into()).normalize(), Value::Text("y".into()));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::from("3").as_int(), None);
        assert_eq!(Value::from("abc").as_text(), Some("abc"));
        assert_eq!(Value::Int(3).to_string(), "3");
    }
}
