//! Open property bag values

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Entity properties, merged per key (newest value wins)
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A value the store accepts in an entity property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Convert a JSON value. Objects and lists holding non-scalars are kept as
    /// their compact JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) if items.iter().all(is_scalar) => {
                Self::List(items.iter().map(Self::from_json).collect())
            }
            Value::Array(_) | Value::Object(_) => Self::String(value.to_string()),
        }
    }

    /// Text content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Convert every entry of a JSON object, skipping the `reserved` keys
pub fn properties_from_object<'a>(
    object: impl IntoIterator<Item = (&'a String, &'a Value)>,
    reserved: &[&str],
) -> PropertyMap {
    object
        .into_iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), PropertyValue::from_json(value)))
        .collect()
}
