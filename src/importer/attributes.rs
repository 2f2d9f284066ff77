//! Typed access to the configuration attributes of a declared resource.
//!
//! Declared configuration arrives as loosely typed JSON/YAML. Resolvers only
//! ever read it through [`AttributeView`], which fails with a skip error
//! naming the attribute and its actual type when an expected field is
//! missing or has the wrong shape.

use super::error::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single dynamically-typed configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

static NULL: AttributeValue = AttributeValue::Null;

impl AttributeValue {
    /// Friendly type name used in skip messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Number(_) => "number",
            AttributeValue::String(_) => "string",
            AttributeValue::List(_) => "list",
            AttributeValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(b),
            serde_json::Value::Number(n) => AttributeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => AttributeValue::String(s),
            serde_json::Value::Array(items) => {
                AttributeValue::List(items.into_iter().map(AttributeValue::from).collect())
            }
            serde_json::Value::Object(map) => AttributeValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, AttributeValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Read-only view over a resource's declared attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeView {
    values: HashMap<String, AttributeValue>,
}

impl AttributeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful when assembling declarations by hand
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Build a view from a JSON object; anything else yields an empty view
    pub fn from_json(value: &serde_json::Value) -> Self {
        let values = value
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), AttributeValue::from(value.clone())))
                    .collect()
            })
            .unwrap_or_default();

        Self { values }
    }

    /// Get an attribute; missing attributes read as null
    pub fn get(&self, key: &str) -> &AttributeValue {
        self.values.get(key).unwrap_or(&NULL)
    }

    /// Extract a string attribute or fail with a skip error naming `resource_name`
    pub fn require_string(&self, resource_name: &str, attribute: &str) -> ResolveResult<&str> {
        let value = self.get(attribute);
        value.as_str().ok_or_else(|| ResolveError::InvalidAttribute {
            resource_name: resource_name.to_string(),
            attribute: attribute.to_string(),
            expected: "string",
            actual: value.type_name(),
        })
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeView {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
