//! Per-cell presentation attributes.
//!
//! Rendering never looks inside a format; it is carried alongside the cell
//! for exporters, which interpret keys such as `bold` or `num_format` the
//! way their target file format does.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellFormat {
    attributes: Map<String, Value>,
}

impl CellFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format from a JSON object; any other JSON value is rejected
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(attributes) => Some(CellFormat { attributes }),
            _ => None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn is_bold(&self) -> bool {
        self.get("bold").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn number_format(&self) -> Option<&str> {
        self.get("num_format").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Overlay `other`; its keys win
    pub fn merge(&mut self, other: &CellFormat) {
        for (key, value) in &other.attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
