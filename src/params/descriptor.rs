//! Campaign descriptor access.
//!
//! A descriptor is the loosely-typed `section -> key -> value` mapping of a
//! single experiment, as parsed from a campaign file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level sections of an experiment descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Simulation,
    Malicious,
}

impl Section {
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Simulation => "simulation",
            Section::Malicious => "malicious",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw experiment descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(Value);

impl Descriptor {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up `section -> key`; anything that is not a nested object yields `None`
    pub fn get(&self, section: Section, key: &str) -> Option<&Value> {
        self.0.get(section.as_str())?.as_object()?.get(key)
    }

    /// Set `section -> key`, creating the section when needed
    pub fn set(&mut self, section: Section, key: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(root) = &mut self.0 {
            let entry = root
                .entry(section.as_str())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(section_map) = entry {
                section_map.insert(key.to_string(), value);
            }
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Descriptor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Values treated as "not provided": null, false, zero, empty string/list/object
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
